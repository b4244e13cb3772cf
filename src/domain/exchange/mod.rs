//! Exchange domain - the engine and its notifications

mod engine;
mod events;

pub use engine::{AddedLiquidity, ExchangeEngine, RemovedLiquidity, SwapReceipt};
pub use events::{EventSink, ExchangeEvent, MemorySink, TracingSink};
