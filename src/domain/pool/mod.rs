//! Pool domain - reserves, shares, and the keyed pool store

mod registry;
mod state;

pub use registry::PoolRegistry;
pub use state::{DepositQuote, Pool, WithdrawQuote};
