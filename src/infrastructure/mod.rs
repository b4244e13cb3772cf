//! Infrastructure layer - concrete gateway implementations

pub mod host;
pub mod ledger;

pub use host::{ManualHost, SystemHost};
pub use ledger::InMemoryLedger;
