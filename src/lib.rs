//! cpswap - constant-product exchange ledger
//!
//! Holds pooled balances of exactly two fungible assets per pair, issues
//! proportional ownership shares to liquidity providers, and executes
//! spot exchanges against the pooled reserves.

pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod report;
pub mod shared;

// Re-export main types for convenience
pub use domain::exchange::{EventSink, ExchangeEngine, ExchangeEvent};
pub use domain::gateway::{HostGateway, TransferGateway};
pub use domain::math::quote_amount_out;
pub use domain::pair::{Pair, PairKey};
pub use domain::pool::{Pool, PoolRegistry};
pub use shared::errors::ExchangeError;
pub use shared::types::{AccountId, AssetId, PRICE_SCALE};
