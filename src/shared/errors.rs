//! Error handling for the exchange ledger

use thiserror::Error;

use crate::shared::types::AssetId;

/// Errors surfaced by the pool accounting engine.
///
/// Every variant aborts the whole operation with no state change; the
/// specific kind names the exact violated precondition so callers can
/// resubmit with adjusted parameters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("identical assets in pair: {0}")]
    IdenticalAssets(AssetId),

    #[error("deadline {deadline} elapsed at {now}")]
    Expired { deadline: u64, now: u64 },

    #[error("desired amount {desired} below minimum {min}")]
    InsufficientAmount { desired: u128, min: u128 },

    #[error("implied deposit {implied} exceeds desired {desired}")]
    RatioExceeded { implied: u128, desired: u128 },

    #[error("amount {amount} below slippage floor {min}")]
    Slippage { amount: u128, min: u128 },

    #[error("insufficient shares: balance {balance}, requested {requested}")]
    InsufficientShares { balance: u128, requested: u128 },

    #[error("swap path must name exactly two assets, got {0}")]
    InvalidPath(usize),

    #[error("pool has no liquidity")]
    EmptyPool,

    #[error("reserves must both be positive")]
    InvalidReserves,

    #[error("transfer failed: {0}")]
    TransferFailed(String),

    #[error("arithmetic overflow")]
    Overflow,
}

/// General application error for the binary layer.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("scenario error: {0}")]
    Scenario(String),

    #[error(transparent)]
    Exchange(#[from] ExchangeError),
}
