//! Gateway traits - the external collaborators the engine depends on
//!
//! The engine never touches raw asset balances or the wall clock itself;
//! both concerns sit behind these seams so hosts can supply their own
//! implementations.

use async_trait::async_trait;
use thiserror::Error;

use crate::shared::types::{AccountId, AssetId};

/// Failure reported by the transfer gateway.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("insufficient balance of {asset:?} for {from:?}: have {available}, need {amount}")]
    InsufficientBalance {
        asset: AssetId,
        from: AccountId,
        available: u128,
        amount: u128,
    },

    #[error("transfer from {from:?} not authorized")]
    NotAuthorized { from: AccountId },
}

/// Moves raw asset balances between external accounts and pool custody.
#[async_trait]
pub trait TransferGateway: Send + Sync {
    /// Move `amount` of `asset` from `from` to `to`.
    async fn debit(
        &self,
        asset: AssetId,
        from: AccountId,
        to: AccountId,
        amount: u128,
    ) -> Result<(), TransferError>;

    /// Move `amount` of `asset` out of pool custody to `to`.
    async fn credit(
        &self,
        asset: AssetId,
        to: AccountId,
        amount: u128,
    ) -> Result<(), TransferError>;
}

/// Supplies the current time and the calling account identity.
pub trait HostGateway: Send + Sync {
    /// Current unix time in seconds, for deadline checks.
    fn now(&self) -> u64;

    /// The account on whose behalf the current operation runs.
    fn caller(&self) -> AccountId;
}
