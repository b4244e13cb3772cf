//! In-memory asset ledger backing the transfer gateway
//!
//! Holds raw balances per (asset, account) and performs the custody moves
//! the engine requests. Used by the scenario runner and tests; a real
//! deployment would put an external settlement system behind the same
//! trait.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::gateway::{TransferError, TransferGateway};
use crate::shared::types::{AccountId, AssetId};

pub struct InMemoryLedger {
    custody: AccountId,
    balances: Mutex<HashMap<(AssetId, AccountId), u128>>,
}

impl InMemoryLedger {
    pub fn new(custody: AccountId) -> Self {
        Self {
            custody,
            balances: Mutex::new(HashMap::new()),
        }
    }

    /// Create `amount` of `asset` out of thin air for `account`.
    pub fn mint(&self, asset: AssetId, account: AccountId, amount: u128) {
        let mut balances = self.balances.lock().expect("ledger poisoned");
        *balances.entry((asset, account)).or_insert(0) += amount;
    }

    pub fn balance_of(&self, asset: AssetId, account: AccountId) -> u128 {
        let balances = self.balances.lock().expect("ledger poisoned");
        balances.get(&(asset, account)).copied().unwrap_or(0)
    }

    fn transfer(
        &self,
        asset: AssetId,
        from: AccountId,
        to: AccountId,
        amount: u128,
    ) -> Result<(), TransferError> {
        let mut balances = self.balances.lock().expect("ledger poisoned");
        let available = balances.get(&(asset, from)).copied().unwrap_or(0);
        if available < amount {
            return Err(TransferError::InsufficientBalance {
                asset,
                from,
                available,
                amount,
            });
        }
        balances.insert((asset, from), available - amount);
        *balances.entry((asset, to)).or_insert(0) += amount;
        Ok(())
    }
}

#[async_trait]
impl TransferGateway for InMemoryLedger {
    async fn debit(
        &self,
        asset: AssetId,
        from: AccountId,
        to: AccountId,
        amount: u128,
    ) -> Result<(), TransferError> {
        self.transfer(asset, from, to, amount)
    }

    async fn credit(
        &self,
        asset: AssetId,
        to: AccountId,
        amount: u128,
    ) -> Result<(), TransferError> {
        self.transfer(asset, self.custody, to, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gold() -> AssetId {
        AssetId::from_label("GOLD")
    }

    fn account(name: &str) -> AccountId {
        AccountId::from_name(name)
    }

    #[tokio::test]
    async fn test_debit_moves_balance() {
        let ledger = InMemoryLedger::new(account("custody"));
        ledger.mint(gold(), account("alice"), 100);

        ledger
            .debit(gold(), account("alice"), account("custody"), 60)
            .await
            .unwrap();
        assert_eq!(ledger.balance_of(gold(), account("alice")), 40);
        assert_eq!(ledger.balance_of(gold(), account("custody")), 60);
    }

    #[tokio::test]
    async fn test_credit_pays_out_of_custody() {
        let ledger = InMemoryLedger::new(account("custody"));
        ledger.mint(gold(), account("custody"), 50);

        ledger.credit(gold(), account("bob"), 20).await.unwrap();
        assert_eq!(ledger.balance_of(gold(), account("custody")), 30);
        assert_eq!(ledger.balance_of(gold(), account("bob")), 20);
    }

    #[tokio::test]
    async fn test_overdraft_rejected() {
        let ledger = InMemoryLedger::new(account("custody"));
        ledger.mint(gold(), account("alice"), 10);

        let err = ledger
            .debit(gold(), account("alice"), account("custody"), 11)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TransferError::InsufficientBalance {
                asset: gold(),
                from: account("alice"),
                available: 10,
                amount: 11,
            }
        );
        assert_eq!(ledger.balance_of(gold(), account("alice")), 10);
    }
}
