//! Exchange engine - the public accounting operations
//!
//! Each operation runs under its pool's mutex from first read to last
//! write. Every precondition and slippage check happens before any
//! mutation or external transfer; a failing operation leaves reserves,
//! total shares, and share balances untouched.

use std::sync::Arc;
use tracing::{debug, error};

use crate::domain::exchange::events::{EventSink, ExchangeEvent};
use crate::domain::gateway::{HostGateway, TransferGateway};
use crate::domain::math;
use crate::domain::pair::Pair;
use crate::domain::pool::{Pool, PoolRegistry};
use crate::shared::errors::ExchangeError;
use crate::shared::types::{AccountId, AssetId};

/// Accepted deposit amounts and minted shares, in the caller's asset order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddedLiquidity {
    pub amount_a: u128,
    pub amount_b: u128,
    pub shares: u128,
}

/// Withdrawn amounts, in the caller's asset order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovedLiquidity {
    pub amount_a: u128,
    pub amount_b: u128,
}

/// Executed swap amounts, in trade orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapReceipt {
    pub amount_in: u128,
    pub amount_out: u128,
}

/// The pool accounting engine: owns the registry and orchestrates the
/// gateways around it.
pub struct ExchangeEngine {
    pools: PoolRegistry,
    transfers: Arc<dyn TransferGateway>,
    host: Arc<dyn HostGateway>,
    events: Arc<dyn EventSink>,
    custody: AccountId,
}

impl ExchangeEngine {
    pub fn new(
        transfers: Arc<dyn TransferGateway>,
        host: Arc<dyn HostGateway>,
        events: Arc<dyn EventSink>,
        custody: AccountId,
    ) -> Self {
        Self {
            pools: PoolRegistry::new(),
            transfers,
            host,
            events,
            custody,
        }
    }

    pub fn pools(&self) -> &PoolRegistry {
        &self.pools
    }

    /// Deposit up to the desired amounts of a pair, minting ownership
    /// shares to `to`. Returns the accepted amounts and minted shares in
    /// the caller's asset order.
    #[allow(clippy::too_many_arguments)]
    pub async fn add_liquidity(
        &self,
        token_a: AssetId,
        token_b: AssetId,
        amount_a_desired: u128,
        amount_b_desired: u128,
        amount_a_min: u128,
        amount_b_min: u128,
        to: AccountId,
        deadline: u64,
    ) -> Result<AddedLiquidity, ExchangeError> {
        self.ensure_not_expired(deadline)?;
        if amount_a_desired < amount_a_min {
            return Err(ExchangeError::InsufficientAmount {
                desired: amount_a_desired,
                min: amount_a_min,
            });
        }
        if amount_b_desired < amount_b_min {
            return Err(ExchangeError::InsufficientAmount {
                desired: amount_b_desired,
                min: amount_b_min,
            });
        }

        let pair = Pair::new(token_a, token_b)?;
        let (desired_a, desired_b) = pair.aligned(token_a, amount_a_desired, amount_b_desired);
        let (min_a, min_b) = pair.aligned(token_a, amount_a_min, amount_b_min);
        let caller = self.host.caller();

        let pool_ref = self.pools.get_or_create(pair.key());
        let mut pool = pool_ref.lock().await;

        let quote = pool.quote_deposit(desired_a, desired_b)?;
        if quote.amount_a < min_a {
            return Err(ExchangeError::Slippage {
                amount: quote.amount_a,
                min: min_a,
            });
        }
        if quote.amount_b < min_b {
            return Err(ExchangeError::Slippage {
                amount: quote.amount_b,
                min: min_b,
            });
        }

        // All checks passed: move the accepted amounts into custody,
        // asset A then asset B.
        self.transfers
            .debit(pair.asset_a(), caller, self.custody, quote.amount_a)
            .await
            .map_err(|err| ExchangeError::TransferFailed(err.to_string()))?;
        if let Err(err) = self
            .transfers
            .debit(pair.asset_b(), caller, self.custody, quote.amount_b)
            .await
        {
            // Undo the completed leg so the failed operation leaves no trace.
            if let Err(refund) = self
                .transfers
                .credit(pair.asset_a(), caller, quote.amount_a)
                .await
            {
                error!(caller = %caller, %refund, "failed to refund first deposit leg");
            }
            return Err(ExchangeError::TransferFailed(err.to_string()));
        }

        pool.apply_deposit(to, &quote);
        debug!(
            pair = %pair.key(),
            reserve_a = pool.reserve_a(),
            reserve_b = pool.reserve_b(),
            total_shares = pool.total_shares(),
            "liquidity deposited"
        );
        drop(pool);

        self.events.publish(ExchangeEvent::LiquidityAdded {
            asset_a: pair.asset_a(),
            asset_b: pair.asset_b(),
            provider: to,
            amount_a: quote.amount_a,
            amount_b: quote.amount_b,
            shares_minted: quote.shares,
        });

        let (amount_a, amount_b) = pair.aligned(token_a, quote.amount_a, quote.amount_b);
        Ok(AddedLiquidity {
            amount_a,
            amount_b,
            shares: quote.shares,
        })
    }

    /// Burn `shares` of the caller's pool ownership, paying the
    /// proportional reserves out to `to`. Returns the withdrawn amounts
    /// in the caller's asset order.
    #[allow(clippy::too_many_arguments)]
    pub async fn remove_liquidity(
        &self,
        token_a: AssetId,
        token_b: AssetId,
        shares: u128,
        amount_a_min: u128,
        amount_b_min: u128,
        to: AccountId,
        deadline: u64,
    ) -> Result<RemovedLiquidity, ExchangeError> {
        self.ensure_not_expired(deadline)?;
        let pair = Pair::new(token_a, token_b)?;
        let (min_a, min_b) = pair.aligned(token_a, amount_a_min, amount_b_min);
        let caller = self.host.caller();

        let pool_ref = self.pools.get(&pair.key()).ok_or(ExchangeError::EmptyPool)?;
        let mut pool = pool_ref.lock().await;

        let quote = pool.quote_withdraw(&caller, shares)?;
        if quote.amount_a < min_a {
            return Err(ExchangeError::Slippage {
                amount: quote.amount_a,
                min: min_a,
            });
        }
        if quote.amount_b < min_b {
            return Err(ExchangeError::Slippage {
                amount: quote.amount_b,
                min: min_b,
            });
        }

        // State is finalized before the payout; a reentrant call on this
        // pool can only ever observe the updated reserves. The checkpoint
        // is restored if the payout itself fails.
        let checkpoint = pool.clone();
        pool.apply_withdraw(&caller, shares, &quote);

        if let Err(err) = self
            .transfers
            .credit(pair.asset_a(), to, quote.amount_a)
            .await
        {
            *pool = checkpoint;
            return Err(ExchangeError::TransferFailed(err.to_string()));
        }
        if let Err(err) = self
            .transfers
            .credit(pair.asset_b(), to, quote.amount_b)
            .await
        {
            if let Err(clawback) = self
                .transfers
                .debit(pair.asset_a(), to, self.custody, quote.amount_a)
                .await
            {
                error!(receiver = %to, %clawback, "failed to claw back first payout leg");
            }
            *pool = checkpoint;
            return Err(ExchangeError::TransferFailed(err.to_string()));
        }

        debug!(
            pair = %pair.key(),
            reserve_a = pool.reserve_a(),
            reserve_b = pool.reserve_b(),
            total_shares = pool.total_shares(),
            "liquidity withdrawn"
        );
        drop(pool);

        self.events.publish(ExchangeEvent::LiquidityRemoved {
            asset_a: pair.asset_a(),
            asset_b: pair.asset_b(),
            receiver: to,
            amount_a: quote.amount_a,
            amount_b: quote.amount_b,
            shares_burned: shares,
        });

        let (amount_a, amount_b) = pair.aligned(token_a, quote.amount_a, quote.amount_b);
        Ok(RemovedLiquidity { amount_a, amount_b })
    }

    /// Exchange an exact input amount along a two-asset path, crediting
    /// the output to `to`.
    pub async fn swap_exact_in(
        &self,
        amount_in: u128,
        amount_out_min: u128,
        path: &[AssetId],
        to: AccountId,
        deadline: u64,
    ) -> Result<SwapReceipt, ExchangeError> {
        if path.len() != 2 {
            return Err(ExchangeError::InvalidPath(path.len()));
        }
        self.ensure_not_expired(deadline)?;
        let (asset_in, asset_out) = (path[0], path[1]);
        let pair = Pair::new(asset_in, asset_out)?;
        let caller = self.host.caller();

        let pool_ref = self.pools.get(&pair.key()).ok_or(ExchangeError::EmptyPool)?;
        let mut pool = pool_ref.lock().await;

        let input_is_a = asset_in == pair.asset_a();
        let amount_out = pool.quote_swap(input_is_a, amount_in)?;
        if amount_out < amount_out_min {
            return Err(ExchangeError::Slippage {
                amount: amount_out,
                min: amount_out_min,
            });
        }

        self.transfers
            .debit(asset_in, caller, self.custody, amount_in)
            .await
            .map_err(|err| ExchangeError::TransferFailed(err.to_string()))?;
        if let Err(err) = self.transfers.credit(asset_out, to, amount_out).await {
            if let Err(refund) = self.transfers.credit(asset_in, caller, amount_in).await {
                error!(caller = %caller, %refund, "failed to refund swap input");
            }
            return Err(ExchangeError::TransferFailed(err.to_string()));
        }

        pool.apply_swap(input_is_a, amount_in, amount_out);
        debug!(
            pair = %pair.key(),
            reserve_a = pool.reserve_a(),
            reserve_b = pool.reserve_b(),
            "swap applied"
        );
        drop(pool);

        self.events.publish(ExchangeEvent::AmountsSwapped {
            asset_in,
            asset_out,
            trader: caller,
            receiver: to,
            amount_in,
            amount_out,
        });

        Ok(SwapReceipt {
            amount_in,
            amount_out,
        })
    }

    /// Spot price of `token_a` in units of `token_b`, scaled by
    /// `PRICE_SCALE`, in the caller's orientation.
    pub async fn price(&self, token_a: AssetId, token_b: AssetId) -> Result<u128, ExchangeError> {
        let pair = Pair::new(token_a, token_b)?;
        let pool_ref = self.pools.get(&pair.key()).ok_or(ExchangeError::EmptyPool)?;
        let pool = pool_ref.lock().await;
        let (reserve_a, reserve_b) = pair.aligned(token_a, pool.reserve_a(), pool.reserve_b());
        math::spot_price(reserve_a, reserve_b)
    }

    /// Clone the current state of a pool, if one exists for the pair.
    pub async fn pool_state(
        &self,
        token_a: AssetId,
        token_b: AssetId,
    ) -> Result<Option<Pool>, ExchangeError> {
        let pair = Pair::new(token_a, token_b)?;
        match self.pools.get(&pair.key()) {
            Some(pool_ref) => Ok(Some(pool_ref.lock().await.clone())),
            None => Ok(None),
        }
    }

    fn ensure_not_expired(&self, deadline: u64) -> Result<(), ExchangeError> {
        let now = self.host.now();
        if now > deadline {
            return Err(ExchangeError::Expired { deadline, now });
        }
        Ok(())
    }
}
