//! Exchange notifications emitted on successful operations
//!
//! Events are consumed by external auditing collaborators, never
//! internally. Amounts are reported in canonical pair orientation for
//! liquidity events and in trade orientation for swaps.

use serde::Serialize;
use std::sync::Mutex;
use tracing::info;

use crate::shared::types::{AccountId, AssetId};

/// Notification emitted after a completed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExchangeEvent {
    LiquidityAdded {
        asset_a: AssetId,
        asset_b: AssetId,
        provider: AccountId,
        amount_a: u128,
        amount_b: u128,
        shares_minted: u128,
    },
    LiquidityRemoved {
        asset_a: AssetId,
        asset_b: AssetId,
        receiver: AccountId,
        amount_a: u128,
        amount_b: u128,
        shares_burned: u128,
    },
    AmountsSwapped {
        asset_in: AssetId,
        asset_out: AssetId,
        trader: AccountId,
        receiver: AccountId,
        amount_in: u128,
        amount_out: u128,
    },
}

/// Consumer of exchange notifications.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: ExchangeEvent);
}

/// Logs every event as a structured tracing line.
#[derive(Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn publish(&self, event: ExchangeEvent) {
        match &event {
            ExchangeEvent::LiquidityAdded {
                provider,
                amount_a,
                amount_b,
                shares_minted,
                ..
            } => info!(
                provider = %provider,
                amount_a,
                amount_b,
                shares_minted,
                "liquidity added"
            ),
            ExchangeEvent::LiquidityRemoved {
                receiver,
                amount_a,
                amount_b,
                shares_burned,
                ..
            } => info!(
                receiver = %receiver,
                amount_a,
                amount_b,
                shares_burned,
                "liquidity removed"
            ),
            ExchangeEvent::AmountsSwapped {
                trader,
                amount_in,
                amount_out,
                ..
            } => info!(
                trader = %trader,
                amount_in,
                amount_out,
                "amounts swapped"
            ),
        }
    }
}

/// Buffers events in memory, for reports and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<ExchangeEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events published so far, in order.
    pub fn events(&self) -> Vec<ExchangeEvent> {
        self.events.lock().expect("event sink poisoned").clone()
    }

    pub fn drain(&self) -> Vec<ExchangeEvent> {
        std::mem::take(&mut *self.events.lock().expect("event sink poisoned"))
    }
}

impl EventSink for MemorySink {
    fn publish(&self, event: ExchangeEvent) {
        self.events.lock().expect("event sink poisoned").push(event);
    }
}
