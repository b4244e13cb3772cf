//! Pool registry - the keyed store from pair key to pool record

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;

use crate::domain::pair::PairKey;
use crate::domain::pool::Pool;

/// Owns every pool record, keyed by canonical pair key.
///
/// The outer map lock is held only for lookup and insertion and never
/// across an await point. Each pool carries its own async mutex, so
/// operations on one pool serialize while distinct pools proceed
/// independently.
#[derive(Default)]
pub struct PoolRegistry {
    pools: RwLock<HashMap<PairKey, Arc<Mutex<Pool>>>>,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the pool for `key`, inserting a fresh empty record on
    /// first reference.
    pub fn get_or_create(&self, key: PairKey) -> Arc<Mutex<Pool>> {
        if let Some(pool) = self.pools.read().expect("pool registry poisoned").get(&key) {
            return Arc::clone(pool);
        }
        let mut pools = self.pools.write().expect("pool registry poisoned");
        Arc::clone(
            pools
                .entry(key)
                .or_insert_with(|| Arc::new(Mutex::new(Pool::new()))),
        )
    }

    /// Resolve an existing pool without creating one.
    pub fn get(&self, key: &PairKey) -> Option<Arc<Mutex<Pool>>> {
        self.pools
            .read()
            .expect("pool registry poisoned")
            .get(key)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.pools.read().expect("pool registry poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clone the current state of every pool, for reporting.
    pub async fn snapshots(&self) -> Vec<(PairKey, Pool)> {
        let entries: Vec<(PairKey, Arc<Mutex<Pool>>)> = {
            let pools = self.pools.read().expect("pool registry poisoned");
            pools
                .iter()
                .map(|(key, pool)| (*key, Arc::clone(pool)))
                .collect()
        };
        let mut snapshots = Vec::with_capacity(entries.len());
        for (key, pool) in entries {
            snapshots.push((key, pool.lock().await.clone()));
        }
        snapshots
    }
}
