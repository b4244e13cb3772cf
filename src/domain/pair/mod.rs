//! Pair normalization - canonical ordering and key derivation
//!
//! Every pool is indexed by the canonical form of its asset pair. The
//! functions here are pure: identical inputs always yield identical
//! outputs, independent of call order or prior state.

use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::shared::errors::ExchangeError;
use crate::shared::types::AssetId;

/// Collision-resistant identifier for an unordered pair of distinct assets.
///
/// `PairKey` of `(a, b)` and `(b, a)` are identical: the digest is taken
/// over the pair in canonical (sorted) order.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairKey([u8; 32]);

impl PairKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PairKey({}..)", hex::encode(&self.0[..4]))
    }
}

impl Serialize for PairKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// An asset pair in canonical order: `asset_a` is always the smaller id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pair {
    asset_a: AssetId,
    asset_b: AssetId,
}

impl Pair {
    /// Normalize two distinct asset ids into canonical order.
    pub fn new(x: AssetId, y: AssetId) -> Result<Self, ExchangeError> {
        if x == y {
            return Err(ExchangeError::IdenticalAssets(x));
        }
        if x < y {
            Ok(Self { asset_a: x, asset_b: y })
        } else {
            Ok(Self { asset_a: y, asset_b: x })
        }
    }

    pub fn asset_a(&self) -> AssetId {
        self.asset_a
    }

    pub fn asset_b(&self) -> AssetId {
        self.asset_b
    }

    /// The registry key for this pair.
    pub fn key(&self) -> PairKey {
        let mut hasher = Sha256::new();
        hasher.update(b"pair:");
        hasher.update(self.asset_a.as_bytes());
        hasher.update(self.asset_b.as_bytes());
        PairKey(hasher.finalize().into())
    }

    /// Reorder a value pair between the caller's orientation and canonical
    /// orientation. `first` names the asset that `x` is aligned to; the
    /// mapping is its own inverse, so it also converts canonical results
    /// back into the caller's order.
    pub fn aligned<T>(&self, first: AssetId, x: T, y: T) -> (T, T) {
        debug_assert!(first == self.asset_a || first == self.asset_b);
        if first == self.asset_a {
            (x, y)
        } else {
            (y, x)
        }
    }
}
