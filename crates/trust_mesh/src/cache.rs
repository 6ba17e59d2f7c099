//! Trust result cache.
//!
//! Entries are written once per pubkey and live for the process lifetime
//! unless cleared. The scorer only talks to [`TrustCache`], so a bounded or
//! expiring cache can replace [`InMemoryTrustCache`] without touching callers.

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

use feedtrust_core::TrustData;

pub trait TrustCache: Send + Sync {
    fn get(&self, pubkey: &str) -> Option<TrustData>;

    fn contains(&self, pubkey: &str) -> bool {
        self.get(pubkey).is_some()
    }

    fn insert(&self, pubkey: String, data: TrustData);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&self);

    /// Uncached pubkeys from `pubkeys`, first occurrence order, no duplicates.
    fn missing(&self, pubkeys: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut missing = Vec::new();
        for pubkey in pubkeys {
            if seen.insert(pubkey.as_str()) && !self.contains(pubkey) {
                missing.push(pubkey.clone());
            }
        }
        missing
    }
}

/// Unbounded cache with no eviction.
#[derive(Debug, Default)]
pub struct InMemoryTrustCache {
    entries: RwLock<HashMap<String, TrustData>>,
}

impl InMemoryTrustCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TrustCache for InMemoryTrustCache {
    fn get(&self, pubkey: &str) -> Option<TrustData> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(pubkey)
            .cloned()
    }

    fn contains(&self, pubkey: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(pubkey)
    }

    fn insert(&self, pubkey: String, data: TrustData) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(pubkey, data);
    }

    fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
