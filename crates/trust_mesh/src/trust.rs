//! Trust Scoring Module
//!
//! Resolves trust distance for author pubkeys through the trust oracle and
//! caches every answer for the life of the scorer.
//!
//! Zero trust default: a pubkey the oracle cannot place, or any pubkey in a
//! batch whose lookup failed, is cached as unreachable and never re-queried.
//!
//! Two overlapping `score_batch` calls that start before either has cached its
//! results may both query the oracle for the same pubkey. The cache-presence
//! check happens once per call and there is no in-flight tracking.

use std::sync::Arc;

use feedtrust_core::TrustData;
use tracing::{debug, warn};

use crate::cache::{InMemoryTrustCache, TrustCache};
use crate::oracle::{DistanceRecord, LookupOptions, TrustOracle};

/// Trust scorer
pub struct TrustScorer {
    oracle: Arc<dyn TrustOracle>,
    cache: Arc<dyn TrustCache>,
}

impl TrustScorer {
    pub fn new(oracle: Arc<dyn TrustOracle>) -> Self {
        Self::with_cache(oracle, Arc::new(InMemoryTrustCache::new()))
    }

    pub fn with_cache(oracle: Arc<dyn TrustOracle>, cache: Arc<dyn TrustCache>) -> Self {
        Self { oracle, cache }
    }

    /// Trust data for one pubkey, querying the oracle only on a cache miss.
    pub async fn score_single(&self, pubkey: &str) -> TrustData {
        if let Some(data) = self.cache.get(pubkey) {
            return data;
        }

        self.score_batch(&[pubkey.to_string()]).await;
        self.cache
            .get(pubkey)
            .unwrap_or_else(TrustData::unreachable)
    }

    /// Ensures every pubkey in `pubkeys` has a cache entry.
    ///
    /// Only uncached pubkeys are sent to the oracle, in a single request. On
    /// return every pubkey is cached, whether or not the oracle call succeeded.
    pub async fn score_batch(&self, pubkeys: &[String]) {
        let uncached = self.cache.missing(pubkeys);
        if uncached.is_empty() {
            debug!(requested = pubkeys.len(), "all pubkeys already scored");
            return;
        }

        match self
            .oracle
            .batch_distances(&uncached, LookupOptions::full())
            .await
        {
            Ok(distances) => {
                let mut reachable = 0usize;
                for pubkey in &uncached {
                    let data = distances
                        .get(pubkey)
                        .and_then(DistanceRecord::to_trust_data)
                        .unwrap_or_else(TrustData::unreachable);
                    if data.trusted {
                        reachable += 1;
                    }
                    self.cache.insert(pubkey.clone(), data);
                }
                debug!(
                    oracle = self.oracle.name(),
                    queried = uncached.len(),
                    reachable,
                    "scored pubkeys"
                );
            }
            Err(e) => {
                warn!(
                    oracle = self.oracle.name(),
                    queried = uncached.len(),
                    error = %e,
                    "trust oracle lookup failed, marking pubkeys unreachable"
                );
                for pubkey in &uncached {
                    if !self.cache.contains(pubkey) {
                        self.cache.insert(pubkey.clone(), TrustData::unreachable());
                    }
                }
            }
        }
    }

    /// Cached trust data, without querying the oracle.
    pub fn cached(&self, pubkey: &str) -> Option<TrustData> {
        self.cache.get(pubkey)
    }

    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    /// Forget every cached result so the next lookups go to the oracle again.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}
