//! Trust Mesh Service
//!
//! This crate implements the trust side of the FeedTrust pipeline:
//! - Batch trust-distance lookups against an external trust oracle
//! - A process-lifetime trust cache that guarantees no pubkey is queried twice
//! - Zero trust degradation when the oracle is unavailable
//! - The feed service that runs verification and scoring over event batches

pub mod cache;
pub mod oracle;
pub mod service;
pub mod trust;

pub use cache::{InMemoryTrustCache, TrustCache};
pub use oracle::{
    decode_distances, DistanceRecord, HttpTrustOracle, LookupOptions, OracleError, TrustOracle,
};
pub use service::FeedTrustService;
pub use trust::TrustScorer;
