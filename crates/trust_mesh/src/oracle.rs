//! Trust Oracle Module
//!
//! The trust oracle is an external service that computes graph distance from a
//! fixed reference identity to arbitrary pubkeys. This module defines the batch
//! contract the scorer consumes and an HTTP client for it.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use feedtrust_core::{OracleConfig, TrustData};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Oracle failures. The scorer turns every one of these into unreachable trust.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("Oracle transport error: {0}")]
    Transport(String),

    #[error("Oracle returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Oracle response could not be decoded: {0}")]
    Decode(String),

    #[error("Invalid oracle configuration: {0}")]
    InvalidConfig(String),
}

/// What the oracle should include in each distance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupOptions {
    pub include_paths: bool,
    pub include_scores: bool,
}

impl LookupOptions {
    /// Request both path counts and scores.
    pub fn full() -> Self {
        Self {
            include_paths: true,
            include_scores: true,
        }
    }
}

/// Per-pubkey oracle answer. Well-formed only when `hops` is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DistanceRecord {
    #[serde(default)]
    pub hops: Option<u32>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub paths: Option<u64>,
}

impl DistanceRecord {
    pub fn new(hops: u32, score: f64, paths: u64) -> Self {
        Self {
            hops: Some(hops),
            score: Some(score),
            paths: Some(paths),
        }
    }

    /// Trust data for a well-formed record; `None` when `hops` is missing.
    pub fn to_trust_data(&self) -> Option<TrustData> {
        let hops = self.hops?;
        Some(TrustData::reachable(
            hops,
            self.score.unwrap_or(0.0),
            self.paths.unwrap_or(0),
        ))
    }
}

/// Batch distance lookups against a trust graph anchored at a reference identity.
///
/// Pubkeys missing from the returned map are unreachable.
#[async_trait]
pub trait TrustOracle: Send + Sync {
    async fn batch_distances(
        &self,
        pubkeys: &[String],
        options: LookupOptions,
    ) -> Result<HashMap<String, DistanceRecord>, OracleError>;

    /// Oracle identifier for logging
    fn name(&self) -> &'static str;
}

#[derive(Debug, Serialize)]
struct DistanceRequest<'a> {
    source: &'a str,
    targets: &'a [String],
    #[serde(flatten)]
    options: LookupOptions,
}

#[derive(Debug, Deserialize)]
struct DistanceResponse {
    #[serde(default)]
    distances: HashMap<String, serde_json::Value>,
}

/// JSON-over-HTTP trust oracle client.
pub struct HttpTrustOracle {
    client: reqwest::Client,
    endpoint: String,
    reference_pubkey: String,
}

impl HttpTrustOracle {
    pub fn new(
        endpoint: impl Into<String>,
        reference_pubkey: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, OracleError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OracleError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            reference_pubkey: reference_pubkey.into(),
        })
    }

    pub fn from_config(reference_pubkey: &str, config: &OracleConfig) -> Result<Self, OracleError> {
        Self::new(config.endpoint.clone(), reference_pubkey, config.timeout())
    }

    /// The identity all distances are measured from.
    pub fn reference_pubkey(&self) -> &str {
        &self.reference_pubkey
    }
}

#[async_trait]
impl TrustOracle for HttpTrustOracle {
    async fn batch_distances(
        &self,
        pubkeys: &[String],
        options: LookupOptions,
    ) -> Result<HashMap<String, DistanceRecord>, OracleError> {
        debug!(count = pubkeys.len(), endpoint = %self.endpoint, "querying trust oracle");

        let request = DistanceRequest {
            source: &self.reference_pubkey,
            targets: pubkeys,
            options,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Status { status, body });
        }

        let body: DistanceResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Decode(e.to_string()))?;

        Ok(decode_distances(body.distances))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Decodes each entry independently; null or malformed entries are dropped.
pub fn decode_distances(
    raw: HashMap<String, serde_json::Value>,
) -> HashMap<String, DistanceRecord> {
    raw.into_iter()
        .filter_map(|(pubkey, value)| {
            if value.is_null() {
                return None;
            }
            match serde_json::from_value::<DistanceRecord>(value) {
                Ok(record) => Some((pubkey, record)),
                Err(e) => {
                    warn!(pubkey = %pubkey, error = %e, "ignoring malformed distance record");
                    None
                }
            }
        })
        .collect()
}

/// Mock oracle for testing
#[cfg(test)]
pub(crate) struct MockOracle {
    records: HashMap<String, DistanceRecord>,
    fail: bool,
    calls: std::sync::Mutex<Vec<Vec<String>>>,
}

#[cfg(test)]
impl MockOracle {
    pub(crate) fn with_records(records: &[(&str, DistanceRecord)]) -> Self {
        Self {
            records: records
                .iter()
                .map(|(pubkey, record)| (pubkey.to_string(), record.clone()))
                .collect(),
            fail: false,
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::with_records(&[])
        }
    }

    /// Pubkey lists of every call made so far
    pub(crate) fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl TrustOracle for MockOracle {
    async fn batch_distances(
        &self,
        pubkeys: &[String],
        _options: LookupOptions,
    ) -> Result<HashMap<String, DistanceRecord>, OracleError> {
        self.calls.lock().unwrap().push(pubkeys.to_vec());
        if self.fail {
            return Err(OracleError::Transport("mock failure".to_string()));
        }
        Ok(pubkeys
            .iter()
            .filter_map(|pubkey| {
                self.records
                    .get(pubkey)
                    .map(|record| (pubkey.clone(), record.clone()))
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
