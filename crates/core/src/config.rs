//! Configuration management for FeedTrust.

use crate::error::{CoreError, Result};
use crate::event::{is_hex_of_len, HEX_32_LEN};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Hex pubkey of the viewing user; anchor for every trust distance
    pub reference_pubkey: String,
    #[serde(default)]
    pub verifier: VerifierConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// When false the verifier never starts a worker and passes events through
    pub enabled: bool,
    /// Give up on a worker response after this many milliseconds. Unset means wait forever.
    pub response_timeout_ms: Option<u64>,
    pub worker_thread_name: String,
}

impl VerifierConfig {
    pub fn response_timeout(&self) -> Option<Duration> {
        self.response_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            response_timeout_ms: None,
            worker_thread_name: "feedtrust-verify".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Batch distance endpoint of the trust oracle
    pub endpoint: String,
    pub timeout_ms: u64,
}

impl OracleConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8787/v1/distances".to_string(),
            timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Filter directive used when `RUST_LOG` is not set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Number of events handed to the pipeline at once
    pub batch_size: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self { batch_size: 64 }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_config(reference_pubkey: impl Into<String>) -> Self {
        Self {
            reference_pubkey: reference_pubkey.into(),
            verifier: VerifierConfig::default(),
            oracle: OracleConfig::default(),
            logging: LoggingConfig::default(),
            ingest: IngestConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !is_hex_of_len(&self.reference_pubkey, HEX_32_LEN) {
            return Err(CoreError::Config(format!(
                "reference_pubkey must be {} hex characters",
                HEX_32_LEN
            )));
        }
        if self.oracle.endpoint.trim().is_empty() {
            return Err(CoreError::Config("oracle.endpoint must not be empty".to_string()));
        }
        if self.ingest.batch_size == 0 {
            return Err(CoreError::Config("ingest.batch_size must be positive".to_string()));
        }
        Ok(())
    }
}
