//! Verifier error types

use thiserror::Error;

/// Errors surfaced to `verify_batch` callers.
///
/// Worker unavailability is not an error: the verifier fails open instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifierError {
    /// The worker could not be started
    #[error("Verification worker failed to start: {0}")]
    WorkerStart(String),

    /// The verifier was destroyed while the batch was in flight
    #[error("Verifier terminated before request {request_id} completed")]
    Terminated { request_id: u64 },

    /// No response arrived within the configured timeout
    #[error("Verification request {request_id} timed out after {timeout_ms}ms")]
    Timeout { request_id: u64, timeout_ms: u64 },
}

pub type Result<T> = std::result::Result<T, VerifierError>;
