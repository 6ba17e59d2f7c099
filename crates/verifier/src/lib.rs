//! Batched event signature verification.
//!
//! This crate implements the verification half of the FeedTrust pipeline:
//! - A serializable request/response protocol for verification workers
//! - A dedicated worker thread that checks signatures off the async runtime
//! - [`EventVerifier`], which correlates worker responses to callers by request id
//!   and fails open when no worker is available

pub mod error;
pub mod protocol;
pub mod verifier;
pub mod worker;

pub use error::{Result, VerifierError};
pub use protocol::{process_request, VerifyRequest, VerifyResponse};
pub use verifier::{EventVerifier, VerifierMetrics, VerifierMode};
pub use worker::{run_worker, ThreadWorkerSpawner, WorkerChannels, WorkerSpawner};
