//! Integration tests for the FeedTrust pipeline
//!
//! This test suite validates:
//! - End-to-end verification and scoring with a real worker thread
//! - The HTTP trust oracle client against a local stub server
//! - Degradation paths (verifier fail-open, oracle fail-closed to unreachable)
//! - Concurrent batches through one long-lived service instance

pub mod test_utils;

#[cfg(test)]
mod http_oracle_tests;
