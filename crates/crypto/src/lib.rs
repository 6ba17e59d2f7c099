//! Cryptographic primitives for relay events.
//!
//! This crate provides the cryptographic foundation for the FeedTrust pipeline:
//! content-addressed event ids and Schnorr signatures over them.
//!
//! # Supported Algorithms
//!
//! - **Hashing**: SHA-256 over the canonical event serialization
//! - **Signatures**: BIP-340 Schnorr over secp256k1 (x-only public keys)
//!
//! # Security Principles
//!
//! - Never roll custom cryptographic primitives
//! - All signatures must be verified before trust
//! - Secrets must never be logged or hardcoded

pub mod event_id;
pub mod signing;

#[cfg(test)]
mod test_vectors;

pub use event_id::{compute_event_id, compute_event_id_bytes, serialize_for_id, EventIdBytes};
pub use signing::{verify_event, EventSigner, SigningError, VerifyError};
