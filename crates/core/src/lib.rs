//! Core types for the FeedTrust verification and trust pipeline.
//!
//! This crate provides the event and trust data model shared by the verifier,
//! the trust scorer and the node binary, together with configuration loading
//! and logging initialization.

pub mod config;
pub mod error;
pub mod event;
pub mod logging;
pub mod trust;

pub use config::{Config, IngestConfig, LogFormat, LoggingConfig, OracleConfig, VerifierConfig};
pub use error::{CoreError, Result};
pub use event::{is_hex_of_len, Event, UnsignedEvent, HEX_32_LEN, HEX_SIG_LEN};
pub use trust::{AnnotatedEvent, TrustData};
