//! Structured logging infrastructure for FeedTrust.
//!
//! This module provides centralized logging initialization with support
//! for structured JSON output and environment-based configuration. The node
//! binary calls [`init_with`] once at startup.

use crate::config::{LogFormat, LoggingConfig};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging from the `[logging]` config section.
///
/// `RUST_LOG` still wins over `config.level` when present. Logs go to stderr so
/// stdout stays free for pipeline output.
///
/// # Example
/// ```no_run
/// use feedtrust_core::{logging, LogFormat, LoggingConfig};
///
/// logging::init_with(&LoggingConfig {
///     format: LogFormat::Json,
///     level: "feedtrust_verifier=debug,info".to_string(),
/// });
/// ```
pub fn init_with(config: &LoggingConfig) {
    let filter = build_filter(&config.level);
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .init(),
    }
}

fn build_filter(fallback: &str) -> EnvFilter {
    let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    resolve_filter(from_env.as_deref(), fallback)
}

/// First valid directive set of `from_env`, then `fallback`, then `info`.
fn resolve_filter(from_env: Option<&str>, fallback: &str) -> EnvFilter {
    from_env
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_new(fallback).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}
