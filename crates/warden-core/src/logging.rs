//! Logging and tracing initialization for Warden.
//!
//! Call one of these once at application startup, before constructing the
//! auth components. The log level is controlled by the `RUST_LOG`
//! environment variable:
//!
//! ```bash
//! # Show security-event detail
//! RUST_LOG=debug cargo run
//!
//! # Show only warnings and errors (production)
//! RUST_LOG=warn cargo run
//!
//! # Fine-grained control
//! RUST_LOG=warden_core=debug cargo run
//! ```
//!
//! Nothing in this crate ever logs a plaintext password, code, or secret.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging with sensible defaults.
///
/// Defaults to `info` when `RUST_LOG` is unset.
///
/// # Panics
///
/// Panics if called multiple times. Only call it once at application
/// startup.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize JSON-formatted logging (recommended for production).
///
/// Outputs logs in JSON format for log aggregation systems like ELK,
/// Datadog, or CloudWatch.
///
/// # Panics
///
/// Panics if called multiple times. Only call it once at application
/// startup.
pub fn init_logging_json() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}
