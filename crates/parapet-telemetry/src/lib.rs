//! Logging infrastructure for Parapet.
//!
//! Structured JSON logs (or pretty logs for local use) via `tracing`,
//! with `RUST_LOG` overriding the configured level.
//!
//! # Usage
//!
//! ```ignore
//! use parapet_telemetry::{LogFormat, TelemetryConfig};
//!
//! let config = TelemetryConfig::new()
//!     .with_log_level("debug")
//!     .with_log_format(LogFormat::Pretty);
//!
//! parapet_telemetry::init(&config)?;
//! ```

pub mod config;
pub mod logging;

pub use config::{LogFormat, TelemetryConfig};
pub use logging::{events, init_logging};

use thiserror::Error;

/// Telemetry errors.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Failed to initialize logging.
    #[error("failed to initialize logging: {0}")]
    LoggingInit(String),
}

/// Initialize logging with the given configuration.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    init_logging(config)?;
    tracing::debug!(
        event = events::STARTUP,
        service = %config.service_name,
        "logging initialized"
    );
    Ok(())
}
