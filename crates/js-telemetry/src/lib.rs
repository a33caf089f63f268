//! # Jiseti Telemetry
//!
//! Structured logging through `tracing-subscriber` and Prometheus text
//! export.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use js_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     init_telemetry(&TelemetryConfig::from_env()).expect("telemetry");
//!     tracing::info!("ready");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `JS_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter |
//! | `JS_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |
//! | `JS_SERVICE_NAME` | `jiseti` | Service name in logs |

mod config;
mod logging;
mod metrics;

pub use config::TelemetryConfig;
pub use logging::{env_filter, init_logging};
pub use metrics::{record_build_info, render_metrics, BUILD_INFO};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to export metrics: {0}")]
    MetricsExport(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Install logging and publish build info.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    logging::init_logging(config)?;
    metrics::record_build_info();
    Ok(())
}
