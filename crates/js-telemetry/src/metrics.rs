//! Prometheus export.
//!
//! Subsystem crates register their counters in the default registry when
//! built with their `metrics` feature; this module only adds build info and
//! renders the registry.

use lazy_static::lazy_static;
use prometheus::{register_int_gauge_vec, Encoder, IntGaugeVec, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Constant 1, labeled with the running version
    pub static ref BUILD_INFO: IntGaugeVec = register_int_gauge_vec!(
        "jiseti_build_info",
        "Build information",
        &["version"]
    )
    .expect("metric creation failed");
}

pub fn record_build_info() {
    BUILD_INFO
        .with_label_values(&[env!("CARGO_PKG_VERSION")])
        .set(1);
}

/// Encode the default registry in the Prometheus text format.
pub fn render_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsExport(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsExport(e.to_string()))
}
