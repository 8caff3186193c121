//! Prometheus metrics for fiscal-service.
//!
//! Domain metrics live in the default prometheus registry. The HTTP request
//! metrics recorded by the shared middleware go through the `metrics` facade
//! into the exporter handle; `/metrics` renders both.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};
use std::sync::OnceLock;

/// Exporter handle for the `metrics` facade. `None` when another recorder
/// was already installed in this process.
static METRICS_HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

/// Counter for sequence allocations by document type and outcome.
pub static SEQUENCE_ALLOCATIONS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "fiscal_sequence_allocations_total",
        "Total number of sequence allocations",
        &["document_type", "status"]
    )
    .expect("Failed to register SEQUENCE_ALLOCATIONS")
});

/// Counter for contended allocation attempts.
pub static SEQUENCE_CONFLICTS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "fiscal_sequence_conflicts_total",
        "Allocation attempts that hit write contention",
        &["document_type"]
    )
    .expect("Failed to register SEQUENCE_CONFLICTS")
});

/// Histogram for database query duration.
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "fiscal_db_query_duration_seconds",
        "Database query duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]
    )
    .expect("Failed to register DB_QUERY_DURATION")
});

/// Counter for GSTR-1 report builds by section and outcome.
pub static REPORTS_GENERATED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "fiscal_gstr1_reports_total",
        "Total number of GSTR-1 report builds",
        &["section", "status"]
    )
    .expect("Failed to register REPORTS_GENERATED")
});

/// Histogram for report build duration.
pub static REPORT_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "fiscal_gstr1_report_duration_seconds",
        "GSTR-1 report build duration in seconds",
        &["section"],
        vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("Failed to register REPORT_DURATION")
});

/// Counter for errors.
pub static ERRORS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "fiscal_errors_total",
        "Total number of errors",
        &["error_type"]
    )
    .expect("Failed to register ERRORS")
});

/// Install the facade recorder and register all metrics. Safe to call more
/// than once.
pub fn init_metrics() {
    METRICS_HANDLE.get_or_init(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install Prometheus recorder");
            None
        }
    });
    Lazy::force(&SEQUENCE_ALLOCATIONS);
    Lazy::force(&SEQUENCE_CONFLICTS);
    Lazy::force(&DB_QUERY_DURATION);
    Lazy::force(&REPORTS_GENERATED);
    Lazy::force(&REPORT_DURATION);
    Lazy::force(&ERRORS);
}

/// Get all metrics as Prometheus text format.
pub fn get_metrics() -> String {
    let mut output = METRICS_HANDLE
        .get()
        .and_then(|handle| handle.as_ref())
        .map(|handle| handle.render())
        .unwrap_or_default();

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return output;
    }
    if let Ok(domain) = String::from_utf8(buffer) {
        output.push_str(&domain);
    }
    output
}

pub fn record_allocation(document_type: &str, status: &str) {
    SEQUENCE_ALLOCATIONS
        .with_label_values(&[document_type, status])
        .inc();
}

pub fn record_conflict(document_type: &str) {
    SEQUENCE_CONFLICTS.with_label_values(&[document_type]).inc();
}

pub fn record_report(section: &str, status: &str, duration_secs: f64) {
    REPORTS_GENERATED
        .with_label_values(&[section, status])
        .inc();
    REPORT_DURATION
        .with_label_values(&[section])
        .observe(duration_secs);
}

/// Record an error.
pub fn record_error(error_type: &str) {
    ERRORS.with_label_values(&[error_type]).inc();
}
