//! # Metrics
//!
//! Prometheus metrics for monitoring the controller.
//!
//! ## Metrics Exposed
//!
//! - `prometheus_service_controller_reconciliations_total` - Reconciliation passes by kind and outcome
//! - `prometheus_service_controller_reconciliation_duration_seconds` - Duration of reconciliation passes by kind
//! - `prometheus_service_controller_reconciliation_errors_total` - Kubernetes API failures by kind
//! - `prometheus_service_controller_api_calls_total` - Backend API calls by operation type, API and result
//! - `prometheus_service_controller_api_call_duration_seconds` - Duration of backend API calls by API
//! - `prometheus_service_controller_requeues_total` - Requeues by reason

use anyhow::Result;
use prometheus::{HistogramVec, IntCounterVec, Registry};
use std::sync::LazyLock;

// Metrics
pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static RECONCILIATIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "prometheus_service_controller_reconciliations_total",
            "Total number of reconciliation passes by kind and outcome",
        ),
        &["kind", "outcome"],
    )
    .expect("Failed to create RECONCILIATIONS_TOTAL metric - this should never happen")
});

static RECONCILIATION_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        prometheus::HistogramOpts::new(
            "prometheus_service_controller_reconciliation_duration_seconds",
            "Duration of reconciliation passes in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
        &["kind"],
    )
    .expect("Failed to create RECONCILIATION_DURATION metric - this should never happen")
});

static RECONCILIATION_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "prometheus_service_controller_reconciliation_errors_total",
            "Total number of Kubernetes API failures during reconciliation",
        ),
        &["kind"],
    )
    .expect("Failed to create RECONCILIATION_ERRORS_TOTAL metric - this should never happen")
});

static API_CALLS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "prometheus_service_controller_api_calls_total",
            "Total number of backend API calls",
        ),
        &["op_type", "api", "result"],
    )
    .expect("Failed to create API_CALLS_TOTAL metric - this should never happen")
});

static API_CALL_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        prometheus::HistogramOpts::new(
            "prometheus_service_controller_api_call_duration_seconds",
            "Duration of backend API calls in seconds",
        )
        .buckets(vec![0.05, 0.1, 0.5, 1.0, 2.0, 5.0]),
        &["api"],
    )
    .expect("Failed to create API_CALL_DURATION metric - this should never happen")
});

static REQUEUES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "prometheus_service_controller_requeues_total",
            "Total number of requeues by reason",
        ),
        &["reason"],
    )
    .expect("Failed to create REQUEUES_TOTAL metric - this should never happen")
});

/// Backend operation type label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpType {
    ReadOne,
    Create,
    Update,
    Delete,
}

impl OpType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OpType::ReadOne => "READ_ONE",
            OpType::Create => "CREATE",
            OpType::Update => "UPDATE",
            OpType::Delete => "DELETE",
        }
    }
}

pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(RECONCILIATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(API_CALLS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(API_CALL_DURATION.clone()))?;
    REGISTRY.register(Box::new(REQUEUES_TOTAL.clone()))?;

    Ok(())
}

pub fn increment_reconciliations(kind: &str, outcome: &str) {
    RECONCILIATIONS_TOTAL
        .with_label_values(&[kind, outcome])
        .inc();
}

pub fn observe_reconciliation_duration(kind: &str, duration: f64) {
    RECONCILIATION_DURATION
        .with_label_values(&[kind])
        .observe(duration);
}

pub fn increment_reconciliation_errors(kind: &str) {
    RECONCILIATION_ERRORS_TOTAL.with_label_values(&[kind]).inc();
}

pub fn record_api_call(op_type: OpType, api: &str, success: bool, duration: f64) {
    let result = if success { "success" } else { "error" };
    API_CALLS_TOTAL
        .with_label_values(&[op_type.as_str(), api, result])
        .inc();
    API_CALL_DURATION.with_label_values(&[api]).observe(duration);
}

pub fn increment_requeues_total(reason: &str) {
    REQUEUES_TOTAL.with_label_values(&[reason]).inc();
}
