//! # Controller
//!
//! Core controller modules for the Prometheus service controller.
//!
//! - `backoff`: Fibonacci backoff for Kubernetes API failures
//! - `kinds`: per-kind capability sets and field translation
//! - `reconciler`: the reconciliation state machine
//! - `server`: HTTP server for metrics and health checks

pub mod backoff;
pub mod kinds;
pub mod reconciler;
pub mod server;
