//! Prometheus Service Controller Library
//!
//! Reconciles Amazon Managed Service for Prometheus workspaces, rule groups
//! namespaces, alert manager definitions and logging configurations from
//! Kubernetes custom resources.
//!
//! ## Quick Start
//!
//! ```rust
//! use prometheus_service_controller::prelude::*;
//! ```
//!
//! This brings commonly used types and traits into scope. For more specific imports,
//! use the individual modules.

pub mod config;
pub mod constants;
pub mod controller;
pub mod crd;
pub mod observability;
pub mod prelude;
pub mod provider;
pub mod runtime;
