//! # Configuration
//!
//! Environment-driven controller configuration.

mod controller;

pub use controller::{ControllerConfig, LogFormat};
