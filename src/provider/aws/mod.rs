//! # Amazon Managed Service for Prometheus Client
//!
//! Backend implementation on top of the official AWS Rust SDK.
//!
//! - `auth.rs` - SDK configuration and caller identity
//! - `operations.rs` - `Backend` implementation, one call per API
//! - `convert.rs` - SDK output to wire type conversions

mod auth;
mod convert;
mod operations;

pub use auth::{load_sdk_config, resolve_identity};

use aws_config::SdkConfig;
use aws_sdk_amp::Client as AmpClient;

/// Amazon Managed Service for Prometheus backend
pub struct AmpBackend {
    client: AmpClient,
    region: Option<String>,
}

impl std::fmt::Debug for AmpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmpBackend")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl AmpBackend {
    #[must_use]
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: AmpClient::new(sdk_config),
            region: sdk_config.region().map(ToString::to_string),
        }
    }
}
