//! # Runtime
//!
//! Glue between the reconciler and kube-runtime: start-up, one watch loop per
//! kind, status persistence, finalizers and the error policy for Kubernetes
//! API failures.

pub mod error_policy;
pub mod initialization;
pub mod watch_loop;

use crate::config::ControllerConfig;
use crate::constants::{ERROR_BACKOFF_MAX_MINUTES, ERROR_BACKOFF_MIN_MINUTES};
use crate::controller::backoff::BackoffRegistry;
use crate::controller::reconciler::Reconciler;
use crate::provider::Backend;
use kube::Client;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Kubernetes API failures of the watch loop
///
/// Backend failures never surface here; the reconciler folds them into status.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("failed to patch status of {resource}: {source}")]
    StatusPatch {
        resource: String,
        #[source]
        source: kube::Error,
    },
    #[error("failed to update finalizers of {resource}: {source}")]
    Finalizer {
        resource: String,
        #[source]
        source: kube::Error,
    },
    #[error("failed to serialize status: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Shared state handed to every controller
pub struct Context {
    pub client: Client,
    pub reconciler: Reconciler<dyn Backend>,
    pub config: ControllerConfig,
    /// Cancelled on SIGINT/SIGTERM; in-flight backend calls observe it
    pub cancel: CancellationToken,
    pub backoff: BackoffRegistry,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("reconciler", &self.reconciler)
            .field("config", &self.config)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl Context {
    #[must_use]
    pub fn new(
        client: Client,
        reconciler: Reconciler<dyn Backend>,
        config: ControllerConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            client,
            reconciler,
            config,
            cancel,
            backoff: BackoffRegistry::new(ERROR_BACKOFF_MIN_MINUTES, ERROR_BACKOFF_MAX_MINUTES),
        }
    }
}
