//! # Error Policy
//!
//! Kubernetes API failures in the watch loop (status or finalizer patches)
//! are retried with per-resource Fibonacci backoff.

use crate::controller::reconciler::ManagedResource;
use crate::observability::metrics;
use crate::runtime::{Context, RuntimeError};
use kube::ResourceExt;
use kube_runtime::controller::Action;
use std::sync::Arc;
use tracing::{error, info};

/// Backoff key of a resource
#[must_use]
pub fn resource_key<K: ManagedResource>(namespace: &str, name: &str) -> String {
    format!("{}/{}/{}", K::KIND, namespace, name)
}

/// Handle a failed pass with Fibonacci backoff tracked per resource
pub fn handle_reconciliation_error<K: ManagedResource>(
    obj: Arc<K>,
    error: &RuntimeError,
    ctx: Arc<Context>,
) -> Action {
    let name = obj.name_any();
    let namespace = obj.namespace().unwrap_or_default();
    error!(
        kind = K::KIND.as_str(),
        resource.name = name.as_str(),
        resource.namespace = namespace.as_str(),
        error = %error,
        "reconciliation error"
    );
    metrics::increment_reconciliation_errors(K::KIND.as_str());

    let (delay, attempts) = ctx.backoff.next_for(&resource_key::<K>(&namespace, &name));
    let next_retry = chrono::Utc::now()
        + chrono::Duration::from_std(delay).unwrap_or_else(|_| chrono::Duration::zero());
    info!(
        "Retrying with Fibonacci backoff: {}s (error count: {}), next retry at {}",
        delay.as_secs(),
        attempts,
        next_retry.to_rfc3339()
    );

    metrics::increment_requeues_total("error-backoff");
    Action::requeue(delay)
}
