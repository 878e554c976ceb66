//! # Watch Loop
//!
//! One kube-runtime `Controller` per kind. Each event runs a reconciliation
//! pass, persists the returned status and maps the pass's requeue signal to
//! a controller `Action`.

use crate::constants::{FIELD_MANAGER, FINALIZER};
use crate::controller::reconciler::{ManagedResource, Outcome, PassResult, Requeue};
use crate::crd::{AlertManagerDefinition, LoggingConfiguration, ResourceStatus, RuleGroupsNamespace, Workspace};
use crate::observability::metrics;
use crate::runtime::error_policy::{handle_reconciliation_error, resource_key};
use crate::runtime::{Context, RuntimeError};
use futures::StreamExt;
use k8s_openapi::NamespaceResourceScope;
use kube::api::{Api, Patch, PatchParams};
use kube::{Resource, ResourceExt};
use kube_runtime::{controller::Action, watcher, Controller};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, info_span, warn, Instrument};

/// Run the controllers of every managed kind until shutdown
pub async fn run_controllers(ctx: Arc<Context>) {
    futures::join!(
        run_controller::<Workspace>(Arc::clone(&ctx)),
        run_controller::<RuleGroupsNamespace>(Arc::clone(&ctx)),
        run_controller::<AlertManagerDefinition>(Arc::clone(&ctx)),
        run_controller::<LoggingConfiguration>(Arc::clone(&ctx)),
    );
    info!("All controllers stopped");
}

/// Run the controller of one kind until shutdown
pub async fn run_controller<K>(ctx: Arc<Context>)
where
    K: ManagedResource + Resource<Scope = NamespaceResourceScope>,
{
    let api: Api<K> = match &ctx.config.watch_namespace {
        Some(namespace) => Api::namespaced(ctx.client.clone(), namespace),
        None => Api::all(ctx.client.clone()),
    };
    info!(
        kind = K::KIND.as_str(),
        namespace = ctx.config.watch_namespace.as_deref().unwrap_or("*"),
        "Starting controller watch loop"
    );

    Controller::new(api, watcher::Config::default().any_semantic())
        .shutdown_on_signal()
        .run(reconcile::<K>, handle_reconciliation_error::<K>, Arc::clone(&ctx))
        .for_each(|result| {
            match result {
                Ok((object, _)) => debug!(kind = K::KIND.as_str(), object = %object, "reconciled"),
                Err(e) => warn!(kind = K::KIND.as_str(), error = %e, "controller stream error"),
            }
            futures::future::ready(())
        })
        .await;

    info!(kind = K::KIND.as_str(), "Controller stopped");
}

async fn reconcile<K>(obj: Arc<K>, ctx: Arc<Context>) -> Result<Action, RuntimeError>
where
    K: ManagedResource + Resource<Scope = NamespaceResourceScope>,
{
    let name = obj.name_any();
    let namespace = obj.namespace().unwrap_or_default();
    let span = info_span!(
        "reconcile",
        kind = K::KIND.as_str(),
        resource.name = name.as_str(),
        resource.namespace = namespace.as_str()
    );

    async move {
        let start = Instant::now();
        let api: Api<K> = Api::namespaced(ctx.client.clone(), &namespace);

        let result = if obj.meta().deletion_timestamp.is_some() {
            if !has_finalizer(obj.as_ref()) {
                return Ok(Action::await_change());
            }
            let result = ctx.reconciler.finalize(obj.as_ref(), &ctx.cancel).await;
            if matches!(result.outcome, Outcome::Deleted) {
                remove_finalizer(&api, obj.as_ref()).await?;
                info!("Backend resource deleted, finalizer removed");
            } else {
                persist_status(&api, obj.as_ref(), &result.resource).await?;
            }
            result
        } else {
            if !has_finalizer(obj.as_ref()) {
                add_finalizer(&api, obj.as_ref()).await?;
            }
            let result = ctx.reconciler.sync(obj.as_ref(), &ctx.cancel).await;
            persist_status(&api, obj.as_ref(), &result.resource).await?;
            result
        };

        let kind = K::KIND.as_str();
        metrics::increment_reconciliations(kind, result.outcome.label(K::policy().terminal_codes));
        metrics::observe_reconciliation_duration(kind, start.elapsed().as_secs_f64());
        if ctx.backoff.reset(&resource_key::<K>(&namespace, &name)) {
            info!("Backoff reset after successful pass");
        }

        let (action, reason) = requeue_action(&result, ctx.config.resync_period());
        if let Some(reason) = reason {
            metrics::increment_requeues_total(reason);
        }
        debug!(outcome = ?result.outcome, action = ?action, "pass complete");
        Ok(action)
    }
    .instrument(span)
    .await
}

/// Controller action for a pass, with the requeue metrics label
pub fn requeue_action<K>(result: &PassResult<K>, resync: Duration) -> (Action, Option<&'static str>) {
    match (&result.outcome, result.requeue) {
        (Outcome::Deleted, _) | (_, Requeue::Fatal) => (Action::await_change(), None),
        (_, Requeue::Done) => (Action::requeue(resync), Some("resync")),
        (Outcome::Wait(reason), Requeue::RetryAfter(delay)) => {
            (Action::requeue(delay), Some(reason.as_str()))
        }
        (_, Requeue::RetryAfter(delay)) => (Action::requeue(delay), Some("recoverable-error")),
    }
}

fn has_finalizer<K: Resource>(obj: &K) -> bool {
    obj.finalizers().iter().any(|f| f == FINALIZER)
}

fn patch_params() -> PatchParams {
    PatchParams {
        field_manager: Some(FIELD_MANAGER.to_string()),
        ..PatchParams::default()
    }
}

async fn add_finalizer<K: ManagedResource>(api: &Api<K>, obj: &K) -> Result<(), RuntimeError> {
    let mut finalizers = obj.finalizers().to_vec();
    finalizers.push(FINALIZER.to_string());
    let patch = json!({ "metadata": { "finalizers": finalizers } });
    api.patch(&obj.name_any(), &patch_params(), &Patch::Merge(&patch))
        .await
        .map_err(|source| RuntimeError::Finalizer {
            resource: obj.name_any(),
            source,
        })?;
    debug!("Finalizer added");
    Ok(())
}

async fn remove_finalizer<K: ManagedResource>(api: &Api<K>, obj: &K) -> Result<(), RuntimeError> {
    let finalizers: Vec<&String> = obj.finalizers().iter().filter(|f| *f != FINALIZER).collect();
    let patch = json!({ "metadata": { "finalizers": finalizers } });
    api.patch(&obj.name_any(), &patch_params(), &Patch::Merge(&patch))
        .await
        .map_err(|source| RuntimeError::Finalizer {
            resource: obj.name_any(),
            source,
        })?;
    Ok(())
}

/// Write `next`'s status to the status subresource when it differs from `current`'s
async fn persist_status<K: ManagedResource>(
    api: &Api<K>,
    current: &K,
    next: &K,
) -> Result<(), RuntimeError> {
    if current.status() == next.status() {
        return Ok(());
    }
    let patch = status_patch(current.status(), next.status())?;
    api.patch_status(&current.name_any(), &patch_params(), &Patch::Merge(&patch))
        .await
        .map_err(|source| RuntimeError::StatusPatch {
            resource: current.name_any(),
            source,
        })?;
    Ok(())
}

/// Merge patch replacing the status verbatim
///
/// Fields present in `previous` but unset in `next` are sent as null so the
/// merge removes them.
pub fn status_patch(
    previous: Option<&ResourceStatus>,
    next: Option<&ResourceStatus>,
) -> Result<Value, serde_json::Error> {
    let mut value = serde_json::to_value(next)?;
    if let (Some(previous), Value::Object(fields)) = (previous, &mut value) {
        if let Value::Object(previous_fields) = serde_json::to_value(previous)? {
            for key in previous_fields.keys() {
                fields.entry(key.clone()).or_insert(Value::Null);
            }
        }
    }
    Ok(json!({ "status": value }))
}
