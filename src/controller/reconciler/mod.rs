//! # Reconciler
//!
//! The per-resource reconciliation state machine. One pass reads the backend
//! state, decides between create, update, delete and wait, issues the needed
//! backend calls and folds the responses and outcome back into status.
//!
//! ## Module Structure
//!
//! - `classify.rs` - Status Classifier
//! - `tags.rs` - Tag Delta Engine
//! - `delta.rs` - field-path differences between desired and latest
//! - `conditions.rs` - Condition Manager
//! - `translate.rs` - Field Translator
//! - `requeue.rs` - Requeue Policy
//! - `kind.rs` - per-kind capability set
//! - `types.rs` - outcome and error types

pub mod classify;
pub mod conditions;
pub mod delta;
pub mod kind;
pub mod requeue;
pub mod tags;
pub mod translate;
pub mod types;

pub use classify::{classify, Phase};
pub use kind::{Concern, FailurePolicy, KindPolicy, ManagedResource};
pub use requeue::{Requeue, RequeuePolicy};
pub use translate::AwsIdentity;
pub use types::{Outcome, PassResult, ReconcileError, Severity, WaitReason};

use crate::constants;
use crate::crd::ConditionType;
use crate::observability::metrics::{self, OpType};
use crate::provider::{Backend, BackendError, Kind, Mutation, ResourceKey};
use conditions::OperationOutcome;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

/// Tunables for a reconciler
#[derive(Debug, Clone)]
pub struct ReconcilerSettings {
    pub requeue: RequeuePolicy,
    /// Upper bound on a single backend call
    pub call_timeout: Duration,
    /// Fills status metadata the backend does not report
    pub identity: AwsIdentity,
}

impl Default for ReconcilerSettings {
    fn default() -> Self {
        Self {
            requeue: RequeuePolicy::default(),
            call_timeout: Duration::from_secs(constants::DEFAULT_BACKEND_CALL_TIMEOUT_SECS),
            identity: AwsIdentity::default(),
        }
    }
}

/// Decision of a pass before conditions and requeue are folded in
#[derive(Debug)]
struct Step<K> {
    resource: K,
    outcome: Outcome,
}

impl<K> Step<K> {
    fn new(resource: K, outcome: Outcome) -> Self {
        Self { resource, outcome }
    }
}

/// Generic reconciler, parameterized per call by the resource kind
pub struct Reconciler<B: ?Sized> {
    backend: Arc<B>,
    settings: ReconcilerSettings,
}

impl<B: ?Sized> Clone for Reconciler<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            settings: self.settings.clone(),
        }
    }
}

impl<B: ?Sized> std::fmt::Debug for Reconciler<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<B: Backend + ?Sized> Reconciler<B> {
    pub fn new(backend: Arc<B>, settings: ReconcilerSettings) -> Self {
        Self { backend, settings }
    }

    /// One full pass: read the backend state, then reconcile `desired` against it
    pub async fn sync<K: ManagedResource>(
        &self,
        desired: &K,
        cancel: &CancellationToken,
    ) -> PassResult<K> {
        match self.read_one(desired, cancel).await {
            Ok(latest) => self.reconcile(desired, latest.as_ref(), cancel).await,
            Err(error) => self.finish(desired, Step::new(desired.clone(), Outcome::Failed(error))),
        }
    }

    /// Describe the backend resource and build the latest snapshot of `desired`
    ///
    /// `Ok(None)` when the resource does not exist or cannot be addressed yet.
    pub async fn read_one<K: ManagedResource>(
        &self,
        desired: &K,
        cancel: &CancellationToken,
    ) -> Result<Option<K>, ReconcileError> {
        let Some(key) = desired.key() else {
            return Ok(None);
        };
        let object = self
            .call(
                K::KIND,
                K::KIND.describe_api(),
                OpType::ReadOne,
                cancel,
                self.backend.describe(K::KIND, &key),
            )
            .await?;
        Ok(object.map(|object| translate::fold_read(desired, &key, object)))
    }

    /// Reconcile `desired` against `latest`; `None` creates the resource
    pub async fn reconcile<K: ManagedResource>(
        &self,
        desired: &K,
        latest: Option<&K>,
        cancel: &CancellationToken,
    ) -> PassResult<K> {
        let step = match latest {
            None => self.create(desired, cancel).await,
            Some(latest) => self.update(desired, latest, cancel).await,
        };
        self.finish(desired, step)
    }

    /// Delete the backend resource
    ///
    /// Yields `Outcome::Deleted` once the backend no longer knows the resource.
    /// Delete is only issued from phases the kind's guard allows; any other
    /// phase waits with the default backoff.
    pub async fn finalize<K: ManagedResource>(
        &self,
        resource: &K,
        cancel: &CancellationToken,
    ) -> PassResult<K> {
        let step = self.delete(resource, cancel).await;
        self.finish(resource, step)
    }

    async fn create<K: ManagedResource>(&self, desired: &K, cancel: &CancellationToken) -> Step<K> {
        if let Err(reason) = desired.validate() {
            return Step::new(
                desired.clone(),
                Outcome::Failed(ReconcileError::InvalidSpec(reason)),
            );
        }

        let mut request = desired.to_request();
        request.client_token = desired.meta().uid.clone();

        let object = match self
            .call(
                K::KIND,
                K::KIND.create_api(),
                OpType::Create,
                cancel,
                self.backend.create(K::KIND, &request),
            )
            .await
        {
            Ok(object) => object,
            Err(error) => return Step::new(desired.clone(), Outcome::Failed(error)),
        };

        let mut ko = desired.clone();
        translate::fold_response(&mut ko, &object);
        if let Some(key) = &request.key {
            translate::bind_identity(ko.status_mut(), key);
        }
        info!(
            kind = K::KIND.as_str(),
            status = ?ko.status().and_then(|s| s.status_code),
            "created backend resource"
        );

        let phase = classify(ko.status());
        if phase.is_transient() {
            Step::new(ko, Outcome::Wait(WaitReason::InProgress(phase)))
        } else {
            Step::new(ko, Outcome::Synced)
        }
    }

    async fn update<K: ManagedResource>(
        &self,
        desired: &K,
        latest: &K,
        cancel: &CancellationToken,
    ) -> Step<K> {
        let policy = K::policy();
        let phase = classify(latest.status());

        // In-progress or unknown backend phase: never mutate, just wait
        if phase.is_transient() || phase == Phase::Unrecognized {
            return Step::new(desired.clone(), Outcome::Wait(WaitReason::InProgress(phase)));
        }

        let mut ko = desired.clone();
        *ko.status_mut() = latest.status().cloned().unwrap_or_default();

        match policy.failure {
            FailurePolicy::Latch if phase.is_failed() => {
                let message = format!(
                    "{} is in '{}' status",
                    K::KIND.display_name(),
                    phase.status_code()
                );
                return Step::new(ko, Outcome::Failed(ReconcileError::FailedPhase(message)));
            }
            FailurePolicy::AwaitActive if phase != Phase::Active => {
                return Step::new(desired.clone(), Outcome::Wait(WaitReason::NotActive(phase)));
            }
            _ => {}
        }

        let delta = desired.compare(latest);
        let immutable: Vec<&'static str> = policy
            .immutable_fields
            .iter()
            .copied()
            .filter(|path| delta.different_at(path))
            .collect();
        if !immutable.is_empty() {
            return Step::new(
                ko,
                Outcome::Failed(ReconcileError::ImmutableFieldChanged(immutable)),
            );
        }

        if phase.is_failed() && delta.is_empty() {
            // Nothing new to submit; surface the backend's failure reason
            let message = ko
                .status()
                .and_then(|s| s.status_reason.clone())
                .unwrap_or_else(|| {
                    format!(
                        "{} is in '{}' status",
                        K::KIND.display_name(),
                        phase.status_code()
                    )
                });
            return Step::new(ko, Outcome::Failed(ReconcileError::FailedPhase(message)));
        }

        if delta.is_empty() {
            return Step::new(ko, Outcome::Synced);
        }
        debug!(
            kind = K::KIND.as_str(),
            paths = ?delta.paths().collect::<Vec<_>>(),
            "desired state differs from backend"
        );

        for concern in policy.concerns {
            if !delta.different_at(concern.path()) {
                continue;
            }
            let applied = match concern {
                Concern::Tags => self.sync_tags(&mut ko, desired, latest, cancel).await,
                Concern::Configuration | Concern::Alias | Concern::LogGroup => {
                    self.put(&mut ko, desired, cancel).await
                }
            };
            if let Err(error) = applied {
                return Step::new(ko, Outcome::Failed(error));
            }
        }

        // Updates that take a while leave the resource in a transient phase
        let phase = classify(ko.status());
        if phase.is_transient() {
            Step::new(ko, Outcome::Wait(WaitReason::InProgress(phase)))
        } else {
            Step::new(ko, Outcome::Synced)
        }
    }

    /// Untag then tag, using the tag delta between latest and desired
    async fn sync_tags<K: ManagedResource>(
        &self,
        ko: &mut K,
        desired: &K,
        latest: &K,
        cancel: &CancellationToken,
    ) -> Result<(), ReconcileError> {
        let (Some(current), Some(wanted)) = (latest.tags(), desired.tags()) else {
            return Ok(());
        };
        let delta = tags::diff(current, wanted);
        if delta.is_empty() {
            return Ok(());
        }
        let arn = ko
            .status()
            .and_then(|s| s.arn())
            .map(str::to_string)
            .ok_or(ReconcileError::MissingArn)?;

        if !delta.removed.is_empty() {
            let mutation = Mutation::UntagResource {
                arn: arn.clone(),
                keys: delta.removed.iter().cloned().collect(),
            };
            self.mutate(ko, &mutation, cancel).await?;
        }
        if !delta.added_or_updated.is_empty() {
            let mutation = Mutation::TagResource {
                arn,
                tags: delta.added_or_updated.clone(),
            };
            self.mutate(ko, &mutation, cancel).await?;
        }
        Ok(())
    }

    /// Replace the kind's mutable attribute with the desired value
    async fn put<K: ManagedResource>(
        &self,
        ko: &mut K,
        desired: &K,
        cancel: &CancellationToken,
    ) -> Result<(), ReconcileError> {
        let mutation = Mutation::Put(desired.to_request());
        self.mutate(ko, &mutation, cancel).await
    }

    async fn mutate<K: ManagedResource>(
        &self,
        ko: &mut K,
        mutation: &Mutation,
        cancel: &CancellationToken,
    ) -> Result<(), ReconcileError> {
        let response = self
            .call(
                K::KIND,
                mutation.api_name(K::KIND),
                OpType::Update,
                cancel,
                self.backend.update(K::KIND, mutation),
            )
            .await?;
        if let Some(object) = response {
            translate::fold_response(ko, &object);
        }
        Ok(())
    }

    async fn delete<K: ManagedResource>(&self, resource: &K, cancel: &CancellationToken) -> Step<K> {
        // Never addressable, so never created
        let Some(key) = resource.key() else {
            return Step::new(resource.clone(), Outcome::Deleted);
        };
        let latest = match self.read_one(resource, cancel).await {
            Ok(Some(latest)) => latest,
            Ok(None) => return Step::new(resource.clone(), Outcome::Deleted),
            Err(error) => return Step::new(resource.clone(), Outcome::Failed(error)),
        };

        let phase = classify(latest.status());
        if !(K::policy().delete_guard)(phase) {
            return Step::new(
                resource.clone(),
                Outcome::Wait(WaitReason::DeleteBlocked(phase)),
            );
        }

        if let Err(error) = self.delete_key(K::KIND, &key, cancel).await {
            return Step::new(latest, Outcome::Failed(error));
        }
        info!(kind = K::KIND.as_str(), key = %key, "deletion requested");
        Step::new(latest, Outcome::Wait(WaitReason::InProgress(Phase::Deleting)))
    }

    async fn delete_key(
        &self,
        kind: Kind,
        key: &ResourceKey,
        cancel: &CancellationToken,
    ) -> Result<(), ReconcileError> {
        self.call(
            kind,
            kind.delete_api(),
            OpType::Delete,
            cancel,
            self.backend.delete(kind, key),
        )
        .await
    }

    /// Fold the outcome into conditions and pick the requeue signal
    fn finish<K: ManagedResource>(&self, input: &K, step: Step<K>) -> PassResult<K> {
        let policy = K::policy();
        let requeue = self
            .settings
            .requeue
            .classify(&step.outcome, policy.terminal_codes);

        // A cancelled pass hands the input back untouched
        if matches!(step.outcome, Outcome::Failed(ReconcileError::Cancelled)) {
            return PassResult {
                resource: input.clone(),
                outcome: step.outcome,
                requeue,
            };
        }

        let mut resource = step.resource;
        if matches!(step.outcome, Outcome::Deleted) {
            return PassResult {
                resource,
                outcome: step.outcome,
                requeue,
            };
        }

        let status = resource.status().cloned().unwrap_or_default();
        let (status, _) = match &step.outcome {
            Outcome::Synced => conditions::fold(&status, OperationOutcome::Success),
            Outcome::Failed(error) => {
                let message = error.to_string();
                match error.severity(policy.terminal_codes) {
                    Severity::Recoverable => {
                        warn!(kind = K::KIND.as_str(), error = %message, "recoverable failure");
                        conditions::fold(&status, OperationOutcome::Recoverable(&message))
                    }
                    Severity::Terminal | Severity::Fatal => {
                        warn!(kind = K::KIND.as_str(), error = %message, "terminal failure");
                        conditions::fold(&status, OperationOutcome::Terminal(&message))
                    }
                }
            }
            Outcome::Wait(_) | Outcome::Deleted => (status, false),
        };

        let synced_message = match &step.outcome {
            Outcome::Wait(reason) => Some(reason.message(K::KIND)),
            _ => None,
        };
        let (mut status, _) = conditions::set_synced(&status, requeue.is_synced(), synced_message);
        translate::set_status_defaults(&mut status, &self.settings.identity);
        *resource.status_mut() = status;

        debug!(
            kind = K::KIND.as_str(),
            synced = resource
                .status()
                .is_some_and(|s| s.is_condition_true(ConditionType::Synced)),
            requeue = ?requeue,
            "pass finished"
        );

        PassResult {
            resource,
            outcome: step.outcome,
            requeue,
        }
    }

    /// Run one backend call inside its own span, bounded by the call timeout
    /// and the cancellation token
    async fn call<T, F>(
        &self,
        kind: Kind,
        api: &'static str,
        op_type: OpType,
        cancel: &CancellationToken,
        request: F,
    ) -> Result<T, ReconcileError>
    where
        F: Future<Output = Result<T, BackendError>> + Send,
    {
        let span = info_span!("backend.call", kind = kind.as_str(), api);
        let timeout = self.settings.call_timeout;
        let start = Instant::now();

        let result = async {
            tokio::select! {
                biased;
                () = cancel.cancelled() => Err(ReconcileError::Cancelled),
                response = tokio::time::timeout(timeout, request) => match response {
                    Ok(Ok(value)) => Ok(value),
                    Ok(Err(source)) => {
                        warn!(code = source.code().unwrap_or("none"), error = %source, "backend call failed");
                        Err(ReconcileError::Backend { api, source })
                    }
                    Err(_elapsed) => Err(ReconcileError::Timeout { api, timeout }),
                },
            }
        }
        .instrument(span)
        .await;

        if !matches!(result, Err(ReconcileError::Cancelled)) {
            metrics::record_api_call(op_type, api, result.is_ok(), start.elapsed().as_secs_f64());
        }
        result
    }
}
