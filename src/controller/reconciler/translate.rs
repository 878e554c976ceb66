//! # Field Translator
//!
//! Stateless mapping between the Kubernetes representation of a resource and
//! the backend wire representation.
//!
//! The backend stores configuration as an opaque byte payload, the resource
//! carries it as text. Text is encoded right before a request is built and
//! decoded when a description is read; the payload itself is never stored on
//! the resource, so it cannot leak back into comparisons.

use crate::constants::VALIDATION_FAILURE_REASON;
use crate::controller::reconciler::classify::classify;
use crate::controller::reconciler::conditions::{self, OperationOutcome};
use crate::controller::reconciler::kind::ManagedResource;
use crate::crd::{ResourceMetadata, ResourceStatus, StatusCode};
use crate::provider::{ResourceKey, WireObject};

/// Region and account used to fill status metadata the backend does not report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AwsIdentity {
    pub region: Option<String>,
    pub account_id: Option<String>,
}

#[must_use]
pub fn encode_configuration(text: Option<&str>) -> Option<Vec<u8>> {
    text.map(|t| t.as_bytes().to_vec())
}

#[must_use]
pub fn decode_configuration(data: &[u8]) -> String {
    String::from_utf8_lossy(data).into_owned()
}

/// Copy backend-assigned status fields present in `object`
pub fn apply_status(status: &mut ResourceStatus, object: &WireObject) {
    if let Some(arn) = &object.arn {
        status
            .resource_metadata
            .get_or_insert_with(ResourceMetadata::default)
            .arn = Some(arn.clone());
    }
    if let Some(wire) = &object.status {
        status.status_code = Some(StatusCode::from_wire(&wire.code));
        status.status_reason.clone_from(&wire.reason);
    }
    if let Some(workspace_id) = &object.workspace_id {
        status.workspace_id = Some(workspace_id.clone());
    }
    if let Some(endpoint) = &object.prometheus_endpoint {
        status.prometheus_endpoint = Some(endpoint.clone());
    }
}

/// Record the backend identity a resource is bound to
pub fn bind_identity(status: &mut ResourceStatus, key: &ResourceKey) {
    status.workspace_id = Some(key.workspace_id.clone());
    if key.name.is_some() {
        status.name.clone_from(&key.name);
    }
}

/// Fold a create, put or update response into `resource`
pub fn fold_response<K: ManagedResource>(resource: &mut K, object: &WireObject) {
    apply_status(resource.status_mut(), object);
    resource.apply_spec(object);
}

/// Fill region and owner account when the backend left them unset
pub fn set_status_defaults(status: &mut ResourceStatus, identity: &AwsIdentity) {
    let metadata = status
        .resource_metadata
        .get_or_insert_with(ResourceMetadata::default);
    if metadata.region.is_none() {
        metadata.region.clone_from(&identity.region);
    }
    if metadata.owner_account_id.is_none() {
        metadata.owner_account_id.clone_from(&identity.account_id);
    }
}

/// Build the latest snapshot of `desired` from a backend description
///
/// The configuration payload is decoded into the configuration text, with
/// two exceptions for kinds that preserve input on validation failure:
///
/// - the resource was already failed when the pass started: the configuration
///   is reported absent, so resubmitting the same text is seen as a change and
///   retried;
/// - the resource just moved into a failed phase because validation failed:
///   the submitted text is kept and Terminal is raised with the backend reason.
#[must_use]
pub fn fold_read<K: ManagedResource>(desired: &K, key: &ResourceKey, mut object: WireObject) -> K {
    let policy = K::policy();
    let was_failed = classify(desired.status()).is_failed();

    let mut latest = desired.clone();
    latest.apply_key(key);
    apply_status(latest.status_mut(), &object);
    latest.apply_observed(&object);
    bind_identity(latest.status_mut(), key);

    let decoded = object.data.take().map(|data| decode_configuration(&data));
    let validation_failure = (policy.preserve_on_validation_failure
        && !was_failed
        && classify(latest.status()).is_failed())
    .then(|| latest.status().and_then(|s| s.status_reason.clone()))
    .flatten()
    .filter(|reason| reason.contains(VALIDATION_FAILURE_REASON));

    if let Some(configuration) = latest.configuration_mut() {
        if policy.preserve_on_validation_failure && was_failed {
            *configuration = None;
        } else if validation_failure.is_none() {
            *configuration = decoded;
        }
    }

    if let Some(reason) = validation_failure {
        let current = latest.status().cloned().unwrap_or_default();
        let (status, _) = conditions::fold(&current, OperationOutcome::Terminal(&reason));
        *latest.status_mut() = status;
    }

    latest
}
