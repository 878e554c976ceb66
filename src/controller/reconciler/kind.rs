//! # Kind Capabilities
//!
//! The small per-kind capability set the generic reconciler is parameterized
//! by: how to reach the status, which backend error codes are terminal, which
//! concerns are mutable, how a failed phase is treated and when delete is allowed.

use crate::controller::reconciler::classify::Phase;
use crate::controller::reconciler::delta::Delta;
use crate::crd::ResourceStatus;
use crate::provider::{Kind, ResourceKey, WireObject, WireRequest};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Debug;

/// How an update pass treats a resource whose latest phase is failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Raise Terminal and mark Synced; no update is attempted
    Latch,
    /// The backend accepts updates while failed, so the update proceeds
    AllowUpdate,
    /// Updates are only issued while the resource is active; otherwise wait
    AwaitActive,
}

/// Independently mutable part of a resource, each with its own backend call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Concern {
    Tags,
    Configuration,
    Alias,
    LogGroup,
}

impl Concern {
    /// Field path this concern is detected at in a `Delta`
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Concern::Tags => "Spec.Tags",
            Concern::Configuration => "Spec.Configuration",
            Concern::Alias => "Spec.Alias",
            Concern::LogGroup => "Spec.LogGroupARN",
        }
    }
}

#[derive(Debug)]
pub struct KindPolicy {
    pub failure: FailurePolicy,
    /// Backend error codes no retry can fix
    pub terminal_codes: &'static [&'static str],
    /// Field paths that may never change after creation
    pub immutable_fields: &'static [&'static str],
    /// Mutable concerns, in the order their calls are issued
    pub concerns: &'static [Concern],
    /// Keep the submitted configuration when the backend fails asynchronous validation
    pub preserve_on_validation_failure: bool,
    /// Phases from which a delete call may be issued
    pub delete_guard: fn(Phase) -> bool,
}

/// A Kubernetes custom resource reconciled against the backend
pub trait ManagedResource:
    kube::Resource<DynamicType = ()>
    + Clone
    + Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    const KIND: Kind;

    fn policy() -> &'static KindPolicy;

    fn status(&self) -> Option<&ResourceStatus>;

    /// Status, created empty when absent
    fn status_mut(&mut self) -> &mut ResourceStatus;

    /// Backend identity: the bound identity recorded in status when present,
    /// otherwise the one derived from spec. `None` when the resource cannot be
    /// addressed yet.
    fn key(&self) -> Option<ResourceKey>;

    /// Local checks that must pass before a create call
    fn validate(&self) -> Result<(), String>;

    /// Desired tags, for kinds that carry them
    fn tags(&self) -> Option<&BTreeMap<String, String>> {
        None
    }

    /// Field paths at which `self` (desired) differs from `latest`
    fn compare(&self, latest: &Self) -> Delta;

    /// Wire request carrying the full desired state
    fn to_request(&self) -> WireRequest;

    /// Overwrite spec identity fields with the key the backend resource is bound to
    fn apply_key(&mut self, key: &ResourceKey);

    /// Copy spec fields present in a backend response (configuration payload excluded)
    fn apply_spec(&mut self, object: &WireObject);

    /// Replace spec fields with a describe result; fields the backend does not
    /// report are cleared, not carried over from desired
    fn apply_observed(&mut self, object: &WireObject);

    /// Configuration text field, for kinds carrying an opaque payload
    fn configuration_mut(&mut self) -> Option<&mut Option<String>> {
        None
    }
}
