use super::{require, status_or_default, TERMINAL_CODES};
use crate::controller::reconciler::classify::Phase;
use crate::controller::reconciler::delta::{compare_field, Delta};
use crate::controller::reconciler::kind::{Concern, FailurePolicy, KindPolicy, ManagedResource};
use crate::controller::reconciler::translate::encode_configuration;
use crate::crd::{AlertManagerDefinition, ResourceStatus};
use crate::provider::{Kind, ResourceKey, WireObject, WireRequest};

// The backend accepts a new definition while the last one failed, and
// validates it asynchronously
static POLICY: KindPolicy = KindPolicy {
    failure: FailurePolicy::AllowUpdate,
    terminal_codes: TERMINAL_CODES,
    immutable_fields: &["Spec.WorkspaceID"],
    concerns: &[Concern::Configuration],
    preserve_on_validation_failure: true,
    delete_guard: Phase::allows_delete,
};

impl ManagedResource for AlertManagerDefinition {
    const KIND: Kind = Kind::AlertManagerDefinition;

    fn policy() -> &'static KindPolicy {
        &POLICY
    }

    fn status(&self) -> Option<&ResourceStatus> {
        self.status.as_ref()
    }

    fn status_mut(&mut self) -> &mut ResourceStatus {
        status_or_default(&mut self.status)
    }

    fn key(&self) -> Option<ResourceKey> {
        let workspace_id = self
            .status
            .as_ref()
            .and_then(|s| s.workspace_id.clone())
            .unwrap_or_else(|| self.spec.workspace_id.clone());
        (!workspace_id.is_empty()).then(|| ResourceKey::workspace(workspace_id))
    }

    fn validate(&self) -> Result<(), String> {
        require(&self.spec.workspace_id, "workspaceID")?;
        if self.spec.configuration.is_none() {
            return Err("configuration is required".to_string());
        }
        Ok(())
    }

    fn compare(&self, latest: &Self) -> Delta {
        let mut delta = Delta::new();
        compare_field(
            &mut delta,
            "Spec.Configuration",
            &self.spec.configuration,
            &latest.spec.configuration,
        );
        compare_field(
            &mut delta,
            "Spec.WorkspaceID",
            &self.spec.workspace_id,
            &latest.spec.workspace_id,
        );
        delta
    }

    fn to_request(&self) -> WireRequest {
        WireRequest {
            key: self.key(),
            data: encode_configuration(self.spec.configuration.as_deref()),
            ..Default::default()
        }
    }

    fn apply_key(&mut self, key: &ResourceKey) {
        self.spec.workspace_id.clone_from(&key.workspace_id);
    }

    fn apply_spec(&mut self, _object: &WireObject) {}

    // Configuration is decoded by the read path itself
    fn apply_observed(&mut self, _object: &WireObject) {}

    fn configuration_mut(&mut self) -> Option<&mut Option<String>> {
        Some(&mut self.spec.configuration)
    }
}
