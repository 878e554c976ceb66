use super::{require, status_or_default, TERMINAL_CODES};
use crate::controller::reconciler::classify::Phase;
use crate::controller::reconciler::delta::{compare_field, Delta};
use crate::controller::reconciler::kind::{Concern, FailurePolicy, KindPolicy, ManagedResource};
use crate::crd::{LoggingConfiguration, ResourceStatus};
use crate::provider::{Kind, ResourceKey, WireObject, WireRequest};

static POLICY: KindPolicy = KindPolicy {
    failure: FailurePolicy::AllowUpdate,
    terminal_codes: TERMINAL_CODES,
    immutable_fields: &["Spec.WorkspaceID"],
    concerns: &[Concern::LogGroup],
    preserve_on_validation_failure: false,
    delete_guard: Phase::allows_delete,
};

impl ManagedResource for LoggingConfiguration {
    const KIND: Kind = Kind::LoggingConfiguration;

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
        require(&self.spec.log_group_arn, "logGroupARN")
    }

    fn compare(&self, latest: &Self) -> Delta {
        let mut delta = Delta::new();
        compare_field(
            &mut delta,
            "Spec.LogGroupARN",
            &self.spec.log_group_arn,
            &latest.spec.log_group_arn,
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
            log_group_arn: Some(self.spec.log_group_arn.clone()),
            ..Default::default()
        }
    }

    fn apply_key(&mut self, key: &ResourceKey) {
        self.spec.workspace_id.clone_from(&key.workspace_id);
    }

    fn apply_spec(&mut self, object: &WireObject) {
        if let Some(log_group_arn) = &object.log_group_arn {
            self.spec.log_group_arn.clone_from(log_group_arn);
        }
    }

    fn apply_observed(&mut self, object: &WireObject) {
        self.spec.log_group_arn = object.log_group_arn.clone().unwrap_or_default();
    }
}
