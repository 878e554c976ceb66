use super::{require, status_or_default, TERMINAL_CODES};
use crate::controller::reconciler::classify::Phase;
use crate::controller::reconciler::delta::{compare_field, compare_tags, Delta};
use crate::controller::reconciler::kind::{Concern, FailurePolicy, KindPolicy, ManagedResource};
use crate::controller::reconciler::translate::encode_configuration;
use crate::crd::{ResourceStatus, RuleGroupsNamespace};
use crate::provider::{Kind, ResourceKey, WireObject, WireRequest};
use std::collections::BTreeMap;

static POLICY: KindPolicy = KindPolicy {
    failure: FailurePolicy::Latch,
    terminal_codes: TERMINAL_CODES,
    immutable_fields: &["Spec.Name", "Spec.WorkspaceID"],
    concerns: &[Concern::Tags, Concern::Configuration],
    preserve_on_validation_failure: false,
    delete_guard: Phase::allows_delete,
};

impl ManagedResource for RuleGroupsNamespace {
    const KIND: Kind = Kind::RuleGroupsNamespace;

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
        let bound = self.status.as_ref();
        let workspace_id = bound
            .and_then(|s| s.workspace_id.clone())
            .unwrap_or_else(|| self.spec.workspace_id.clone());
        let name = bound
            .and_then(|s| s.name.clone())
            .unwrap_or_else(|| self.spec.name.clone());
        (!workspace_id.is_empty() && !name.is_empty())
            .then(|| ResourceKey::named(workspace_id, name))
    }

    fn validate(&self) -> Result<(), String> {
        require(&self.spec.name, "name")?;
        require(&self.spec.workspace_id, "workspaceID")?;
        if self.spec.configuration.is_none() {
            return Err("configuration is required".to_string());
        }
        Ok(())
    }

    fn tags(&self) -> Option<&BTreeMap<String, String>> {
        Some(&self.spec.tags)
    }

    fn compare(&self, latest: &Self) -> Delta {
        let mut delta = Delta::new();
        compare_tags(&mut delta, "Spec.Tags", &self.spec.tags, &latest.spec.tags);
        compare_field(
            &mut delta,
            "Spec.Configuration",
            &self.spec.configuration,
            &latest.spec.configuration,
        );
        compare_field(&mut delta, "Spec.Name", &self.spec.name, &latest.spec.name);
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
            tags: self.spec.tags.clone(),
            ..Default::default()
        }
    }

    fn apply_key(&mut self, key: &ResourceKey) {
        self.spec.workspace_id.clone_from(&key.workspace_id);
        if let Some(name) = &key.name {
            self.spec.name.clone_from(name);
        }
    }

    fn apply_spec(&mut self, object: &WireObject) {
        if let Some(name) = &object.name {
            self.spec.name.clone_from(name);
        }
        if let Some(tags) = &object.tags {
            self.spec.tags.clone_from(tags);
        }
    }

    fn apply_observed(&mut self, object: &WireObject) {
        // Name already comes from the key when the backend leaves it out
        if let Some(name) = &object.name {
            self.spec.name.clone_from(name);
        }
        self.spec.tags = object.tags.clone().unwrap_or_default();
    }

    fn configuration_mut(&mut self) -> Option<&mut Option<String>> {
        Some(&mut self.spec.configuration)
    }
}
