use super::{status_or_default, TERMINAL_CODES};
use crate::controller::reconciler::classify::Phase;
use crate::controller::reconciler::delta::{compare_field, compare_tags, Delta};
use crate::controller::reconciler::kind::{Concern, FailurePolicy, KindPolicy, ManagedResource};
use crate::crd::{ResourceStatus, Workspace};
use crate::provider::{Kind, ResourceKey, WireObject, WireRequest};
use std::collections::BTreeMap;

static POLICY: KindPolicy = KindPolicy {
    failure: FailurePolicy::AwaitActive,
    terminal_codes: TERMINAL_CODES,
    immutable_fields: &["Spec.KMSKeyARN"],
    concerns: &[Concern::Tags, Concern::Alias],
    preserve_on_validation_failure: false,
    delete_guard: Phase::allows_delete,
};

impl ManagedResource for Workspace {
    const KIND: Kind = Kind::Workspace;

    fn policy() -> &'static KindPolicy {
        &POLICY
    }

    fn status(&self) -> Option<&ResourceStatus> {
        self.status.as_ref()
    }

    fn status_mut(&mut self) -> &mut ResourceStatus {
        status_or_default(&mut self.status)
    }

    // The workspace ID only exists once the backend assigned it
    fn key(&self) -> Option<ResourceKey> {
        self.status
            .as_ref()
            .and_then(|s| s.workspace_id.clone())
            .map(ResourceKey::workspace)
    }

    fn validate(&self) -> Result<(), String> {
        match &self.spec.alias {
            Some(alias) if alias.chars().count() > 100 => {
                Err("alias must be at most 100 characters".to_string())
            }
            _ => Ok(()),
        }
    }

    fn tags(&self) -> Option<&BTreeMap<String, String>> {
        Some(&self.spec.tags)
    }

    fn compare(&self, latest: &Self) -> Delta {
        let mut delta = Delta::new();
        compare_tags(&mut delta, "Spec.Tags", &self.spec.tags, &latest.spec.tags);
        compare_field(&mut delta, "Spec.Alias", &self.spec.alias, &latest.spec.alias);
        compare_field(
            &mut delta,
            "Spec.KMSKeyARN",
            &self.spec.kms_key_arn,
            &latest.spec.kms_key_arn,
        );
        delta
    }

    fn to_request(&self) -> WireRequest {
        WireRequest {
            key: self.key(),
            alias: self.spec.alias.clone(),
            kms_key_arn: self.spec.kms_key_arn.clone(),
            tags: self.spec.tags.clone(),
            ..Default::default()
        }
    }

    fn apply_key(&mut self, _key: &ResourceKey) {}

    fn apply_spec(&mut self, object: &WireObject) {
        if let Some(alias) = &object.alias {
            self.spec.alias = Some(alias.clone());
        }
        if let Some(kms_key_arn) = &object.kms_key_arn {
            self.spec.kms_key_arn = Some(kms_key_arn.clone());
        }
        if let Some(tags) = &object.tags {
            self.spec.tags.clone_from(tags);
        }
    }

    fn apply_observed(&mut self, object: &WireObject) {
        self.spec.alias.clone_from(&object.alias);
        self.spec.kms_key_arn.clone_from(&object.kms_key_arn);
        self.spec.tags = object.tags.clone().unwrap_or_default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::WorkspaceSpec;

    #[test]
    fn test_key_requires_assigned_id() {
        let mut ws = Workspace::new("metrics", WorkspaceSpec::default());
        assert_eq!(ws.key(), None);

        ws.status_mut().workspace_id = Some("ws-1".into());
        assert_eq!(ws.key(), Some(ResourceKey::workspace("ws-1")));
    }

    #[test]
    fn test_compare_kms_key_change() {
        let desired = Workspace::new(
            "metrics",
            WorkspaceSpec {
                kms_key_arn: Some("arn:aws:kms:us-west-2:111122223333:key/new".into()),
                ..Default::default()
            },
        );
        let mut latest = desired.clone();
        latest.spec.kms_key_arn = Some("arn:aws:kms:us-west-2:111122223333:key/old".into());

        let delta = desired.compare(&latest);
        assert!(delta.different_at("Spec.KMSKeyARN"));
        assert!(!delta.different_at("Spec.Alias"));
    }

    #[test]
    fn test_apply_observed_clears_unreported_fields() {
        let mut latest = Workspace::new(
            "metrics",
            WorkspaceSpec {
                alias: Some("prod".into()),
                kms_key_arn: Some("arn:aws:kms:us-west-2:111122223333:key/a".into()),
                tags: BTreeMap::from([("team".to_string(), "observability".to_string())]),
            },
        );

        latest.apply_observed(&WireObject::default());

        assert_eq!(latest.spec.alias, None);
        assert_eq!(latest.spec.kms_key_arn, None);
        assert!(latest.spec.tags.is_empty());
    }
}
