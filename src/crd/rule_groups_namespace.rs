//! # RuleGroupsNamespace
//!
//! A named set of Prometheus recording and alerting rules inside a workspace.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// RuleGroupsNamespace Custom Resource Definition
///
/// # Example
///
/// ```yaml
/// apiVersion: prometheusservice.amp.dev/v1alpha1
/// kind: RuleGroupsNamespace
/// metadata:
///   name: recording-rules
/// spec:
///   name: recording-rules
///   workspaceID: ws-0123abcd-4567-89ef-0123-456789abcdef
///   configuration: |
///     groups:
///       - name: example
///         rules:
///           - record: job:up:sum
///             expr: sum by (job) (up)
/// ```
#[derive(kube::CustomResource, Debug, Clone, Default, Deserialize, Serialize, schemars::JsonSchema)]
#[kube(
    kind = "RuleGroupsNamespace",
    group = "prometheusservice.amp.dev",
    version = "v1alpha1",
    namespaced,
    status = "crate::crd::ResourceStatus",
    shortname = "amprgn",
    printcolumn = r#"{"name":"Workspace", "type":"string", "jsonPath":".spec.workspaceID"}, {"name":"Status", "type":"string", "jsonPath":".status.statusCode"}, {"name":"Synced", "type":"string", "jsonPath":".status.conditions[?(@.type==\"ResourceSynced\")].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct RuleGroupsNamespaceSpec {
    /// Namespace name, unique within the workspace. Immutable.
    pub name: String,
    /// Owning workspace. Immutable.
    #[serde(rename = "workspaceID")]
    pub workspace_id: String,
    /// Rules file contents (YAML)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}
