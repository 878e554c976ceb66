//! # AlertManagerDefinition
//!
//! The single alert manager configuration of a workspace.

use serde::{Deserialize, Serialize};

/// AlertManagerDefinition Custom Resource Definition
///
/// # Example
///
/// ```yaml
/// apiVersion: prometheusservice.amp.dev/v1alpha1
/// kind: AlertManagerDefinition
/// metadata:
///   name: alerting
/// spec:
///   workspaceID: ws-0123abcd-4567-89ef-0123-456789abcdef
///   configuration: |
///     alertmanager_config: |
///       route:
///         receiver: default
///       receivers:
///         - name: default
/// ```
#[derive(kube::CustomResource, Debug, Clone, Default, Deserialize, Serialize, schemars::JsonSchema)]
#[kube(
    kind = "AlertManagerDefinition",
    group = "prometheusservice.amp.dev",
    version = "v1alpha1",
    namespaced,
    status = "crate::crd::ResourceStatus",
    shortname = "ampamd",
    printcolumn = r#"{"name":"Workspace", "type":"string", "jsonPath":".spec.workspaceID"}, {"name":"Status", "type":"string", "jsonPath":".status.statusCode"}, {"name":"Synced", "type":"string", "jsonPath":".status.conditions[?(@.type==\"ResourceSynced\")].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct AlertManagerDefinitionSpec {
    /// Owning workspace. Immutable.
    #[serde(rename = "workspaceID")]
    pub workspace_id: String,
    /// Alert manager configuration (YAML)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<String>,
}
