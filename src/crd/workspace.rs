//! # Workspace
//!
//! A logical Amazon Managed Service for Prometheus workspace. The workspace ID
//! is assigned by the backend on create and recorded in status.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Workspace Custom Resource Definition
///
/// # Example
///
/// ```yaml
/// apiVersion: prometheusservice.amp.dev/v1alpha1
/// kind: Workspace
/// metadata:
///   name: metrics
/// spec:
///   alias: metrics-prod
///   tags:
///     team: observability
/// ```
#[derive(kube::CustomResource, Debug, Clone, Default, Deserialize, Serialize, schemars::JsonSchema)]
#[kube(
    kind = "Workspace",
    group = "prometheusservice.amp.dev",
    version = "v1alpha1",
    namespaced,
    status = "crate::crd::ResourceStatus",
    shortname = "ampws",
    printcolumn = r#"{"name":"Alias", "type":"string", "jsonPath":".spec.alias"}, {"name":"WorkspaceID", "type":"string", "jsonPath":".status.workspaceID"}, {"name":"Status", "type":"string", "jsonPath":".status.statusCode"}, {"name":"Synced", "type":"string", "jsonPath":".status.conditions[?(@.type==\"ResourceSynced\")].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSpec {
    /// Human readable alias; need not be unique
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// ARN of the customer managed KMS key used to encrypt workspace data.
    /// Set at creation only.
    #[serde(
        default,
        rename = "kmsKeyARN",
        skip_serializing_if = "Option::is_none"
    )]
    pub kms_key_arn: Option<String>,
    /// Tags applied to the workspace
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}
