//! # LoggingConfiguration
//!
//! Vended-log delivery of a workspace into a CloudWatch log group.

use serde::{Deserialize, Serialize};

#[derive(kube::CustomResource, Debug, Clone, Default, Deserialize, Serialize, schemars::JsonSchema)]
#[kube(
    kind = "LoggingConfiguration",
    group = "prometheusservice.amp.dev",
    version = "v1alpha1",
    namespaced,
    status = "crate::crd::ResourceStatus",
    shortname = "amplog",
    printcolumn = r#"{"name":"Workspace", "type":"string", "jsonPath":".spec.workspaceID"}, {"name":"Status", "type":"string", "jsonPath":".status.statusCode"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfigurationSpec {
    /// Owning workspace. Immutable.
    #[serde(rename = "workspaceID")]
    pub workspace_id: String,
    /// ARN of the CloudWatch log group receiving the workspace logs
    #[serde(rename = "logGroupARN")]
    pub log_group_arn: String,
}
