//! # Provider Modules
//!
//! The backend collaborator the reconciler drives. A backend exposes four
//! operations per resource kind (describe, create, update, delete) over a
//! kind-neutral wire representation; the AWS implementation lives in `aws`.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Managed resource kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Workspace,
    RuleGroupsNamespace,
    AlertManagerDefinition,
    LoggingConfiguration,
}

impl Kind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Workspace => "Workspace",
            Kind::RuleGroupsNamespace => "RuleGroupsNamespace",
            Kind::AlertManagerDefinition => "AlertManagerDefinition",
            Kind::LoggingConfiguration => "LoggingConfiguration",
        }
    }

    /// Human readable name used in condition messages
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Kind::Workspace => "Workspace",
            Kind::RuleGroupsNamespace => "Rule Groups Namespace",
            Kind::AlertManagerDefinition => "Alert Manager Definition",
            Kind::LoggingConfiguration => "Logging Configuration",
        }
    }

    #[must_use]
    pub fn describe_api(self) -> &'static str {
        match self {
            Kind::Workspace => "DescribeWorkspace",
            Kind::RuleGroupsNamespace => "DescribeRuleGroupsNamespace",
            Kind::AlertManagerDefinition => "DescribeAlertManagerDefinition",
            Kind::LoggingConfiguration => "DescribeLoggingConfiguration",
        }
    }

    #[must_use]
    pub fn create_api(self) -> &'static str {
        match self {
            Kind::Workspace => "CreateWorkspace",
            Kind::RuleGroupsNamespace => "CreateRuleGroupsNamespace",
            Kind::AlertManagerDefinition => "CreateAlertManagerDefinition",
            Kind::LoggingConfiguration => "CreateLoggingConfiguration",
        }
    }

    #[must_use]
    pub fn delete_api(self) -> &'static str {
        match self {
            Kind::Workspace => "DeleteWorkspace",
            Kind::RuleGroupsNamespace => "DeleteRuleGroupsNamespace",
            Kind::AlertManagerDefinition => "DeleteAlertManagerDefinition",
            Kind::LoggingConfiguration => "DeleteLoggingConfiguration",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a backend resource
///
/// Every kind is addressed by its workspace; rule groups namespaces also carry
/// their name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    pub workspace_id: String,
    pub name: Option<String>,
}

impl ResourceKey {
    #[must_use]
    pub fn workspace(workspace_id: impl Into<String>) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            name: None,
        }
    }

    #[must_use]
    pub fn named(workspace_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            name: Some(name.into()),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}/{}", self.workspace_id, name),
            None => f.write_str(&self.workspace_id),
        }
    }
}

/// Create or put request in wire form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireRequest {
    /// Absent only when creating a workspace (its ID is assigned by the backend)
    pub key: Option<ResourceKey>,
    /// Opaque configuration payload
    pub data: Option<Vec<u8>>,
    pub alias: Option<String>,
    pub kms_key_arn: Option<String>,
    pub log_group_arn: Option<String>,
    pub tags: BTreeMap<String, String>,
    /// Idempotency token for create calls
    pub client_token: Option<String>,
}

/// Backend lifecycle status as reported on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireStatus {
    pub code: String,
    pub reason: Option<String>,
}

/// Backend response in wire form; every field is optional because each API
/// returns a different subset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireObject {
    pub arn: Option<String>,
    pub workspace_id: Option<String>,
    pub name: Option<String>,
    pub alias: Option<String>,
    pub status: Option<WireStatus>,
    pub data: Option<Vec<u8>>,
    pub tags: Option<BTreeMap<String, String>>,
    pub prometheus_endpoint: Option<String>,
    pub kms_key_arn: Option<String>,
    pub log_group_arn: Option<String>,
}

/// A single mutating backend call issued by an update pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    TagResource {
        arn: String,
        tags: BTreeMap<String, String>,
    },
    UntagResource {
        arn: String,
        keys: Vec<String>,
    },
    /// Replace the kind's mutable attribute (configuration payload, alias or
    /// log group) with the request's value
    Put(WireRequest),
}

impl Mutation {
    /// Backend API name, used for metrics and spans
    #[must_use]
    pub fn api_name(&self, kind: Kind) -> &'static str {
        match self {
            Mutation::TagResource { .. } => "TagResource",
            Mutation::UntagResource { .. } => "UntagResource",
            Mutation::Put(_) => match kind {
                Kind::Workspace => "UpdateWorkspaceAlias",
                Kind::RuleGroupsNamespace => "PutRuleGroupsNamespace",
                Kind::AlertManagerDefinition => "PutAlertManagerDefinition",
                Kind::LoggingConfiguration => "UpdateLoggingConfiguration",
            },
        }
    }
}

/// Error returned by a backend call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The service answered with a modelled error code
    #[error("{code}: {message}")]
    Api { code: String, message: String },
    /// The call never produced a service answer (dispatch, timeout, decoding)
    #[error("{0}")]
    Transport(String),
}

impl BackendError {
    #[must_use]
    pub fn api(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Machine-readable error code, if the service returned one
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code),
            Self::Transport(_) => None,
        }
    }
}

/// Backend collaborator for managed Prometheus resources
#[async_trait]
pub trait Backend: Send + Sync {
    /// Read the current backend state; `None` when the resource does not exist
    async fn describe(&self, kind: Kind, key: &ResourceKey)
        -> Result<Option<WireObject>, BackendError>;

    /// Create the resource
    async fn create(&self, kind: Kind, request: &WireRequest) -> Result<WireObject, BackendError>;

    /// Apply one mutation; `None` when the API returns no resource state
    async fn update(&self, kind: Kind, mutation: &Mutation)
        -> Result<Option<WireObject>, BackendError>;

    /// Delete the resource; deleting a missing resource succeeds
    async fn delete(&self, kind: Kind, key: &ResourceKey) -> Result<(), BackendError>;
}

pub mod aws;
