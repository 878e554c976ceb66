//! # Resource Status
//!
//! Status types shared by every managed kind: the backend lifecycle code, the
//! backend-assigned metadata and the keyed condition set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Backend lifecycle status code
///
/// Assigned by the backend, never chosen by the client. Codes this controller
/// does not know yet deserialize into `Unknown` instead of failing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, schemars::JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusCode {
    Creating,
    Active,
    Updating,
    Deleting,
    CreationFailed,
    UpdateFailed,
    #[serde(other)]
    Unknown,
}

impl StatusCode {
    /// Parse a backend wire value
    #[must_use]
    pub fn from_wire(code: &str) -> Self {
        match code {
            "CREATING" => Self::Creating,
            "ACTIVE" => Self::Active,
            "UPDATING" => Self::Updating,
            "DELETING" => Self::Deleting,
            "CREATION_FAILED" => Self::CreationFailed,
            "UPDATE_FAILED" => Self::UpdateFailed,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Creating => "CREATING",
            Self::Active => "ACTIVE",
            Self::Updating => "UPDATING",
            Self::Deleting => "DELETING",
            Self::CreationFailed => "CREATION_FAILED",
            Self::UpdateFailed => "UPDATE_FAILED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend-assigned identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetadata {
    /// Amazon Resource Name of the backend resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    /// AWS account that owns the backend resource
    #[serde(
        default,
        rename = "ownerAccountID",
        skip_serializing_if = "Option::is_none"
    )]
    pub owner_account_id: Option<String>,
    /// Region the backend resource lives in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// Condition types maintained by the controller
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Deserialize,
    Serialize,
    schemars::JsonSchema,
)]
pub enum ConditionType {
    /// Desired and observed state agree; no requeue is forced
    #[serde(rename = "ResourceSynced")]
    Synced,
    /// A failure that will not be retried automatically
    Terminal,
    /// A failure that is retried with backoff
    Recoverable,
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Synced => "ResourceSynced",
            Self::Terminal => "Terminal",
            Self::Recoverable => "Recoverable",
        })
    }
}

/// Status of a condition (True, False, Unknown)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

impl From<bool> for ConditionStatus {
    fn from(value: bool) -> Self {
        if value {
            Self::True
        } else {
            Self::False
        }
    }
}

/// Condition represents a condition of a resource
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition
    pub r#type: ConditionType,
    /// Status of the condition
    pub status: ConditionStatus,
    /// Last transition time (RFC3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
    /// Message describing the condition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Conditions keyed by type; at most one instance per type
pub type Conditions = BTreeMap<ConditionType, Condition>;

/// Status of every managed resource
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceStatus {
    /// Backend-assigned identifiers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_metadata: Option<ResourceMetadata>,
    /// Last observed backend lifecycle code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<StatusCode>,
    /// Free-text reason reported alongside the status code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<String>,
    /// Synced, Terminal and Recoverable conditions
    #[serde(default, with = "condition_list")]
    #[schemars(with = "Vec<Condition>")]
    pub conditions: Conditions,
    /// Workspace the backend resource is bound to. For the Workspace kind this
    /// is the ID the backend assigned on create.
    #[serde(
        default,
        rename = "workspaceID",
        skip_serializing_if = "Option::is_none"
    )]
    pub workspace_id: Option<String>,
    /// Backend name the resource is bound to (RuleGroupsNamespace)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Remote write/query endpoint assigned by the backend (Workspace kind)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prometheus_endpoint: Option<String>,
}

impl ResourceStatus {
    #[must_use]
    pub fn condition(&self, condition_type: ConditionType) -> Option<&Condition> {
        self.conditions.get(&condition_type)
    }

    /// Whether the condition of the given type exists and is True
    #[must_use]
    pub fn is_condition_true(&self, condition_type: ConditionType) -> bool {
        self.condition(condition_type)
            .is_some_and(|c| c.status == ConditionStatus::True)
    }

    #[must_use]
    pub fn arn(&self) -> Option<&str> {
        self.resource_metadata
            .as_ref()
            .and_then(|m| m.arn.as_deref())
    }
}

/// Conditions are stored as a map but persisted as the usual Kubernetes list
mod condition_list {
    use super::{Condition, Conditions};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(conditions: &Conditions, serializer: S) -> Result<S::Ok, S::Error> {
        let list: Vec<&Condition> = conditions.values().collect();
        list.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Conditions, D::Error> {
        // Duplicates collapse onto one entry per type, last one wins
        let list = Vec::<Condition>::deserialize(deserializer)?;
        Ok(list.into_iter().map(|c| (c.r#type, c)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_from_wire() {
        assert_eq!(StatusCode::from_wire("CREATING"), StatusCode::Creating);
        assert_eq!(StatusCode::from_wire("UPDATE_FAILED"), StatusCode::UpdateFailed);
        assert_eq!(StatusCode::from_wire("PAUSED"), StatusCode::Unknown);
    }

    #[test]
    fn test_unknown_status_code_deserializes() {
        let status: ResourceStatus =
            serde_json::from_value(serde_json::json!({"statusCode": "SUSPENDING"})).unwrap();
        assert_eq!(status.status_code, Some(StatusCode::Unknown));
    }

    #[test]
    fn test_conditions_persist_as_list() {
        let mut status = ResourceStatus::default();
        status.conditions.insert(
            ConditionType::Terminal,
            Condition {
                r#type: ConditionType::Terminal,
                status: ConditionStatus::True,
                last_transition_time: None,
                message: Some("boom".to_string()),
            },
        );

        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(
            value["conditions"],
            serde_json::json!([{"type": "Terminal", "status": "True", "message": "boom"}])
        );
    }

    #[test]
    fn test_duplicate_conditions_collapse() {
        let status: ResourceStatus = serde_json::from_value(serde_json::json!({
            "conditions": [
                {"type": "Recoverable", "status": "True", "message": "first"},
                {"type": "Recoverable", "status": "False"}
            ]
        }))
        .unwrap();

        assert_eq!(status.conditions.len(), 1);
        assert!(!status.is_condition_true(ConditionType::Recoverable));
    }
}
