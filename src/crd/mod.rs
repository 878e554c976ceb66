//! # Custom Resource Definitions
//!
//! CRD types for the Prometheus service controller.
//!
//! ## Module Structure
//!
//! - `workspace.rs` - Workspace
//! - `rule_groups_namespace.rs` - RuleGroupsNamespace
//! - `alert_manager_definition.rs` - AlertManagerDefinition
//! - `logging_configuration.rs` - LoggingConfiguration
//! - `status.rs` - Status types shared by every kind

mod alert_manager_definition;
mod logging_configuration;
mod rule_groups_namespace;
mod status;
mod workspace;

pub use alert_manager_definition::{AlertManagerDefinition, AlertManagerDefinitionSpec};
pub use logging_configuration::{LoggingConfiguration, LoggingConfigurationSpec};
pub use rule_groups_namespace::{RuleGroupsNamespace, RuleGroupsNamespaceSpec};
pub use status::{
    Condition, ConditionStatus, ConditionType, Conditions, ResourceMetadata, ResourceStatus,
    StatusCode,
};
pub use workspace::{Workspace, WorkspaceSpec};
