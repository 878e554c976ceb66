//! # Kinds
//!
//! `ManagedResource` implementations, one per custom resource.

mod alert_manager_definition;
mod logging_configuration;
mod rule_groups_namespace;
mod workspace;

use crate::constants::VALIDATION_EXCEPTION;

/// Backend error codes treated as terminal by every kind
const TERMINAL_CODES: &[&str] = &[VALIDATION_EXCEPTION];

/// Require a non-empty string field
fn require(value: &str, field: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{field} must not be empty"))
    } else {
        Ok(())
    }
}

/// Status, created empty when absent
fn status_or_default(
    status: &mut Option<crate::crd::ResourceStatus>,
) -> &mut crate::crd::ResourceStatus {
    status.get_or_insert_with(crate::crd::ResourceStatus::default)
}
