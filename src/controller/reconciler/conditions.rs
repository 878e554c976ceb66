//! # Condition Manager
//!
//! Maintains the Synced, Terminal and Recoverable conditions. Every function
//! works on an owned copy of the status and reports whether anything changed.

use crate::crd::{Condition, ConditionStatus, ConditionType, ResourceStatus};

/// Outcome of a backend operation as seen by the condition fold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationOutcome<'a> {
    Success,
    Recoverable(&'a str),
    Terminal(&'a str),
}

/// Set a condition in place, keeping one instance per type
///
/// The transition time moves only when the condition is created or its status flips.
pub fn set_condition(
    status: &mut ResourceStatus,
    condition_type: ConditionType,
    value: ConditionStatus,
    message: Option<String>,
) {
    let now = chrono::Utc::now().to_rfc3339();
    status
        .conditions
        .entry(condition_type)
        .and_modify(|c| {
            if c.status != value {
                c.last_transition_time = Some(now.clone());
            }
            c.status = value;
            c.message.clone_from(&message);
        })
        .or_insert_with(|| Condition {
            r#type: condition_type,
            status: value,
            last_transition_time: Some(now.clone()),
            message: message.clone(),
        });
}

/// Set `condition_type` to False and clear its message, only if it exists
fn clear_condition(status: &mut ResourceStatus, condition_type: ConditionType) {
    if status.conditions.contains_key(&condition_type) {
        set_condition(status, condition_type, ConditionStatus::False, None);
    }
}

/// Fold an operation outcome into the Terminal and Recoverable conditions
///
/// - terminal: Terminal is set True; Recoverable is left as it is
/// - recoverable: Recoverable is set True; an existing Terminal is cleared
/// - success: both are cleared if present
#[must_use]
pub fn fold(status: &ResourceStatus, outcome: OperationOutcome<'_>) -> (ResourceStatus, bool) {
    let mut next = status.clone();
    match outcome {
        OperationOutcome::Terminal(message) => set_condition(
            &mut next,
            ConditionType::Terminal,
            ConditionStatus::True,
            Some(message.to_string()),
        ),
        OperationOutcome::Recoverable(message) => {
            set_condition(
                &mut next,
                ConditionType::Recoverable,
                ConditionStatus::True,
                Some(message.to_string()),
            );
            clear_condition(&mut next, ConditionType::Terminal);
        }
        OperationOutcome::Success => {
            clear_condition(&mut next, ConditionType::Terminal);
            clear_condition(&mut next, ConditionType::Recoverable);
        }
    }
    let changed = next != *status;
    (next, changed)
}

/// Set the Synced condition
#[must_use]
pub fn set_synced(
    status: &ResourceStatus,
    synced: bool,
    message: Option<String>,
) -> (ResourceStatus, bool) {
    let mut next = status.clone();
    set_condition(&mut next, ConditionType::Synced, synced.into(), message);
    let changed = next != *status;
    (next, changed)
}
