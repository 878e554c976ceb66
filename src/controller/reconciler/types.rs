//! # Types
//!
//! Outcome and error types for a reconciliation pass.

use crate::controller::reconciler::classify::Phase;
use crate::controller::reconciler::requeue::Requeue;
use crate::provider::{BackendError, Kind};
use std::time::Duration;
use thiserror::Error;

/// Classified failure of a reconciliation pass
#[derive(Debug, Clone, Error)]
pub enum ReconcileError {
    #[error("{api} failed: {source}")]
    Backend {
        api: &'static str,
        #[source]
        source: BackendError,
    },
    #[error("{api} timed out after {}s", .timeout.as_secs())]
    Timeout { api: &'static str, timeout: Duration },
    #[error("reconciliation cancelled")]
    Cancelled,
    /// Latest backend status is a failed phase the kind does not update from
    #[error("{0}")]
    FailedPhase(String),
    #[error("immutable field(s) changed: {}", .0.join(", "))]
    ImmutableFieldChanged(Vec<&'static str>),
    #[error("resource ARN is not known yet")]
    MissingArn,
    #[error("invalid spec: {0}")]
    InvalidSpec(String),
}

/// How a failure is retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Retried with the default backoff
    Recoverable,
    /// Recorded as a Terminal condition; not retried until the object changes
    Terminal,
    /// Local validation failure; the scheduler waits for the object to change
    Fatal,
}

impl ReconcileError {
    /// Classify against the kind's terminal backend error codes
    #[must_use]
    pub fn severity(&self, terminal_codes: &[&str]) -> Severity {
        match self {
            ReconcileError::Backend { source, .. } => match source.code() {
                Some(code) if terminal_codes.contains(&code) => Severity::Terminal,
                _ => Severity::Recoverable,
            },
            ReconcileError::FailedPhase(_) | ReconcileError::ImmutableFieldChanged(_) => {
                Severity::Terminal
            }
            ReconcileError::InvalidSpec(_) => Severity::Fatal,
            ReconcileError::Timeout { .. }
            | ReconcileError::Cancelled
            | ReconcileError::MissingArn => Severity::Recoverable,
        }
    }
}

/// Why a pass is waiting on the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitReason {
    /// The backend reports an in-progress (or unrecognized) phase
    InProgress(Phase),
    /// The kind only accepts updates while active
    NotActive(Phase),
    /// Delete is not accepted from this phase yet
    DeleteBlocked(Phase),
}

impl WaitReason {
    #[must_use]
    pub fn message(self, kind: Kind) -> String {
        let name = kind.display_name();
        match self {
            WaitReason::InProgress(phase) => format!(
                "{name} is in '{}' state, cannot be modified or deleted",
                phase.status_code()
            ),
            WaitReason::NotActive(phase) => format!(
                "{name} is in '{}' state, updates are only applied while 'ACTIVE'",
                phase.status_code()
            ),
            WaitReason::DeleteBlocked(phase) => format!(
                "{name} is in '{}' state, cannot be deleted yet",
                phase.status_code()
            ),
        }
    }

    /// Metrics label
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            WaitReason::InProgress(_) => "in-progress",
            WaitReason::NotActive(_) => "not-active",
            WaitReason::DeleteBlocked(_) => "delete-blocked",
        }
    }
}

/// What a pass decided
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Desired and latest agree, or every needed mutation completed synchronously
    Synced,
    Wait(WaitReason),
    /// The backend resource no longer exists
    Deleted,
    Failed(ReconcileError),
}

impl Outcome {
    /// Metrics label
    #[must_use]
    pub fn label(&self, terminal_codes: &[&str]) -> &'static str {
        match self {
            Outcome::Synced => "synced",
            Outcome::Wait(_) => "wait",
            Outcome::Deleted => "deleted",
            Outcome::Failed(e) => match e.severity(terminal_codes) {
                Severity::Recoverable => "recoverable",
                Severity::Terminal => "terminal",
                Severity::Fatal => "fatal",
            },
        }
    }
}

/// Result of one reconciliation pass, handed back to the scheduler
///
/// `resource` is always an owned copy; the caller's input is never mutated.
#[derive(Debug, Clone)]
pub struct PassResult<K> {
    pub resource: K,
    pub outcome: Outcome,
    pub requeue: Requeue,
}

#[cfg(test)]
mod tests {
    use super::*;

    const TERMINAL: &[&str] = &["ValidationException"];

    #[test]
    fn test_severity_by_error_code() {
        let cases = [
            (
                ReconcileError::Backend {
                    api: "PutRuleGroupsNamespace",
                    source: BackendError::api("ValidationException", "bad yaml"),
                },
                Severity::Terminal,
            ),
            (
                ReconcileError::Backend {
                    api: "PutRuleGroupsNamespace",
                    source: BackendError::api("ThrottlingException", "slow down"),
                },
                Severity::Recoverable,
            ),
            (
                ReconcileError::Backend {
                    api: "DescribeWorkspace",
                    source: BackendError::Transport("dispatch failure".into()),
                },
                Severity::Recoverable,
            ),
            (ReconcileError::Cancelled, Severity::Recoverable),
            (
                ReconcileError::ImmutableFieldChanged(vec!["Spec.Name"]),
                Severity::Terminal,
            ),
            (
                ReconcileError::InvalidSpec("missing name".into()),
                Severity::Fatal,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.severity(TERMINAL), expected, "{error}");
        }
    }

    #[test]
    fn test_wait_messages() {
        assert_eq!(
            WaitReason::InProgress(Phase::Creating).message(Kind::RuleGroupsNamespace),
            "Rule Groups Namespace is in 'CREATING' state, cannot be modified or deleted"
        );
        assert_eq!(
            WaitReason::NotActive(Phase::CreationFailed).message(Kind::Workspace),
            "Workspace is in 'CREATION_FAILED' state, updates are only applied while 'ACTIVE'"
        );
    }

    #[test]
    fn test_error_messages() {
        let error = ReconcileError::Backend {
            api: "PutAlertManagerDefinition",
            source: BackendError::api("ValidationException", "invalid route"),
        };
        assert_eq!(
            error.to_string(),
            "PutAlertManagerDefinition failed: ValidationException: invalid route"
        );
        assert_eq!(
            ReconcileError::ImmutableFieldChanged(vec!["Spec.Name", "Spec.WorkspaceID"])
                .to_string(),
            "immutable field(s) changed: Spec.Name, Spec.WorkspaceID"
        );
    }
}
