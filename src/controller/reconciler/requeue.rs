//! # Requeue Policy
//!
//! Maps the outcome of a pass onto what the scheduler should do next.

use crate::constants;
use crate::controller::reconciler::classify::Phase;
use crate::controller::reconciler::types::{Outcome, Severity, WaitReason};
use std::time::Duration;

/// Scheduler signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requeue {
    /// Nothing pending; the next pass comes from a watch event or periodic resync
    Done,
    RetryAfter(Duration),
    /// Do not retry until the object changes
    Fatal,
}

impl Requeue {
    /// Synced condition value for this signal
    #[must_use]
    pub fn is_synced(self) -> bool {
        !matches!(self, Requeue::RetryAfter(_))
    }
}

/// Retry durations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequeuePolicy {
    pub creating: Duration,
    pub updating: Duration,
    pub deleting: Duration,
    /// Any other wait and every recoverable error
    pub default: Duration,
}

impl Default for RequeuePolicy {
    fn default() -> Self {
        Self {
            creating: Duration::from_secs(constants::DEFAULT_REQUEUE_CREATING_SECS),
            updating: Duration::from_secs(constants::DEFAULT_REQUEUE_UPDATING_SECS),
            deleting: Duration::from_secs(constants::DEFAULT_REQUEUE_DELETING_SECS),
            default: Duration::from_secs(constants::DEFAULT_REQUEUE_SECS),
        }
    }
}

impl RequeuePolicy {
    #[must_use]
    pub fn wait_duration(&self, reason: WaitReason) -> Duration {
        match reason {
            WaitReason::InProgress(Phase::Creating) => self.creating,
            WaitReason::InProgress(Phase::Updating) => self.updating,
            WaitReason::InProgress(Phase::Deleting) => self.deleting,
            WaitReason::InProgress(_)
            | WaitReason::NotActive(_)
            | WaitReason::DeleteBlocked(_) => self.default,
        }
    }

    #[must_use]
    pub fn classify(&self, outcome: &Outcome, terminal_codes: &[&str]) -> Requeue {
        match outcome {
            Outcome::Synced | Outcome::Deleted => Requeue::Done,
            Outcome::Wait(reason) => Requeue::RetryAfter(self.wait_duration(*reason)),
            Outcome::Failed(error) => match error.severity(terminal_codes) {
                Severity::Terminal => Requeue::Done,
                Severity::Fatal => Requeue::Fatal,
                Severity::Recoverable => Requeue::RetryAfter(self.default),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::reconciler::types::ReconcileError;
    use crate::provider::BackendError;

    const TERMINAL: &[&str] = &["ValidationException"];

    #[test]
    fn test_classify_outcomes() {
        let policy = RequeuePolicy::default();
        let cases = [
            (Outcome::Synced, Requeue::Done),
            (Outcome::Deleted, Requeue::Done),
            (
                Outcome::Wait(WaitReason::InProgress(Phase::Creating)),
                Requeue::RetryAfter(Duration::from_secs(15)),
            ),
            (
                Outcome::Wait(WaitReason::InProgress(Phase::Updating)),
                Requeue::RetryAfter(Duration::from_secs(10)),
            ),
            (
                Outcome::Wait(WaitReason::InProgress(Phase::Deleting)),
                Requeue::RetryAfter(Duration::from_secs(10)),
            ),
            (
                Outcome::Wait(WaitReason::InProgress(Phase::Unrecognized)),
                Requeue::RetryAfter(Duration::from_secs(30)),
            ),
            (
                Outcome::Wait(WaitReason::DeleteBlocked(Phase::Creating)),
                Requeue::RetryAfter(Duration::from_secs(30)),
            ),
            (
                Outcome::Failed(ReconcileError::Backend {
                    api: "TagResource",
                    source: BackendError::api("ValidationException", "too many tags"),
                }),
                Requeue::Done,
            ),
            (
                Outcome::Failed(ReconcileError::Backend {
                    api: "TagResource",
                    source: BackendError::api("InternalServerException", "oops"),
                }),
                Requeue::RetryAfter(Duration::from_secs(30)),
            ),
            (
                Outcome::Failed(ReconcileError::InvalidSpec("empty name".into())),
                Requeue::Fatal,
            ),
        ];

        for (outcome, expected) in cases {
            assert_eq!(policy.classify(&outcome, TERMINAL), expected, "{outcome:?}");
        }
    }

    #[test]
    fn test_synced_follows_requeue() {
        assert!(Requeue::Done.is_synced());
        assert!(Requeue::Fatal.is_synced());
        assert!(!Requeue::RetryAfter(Duration::from_secs(1)).is_synced());
    }
}
