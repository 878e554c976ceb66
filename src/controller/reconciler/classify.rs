//! # Status Classifier
//!
//! Maps the last observed backend status onto a lifecycle phase.

use crate::crd::{ResourceStatus, StatusCode};
use std::fmt;

/// Lifecycle phase of a backend resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No status observed yet (pre-creation)
    NotFound,
    Creating,
    Updating,
    Deleting,
    Active,
    CreationFailed,
    UpdateFailed,
    /// The backend reported a status code this controller does not know
    Unrecognized,
}

impl Phase {
    /// Backend-owned in-progress phase; no mutation may be issued
    #[must_use]
    pub fn is_transient(self) -> bool {
        matches!(self, Phase::Creating | Phase::Updating | Phase::Deleting)
    }

    #[must_use]
    pub fn is_failed(self) -> bool {
        matches!(self, Phase::CreationFailed | Phase::UpdateFailed)
    }

    /// The backend accepts a delete call only from these phases
    #[must_use]
    pub fn allows_delete(self) -> bool {
        self == Phase::Active || self.is_failed()
    }

    /// Backend status code this phase was read from
    #[must_use]
    pub fn status_code(self) -> &'static str {
        match self {
            Phase::NotFound => "NOT_FOUND",
            Phase::Creating => StatusCode::Creating.as_str(),
            Phase::Updating => StatusCode::Updating.as_str(),
            Phase::Deleting => StatusCode::Deleting.as_str(),
            Phase::Active => StatusCode::Active.as_str(),
            Phase::CreationFailed => StatusCode::CreationFailed.as_str(),
            Phase::UpdateFailed => StatusCode::UpdateFailed.as_str(),
            Phase::Unrecognized => StatusCode::Unknown.as_str(),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::NotFound => "not-found",
            Phase::Creating => "creating",
            Phase::Updating => "updating",
            Phase::Deleting => "deleting",
            Phase::Active => "active",
            Phase::CreationFailed => "creation-failed",
            Phase::UpdateFailed => "update-failed",
            Phase::Unrecognized => "unrecognized",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<StatusCode> for Phase {
    fn from(code: StatusCode) -> Self {
        match code {
            StatusCode::Creating => Phase::Creating,
            StatusCode::Active => Phase::Active,
            StatusCode::Updating => Phase::Updating,
            StatusCode::Deleting => Phase::Deleting,
            StatusCode::CreationFailed => Phase::CreationFailed,
            StatusCode::UpdateFailed => Phase::UpdateFailed,
            StatusCode::Unknown => Phase::Unrecognized,
        }
    }
}

/// Classify a resource by its status; a missing status or status code is `NotFound`
#[must_use]
pub fn classify(status: Option<&ResourceStatus>) -> Phase {
    status
        .and_then(|s| s.status_code)
        .map_or(Phase::NotFound, Phase::from)
}
