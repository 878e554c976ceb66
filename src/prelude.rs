//! # Prelude
//!
//! Re-exports commonly used types and traits for convenience.
//!
//! ```rust
//! use prometheus_service_controller::prelude::*;
//! ```
//!
//! This brings into scope:
//! - All CRD types (Workspace, RuleGroupsNamespace, ResourceStatus, etc.)
//! - The backend trait and its wire types
//! - Reconciler types (Reconciler, PassResult, Outcome, etc.)
//! - Controller configuration

// CRD types - most commonly used
pub use crate::crd::*;

// Backend collaborator
pub use crate::provider::{
    Backend, BackendError, Kind, Mutation, ResourceKey, WireObject, WireRequest, WireStatus,
};

// Reconciler types - core controller functionality
pub use crate::controller::reconciler::{
    AwsIdentity, ManagedResource, Outcome, PassResult, Phase, ReconcileError, Reconciler,
    ReconcilerSettings, Requeue, RequeuePolicy, Severity, WaitReason,
};

// Config types
pub use crate::config::{ControllerConfig, LogFormat};

pub use crate::provider::aws::AmpBackend;
