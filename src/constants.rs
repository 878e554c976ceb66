//! # Constants
//!
//! Shared constants used throughout the controller.
//!
//! These values represent reasonable defaults and can be overridden via
//! environment variables where applicable (see `config::ControllerConfig`).

/// Default HTTP server port for metrics and health probes
pub const DEFAULT_METRICS_PORT: u16 = 8080;

/// Default HTTP server startup timeout (how long to wait for server to be ready)
pub const DEFAULT_SERVER_STARTUP_TIMEOUT_SECS: u64 = 10;

/// Default HTTP server readiness poll interval
pub const DEFAULT_SERVER_POLL_INTERVAL_MS: u64 = 50;

/// Requeue while the backend reports CREATING (seconds)
/// Creation is expected to take longer than the other transitions
pub const DEFAULT_REQUEUE_CREATING_SECS: u64 = 15;

/// Requeue while the backend reports UPDATING (seconds)
pub const DEFAULT_REQUEUE_UPDATING_SECS: u64 = 10;

/// Requeue while the backend reports DELETING (seconds)
pub const DEFAULT_REQUEUE_DELETING_SECS: u64 = 10;

/// Requeue for every other wait and every recoverable error (seconds)
pub const DEFAULT_REQUEUE_SECS: u64 = 30;

/// Periodic resync of synced resources, to pick up drift on the backend (seconds)
pub const DEFAULT_RESYNC_PERIOD_SECS: u64 = 36_000;

/// Upper bound on a single backend call (seconds)
pub const DEFAULT_BACKEND_CALL_TIMEOUT_SECS: u64 = 60;

/// Fibonacci backoff bounds for Kubernetes API failures (minutes)
pub const ERROR_BACKOFF_MIN_MINUTES: u64 = 1;
pub const ERROR_BACKOFF_MAX_MINUTES: u64 = 10;

/// Finalizer guarding deletion of the backend resource
pub const FINALIZER: &str = "prometheusservice.amp.dev/finalizer";

/// Field manager used for patches issued by the controller
pub const FIELD_MANAGER: &str = "prometheus-service-controller";

/// Backend error code for validation failures, the only terminal code
pub const VALIDATION_EXCEPTION: &str = "ValidationException";

/// Backend error code for a missing resource
pub const RESOURCE_NOT_FOUND_EXCEPTION: &str = "ResourceNotFoundException";

/// Status reason fragment reported when asynchronous validation of a
/// configuration payload failed
pub const VALIDATION_FAILURE_REASON: &str = "error validating";
