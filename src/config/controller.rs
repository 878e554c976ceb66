//! # Controller Configuration
//!
//! Controller-level settings loaded from environment variables.

use crate::constants::*;
use crate::controller::reconciler::{AwsIdentity, ReconcilerSettings, RequeuePolicy};
use std::time::Duration;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Controller-level configuration
///
/// All settings have defaults in `constants` and can be overridden via
/// environment variables populated from a ConfigMap with `envFrom`.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Requeue while the backend reports CREATING (seconds)
    pub requeue_creating_secs: u64,
    /// Requeue while the backend reports UPDATING (seconds)
    pub requeue_updating_secs: u64,
    /// Requeue while the backend reports DELETING (seconds)
    pub requeue_deleting_secs: u64,
    /// Requeue for every other wait and recoverable error (seconds)
    pub requeue_default_secs: u64,
    /// Resync period for synced resources (seconds)
    pub resync_period_secs: u64,
    /// Upper bound on a single backend call (seconds)
    pub backend_call_timeout_secs: u64,
    pub metrics_port: u16,
    pub server_startup_timeout_secs: u64,
    pub server_poll_interval_ms: u64,
    pub log_format: LogFormat,
    /// Overrides the region resolved by the AWS default provider chain
    pub aws_region: Option<String>,
    /// Restricts the watch to one namespace; all namespaces when unset
    pub watch_namespace: Option<String>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            requeue_creating_secs: parsed_or_default(
                &lookup,
                "REQUEUE_CREATING_SECS",
                DEFAULT_REQUEUE_CREATING_SECS,
            ),
            requeue_updating_secs: parsed_or_default(
                &lookup,
                "REQUEUE_UPDATING_SECS",
                DEFAULT_REQUEUE_UPDATING_SECS,
            ),
            requeue_deleting_secs: parsed_or_default(
                &lookup,
                "REQUEUE_DELETING_SECS",
                DEFAULT_REQUEUE_DELETING_SECS,
            ),
            requeue_default_secs: parsed_or_default(
                &lookup,
                "REQUEUE_DEFAULT_SECS",
                DEFAULT_REQUEUE_SECS,
            ),
            resync_period_secs: parsed_or_default(
                &lookup,
                "RESYNC_PERIOD_SECS",
                DEFAULT_RESYNC_PERIOD_SECS,
            ),
            backend_call_timeout_secs: parsed_or_default(
                &lookup,
                "BACKEND_CALL_TIMEOUT_SECS",
                DEFAULT_BACKEND_CALL_TIMEOUT_SECS,
            ),
            metrics_port: parsed_or_default(&lookup, "METRICS_PORT", DEFAULT_METRICS_PORT),
            server_startup_timeout_secs: parsed_or_default(
                &lookup,
                "SERVER_STARTUP_TIMEOUT_SECS",
                DEFAULT_SERVER_STARTUP_TIMEOUT_SECS,
            ),
            server_poll_interval_ms: parsed_or_default(
                &lookup,
                "SERVER_POLL_INTERVAL_MS",
                DEFAULT_SERVER_POLL_INTERVAL_MS,
            ),
            log_format: lookup("LOG_FORMAT")
                .map_or(LogFormat::Text, |value| LogFormat::parse(&value)),
            aws_region: non_empty(&lookup, "AWS_REGION"),
            watch_namespace: non_empty(&lookup, "WATCH_NAMESPACE"),
        }
    }

    #[must_use]
    pub fn requeue_policy(&self) -> RequeuePolicy {
        RequeuePolicy {
            creating: Duration::from_secs(self.requeue_creating_secs),
            updating: Duration::from_secs(self.requeue_updating_secs),
            deleting: Duration::from_secs(self.requeue_deleting_secs),
            default: Duration::from_secs(self.requeue_default_secs),
        }
    }

    #[must_use]
    pub fn resync_period(&self) -> Duration {
        Duration::from_secs(self.resync_period_secs)
    }

    /// Reconciler settings for a controller running under `identity`
    #[must_use]
    pub fn reconciler_settings(&self, identity: AwsIdentity) -> ReconcilerSettings {
        ReconcilerSettings {
            requeue: self.requeue_policy(),
            call_timeout: Duration::from_secs(self.backend_call_timeout_secs),
            identity,
        }
    }
}

/// Read a key and parse it, falling back to `default` when absent or malformed
fn parsed_or_default<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> ControllerConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ControllerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = ControllerConfig::default();
        let policy = config.requeue_policy();
        assert_eq!(policy.creating, Duration::from_secs(15));
        assert_eq!(policy.updating, Duration::from_secs(10));
        assert_eq!(policy.deleting, Duration::from_secs(10));
        assert_eq!(policy.default, Duration::from_secs(30));
        assert_eq!(config.resync_period(), Duration::from_secs(36_000));
        assert_eq!(config.metrics_port, 8080);
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.aws_region, None);
        assert_eq!(config.watch_namespace, None);
    }

    #[test]
    fn test_overrides_and_malformed_values() {
        let config = config_from(&[
            ("REQUEUE_CREATING_SECS", "5"),
            ("REQUEUE_DEFAULT_SECS", "not-a-number"),
            ("BACKEND_CALL_TIMEOUT_SECS", " 20 "),
            ("LOG_FORMAT", "JSON"),
            ("AWS_REGION", "eu-west-1"),
            ("WATCH_NAMESPACE", ""),
        ]);
        assert_eq!(config.requeue_creating_secs, 5);
        assert_eq!(config.requeue_default_secs, DEFAULT_REQUEUE_SECS);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.aws_region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.watch_namespace, None);

        let settings = config.reconciler_settings(AwsIdentity::default());
        assert_eq!(settings.call_timeout, Duration::from_secs(20));
        assert_eq!(settings.requeue.creating, Duration::from_secs(5));
    }
}
