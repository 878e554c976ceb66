//! # Fibonacci Backoff
//!
//! Progressive backoff for Kubernetes API failures in the watch loop. Grows
//! more slowly than exponential backoff: 1m, 1m, 2m, 3m, 5m, 8m, then capped.
//!
//! Backend failures never reach this path; they are classified by the
//! reconciler and requeued through its own policy.
//!
//! ## Usage
//!
//! ```rust
//! use prometheus_service_controller::controller::backoff::FibonacciBackoff;
//! use std::time::Duration;
//!
//! let mut backoff = FibonacciBackoff::from_minutes(1, 10);
//! assert_eq!(backoff.next_delay(), Duration::from_secs(60));
//! assert_eq!(backoff.next_delay(), Duration::from_secs(60));
//! assert_eq!(backoff.next_delay(), Duration::from_secs(120));
//! ```

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Fibonacci backoff calculator
///
/// Each delay is the sum of the previous two, capped at `max`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FibonacciBackoff {
    min: Duration,
    max: Duration,
    prev: Duration,
    current: Duration,
    attempts: u32,
}

impl FibonacciBackoff {
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max,
            prev: Duration::ZERO,
            current: min,
            attempts: 0,
        }
    }

    #[must_use]
    pub fn from_minutes(min_minutes: u64, max_minutes: u64) -> Self {
        Self::new(
            Duration::from_secs(min_minutes * 60),
            Duration::from_secs(max_minutes * 60),
        )
    }

    /// Return the current delay and advance the sequence
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        let next = self.prev.saturating_add(self.current);
        self.prev = self.current;
        self.current = next.min(self.max);
        self.attempts = self.attempts.saturating_add(1);
        delay
    }

    /// Number of delays handed out since the last reset
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn reset(&mut self) {
        self.prev = Duration::ZERO;
        self.current = self.min;
        self.attempts = 0;
    }
}

/// Independent backoff state per resource, keyed by `kind/namespace/name`
#[derive(Debug)]
pub struct BackoffRegistry {
    min_minutes: u64,
    max_minutes: u64,
    states: Mutex<HashMap<String, FibonacciBackoff>>,
}

impl BackoffRegistry {
    #[must_use]
    pub fn new(min_minutes: u64, max_minutes: u64) -> Self {
        Self {
            min_minutes,
            max_minutes,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Next delay for `key` together with the number of consecutive failures
    ///
    /// A poisoned lock falls back to the minimum delay.
    pub fn next_for(&self, key: &str) -> (Duration, u32) {
        match self.states.lock() {
            Ok(mut states) => {
                let backoff = states
                    .entry(key.to_string())
                    .or_insert_with(|| FibonacciBackoff::from_minutes(self.min_minutes, self.max_minutes));
                let delay = backoff.next_delay();
                (delay, backoff.attempts())
            }
            Err(_) => (Duration::from_secs(self.min_minutes * 60), 0),
        }
    }

    /// Forget the failure history of `key`; returns whether it had any
    pub fn reset(&self, key: &str) -> bool {
        self.states
            .lock()
            .ok()
            .and_then(|mut states| states.remove(key))
            .is_some_and(|backoff| backoff.attempts() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fibonacci_backoff_sequence_and_cap() {
        let mut backoff = FibonacciBackoff::from_minutes(1, 10);
        let minutes: Vec<u64> = (0..9).map(|_| backoff.next_delay().as_secs() / 60).collect();
        assert_eq!(minutes, vec![1, 1, 2, 3, 5, 8, 10, 10, 10]);
        assert_eq!(backoff.attempts(), 9);
    }

    #[test]
    fn test_fibonacci_backoff_reset() {
        let mut backoff = FibonacciBackoff::from_minutes(1, 10);
        for _ in 0..4 {
            backoff.next_delay();
        }
        backoff.reset();
        assert_eq!(backoff.attempts(), 0);
        assert_eq!(backoff.next_delay(), Duration::from_secs(60));
        assert_eq!(backoff.next_delay(), Duration::from_secs(60));
        assert_eq!(backoff.next_delay(), Duration::from_secs(120));
    }

    #[test]
    fn test_registry_tracks_resources_independently() {
        let registry = BackoffRegistry::new(1, 10);

        for _ in 0..4 {
            registry.next_for("Workspace/default/a");
        }
        assert_eq!(
            registry.next_for("Workspace/default/a"),
            (Duration::from_secs(300), 5)
        );
        assert_eq!(
            registry.next_for("Workspace/default/b"),
            (Duration::from_secs(60), 1)
        );

        assert!(registry.reset("Workspace/default/a"));
        assert!(!registry.reset("Workspace/default/a"));
        assert_eq!(
            registry.next_for("Workspace/default/a"),
            (Duration::from_secs(60), 1)
        );
        assert_eq!(
            registry.next_for("Workspace/default/b"),
            (Duration::from_secs(60), 2)
        );
    }
}
