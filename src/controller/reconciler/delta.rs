//! # Delta
//!
//! Field-path differences between a desired and a latest snapshot of the
//! same resource. Computed before any mutating call and consulted per concern.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// One differing field path with both values
#[derive(Debug, Clone, PartialEq)]
pub struct Difference {
    pub path: &'static str,
    pub desired: Value,
    pub latest: Value,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Delta {
    differences: Vec<Difference>,
}

impl Delta {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<A: Serialize + ?Sized, B: Serialize + ?Sized>(
        &mut self,
        path: &'static str,
        desired: &A,
        latest: &B,
    ) {
        self.differences.push(Difference {
            path,
            desired: serde_json::to_value(desired).unwrap_or(Value::Null),
            latest: serde_json::to_value(latest).unwrap_or(Value::Null),
        });
    }

    /// Whether `path` or any path nested below it differs
    #[must_use]
    pub fn different_at(&self, path: &str) -> bool {
        self.differences.iter().any(|d| {
            d.path == path
                || d.path
                    .strip_prefix(path)
                    .is_some_and(|rest| rest.starts_with('.'))
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.differences.is_empty()
    }

    #[must_use]
    pub fn differences(&self) -> &[Difference] {
        &self.differences
    }

    pub fn paths(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.differences.iter().map(|d| d.path)
    }
}

/// Record `path` when the two values differ
pub fn compare_field<T: PartialEq + Serialize + ?Sized>(
    delta: &mut Delta,
    path: &'static str,
    desired: &T,
    latest: &T,
) {
    if desired != latest {
        delta.add(path, desired, latest);
    }
}

/// Tag maps compare by content; a length mismatch alone marks the path
pub fn compare_tags(
    delta: &mut Delta,
    path: &'static str,
    desired: &BTreeMap<String, String>,
    latest: &BTreeMap<String, String>,
) {
    if desired.len() != latest.len() || desired.iter().any(|(k, v)| latest.get(k) != Some(v)) {
        delta.add(path, desired, latest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_different_at_matches_nested_paths_only() {
        let mut delta = Delta::new();
        delta.add("Spec.Tags.team", "a", "b");

        assert!(delta.different_at("Spec.Tags"));
        assert!(delta.different_at("Spec.Tags.team"));
        assert!(!delta.different_at("Spec.Tag"));
        assert!(!delta.different_at("Spec.Configuration"));
    }

    #[test]
    fn test_compare_field() {
        let mut delta = Delta::new();
        compare_field(&mut delta, "Spec.Alias", &Some("a"), &Some("a"));
        assert!(delta.is_empty());

        compare_field(&mut delta, "Spec.Alias", &Some("a"), &None);
        assert_eq!(delta.paths().collect::<Vec<_>>(), vec!["Spec.Alias"]);
        assert_eq!(delta.differences()[0].latest, Value::Null);
    }

    #[test]
    fn test_compare_tags() {
        let one: BTreeMap<String, String> = [("k".to_string(), "v".to_string())].into();
        let other: BTreeMap<String, String> = [("k".to_string(), "w".to_string())].into();

        let mut delta = Delta::new();
        compare_tags(&mut delta, "Spec.Tags", &one, &one.clone());
        assert!(delta.is_empty());

        compare_tags(&mut delta, "Spec.Tags", &one, &BTreeMap::new());
        assert!(delta.different_at("Spec.Tags"));

        let mut delta = Delta::new();
        compare_tags(&mut delta, "Spec.Tags", &one, &other);
        assert!(delta.different_at("Spec.Tags"));
    }
}
