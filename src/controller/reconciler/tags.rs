//! # Tag Delta Engine
//!
//! Computes the upserts and removals that turn one tag map into another.

use std::collections::{BTreeMap, BTreeSet};

/// Tags to upsert and tag keys to remove
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDelta {
    pub added_or_updated: BTreeMap<String, String>,
    pub removed: BTreeSet<String>,
}

impl TagDelta {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added_or_updated.is_empty() && self.removed.is_empty()
    }

    /// Remove then upsert; applied to `current` this yields `desired`
    #[must_use]
    pub fn apply(&self, current: &BTreeMap<String, String>) -> BTreeMap<String, String> {
        let mut result: BTreeMap<String, String> = current
            .iter()
            .filter(|(k, _)| !self.removed.contains(*k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        result.extend(
            self.added_or_updated
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        result
    }
}

/// Diff `current` against `desired`
#[must_use]
pub fn diff(current: &BTreeMap<String, String>, desired: &BTreeMap<String, String>) -> TagDelta {
    let mut delta = TagDelta::default();

    for (key, value) in current {
        match desired.get(key) {
            None => {
                delta.removed.insert(key.clone());
            }
            Some(wanted) if wanted != value => {
                delta.added_or_updated.insert(key.clone(), wanted.clone());
            }
            Some(_) => {}
        }
    }

    for (key, value) in desired {
        if !current.contains_key(key) {
            delta.added_or_updated.insert(key.clone(), value.clone());
        }
    }

    delta
}
