//! # Conversions
//!
//! SDK output shapes to wire types.

use crate::provider::{BackendError, WireStatus};
use aws_sdk_amp::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use std::collections::{BTreeMap, HashMap};

/// SDK accessors return `&T` for required members and `Option<&T>` for
/// optional ones; this reads both the same way.
pub(super) trait Observed<'a> {
    type Target: ?Sized;

    fn observed(self) -> Option<&'a Self::Target>;
}

impl<'a, T: ?Sized> Observed<'a> for &'a T {
    type Target = T;

    fn observed(self) -> Option<&'a T> {
        Some(self)
    }
}

impl<'a, T: ?Sized> Observed<'a> for Option<&'a T> {
    type Target = T;

    fn observed(self) -> Option<&'a T> {
        self
    }
}

pub(super) fn wire_status(code: &str, reason: Option<&str>) -> WireStatus {
    WireStatus {
        code: code.to_string(),
        reason: reason.map(str::to_string),
    }
}

pub(super) fn to_btree(tags: Option<&HashMap<String, String>>) -> Option<BTreeMap<String, String>> {
    tags.map(|t| t.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
}

/// Tags for a request; the SDK expects no map rather than an empty one
pub(super) fn to_hash(tags: &BTreeMap<String, String>) -> Option<HashMap<String, String>> {
    (!tags.is_empty()).then(|| tags.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
}

/// Map an SDK error onto the backend error model, keeping the service error code
pub(super) fn backend_error<E, R>(error: &SdkError<E, R>) -> BackendError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match error.code() {
        Some(code) => BackendError::api(code, error.message().unwrap_or_default()),
        None => BackendError::Transport(DisplayErrorContext(error).to_string()),
    }
}
