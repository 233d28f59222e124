//! Helpers for provider record → canonical record translation
//!
//! Translation functions are pure: they check every required provider field
//! before building the canonical record and fail with `TranslationError`
//! instead of producing a partially populated one.

use crate::capability::ResourceKind;
use crate::error::{DriverError, Result};

/// Unwrap a required provider field
pub fn require<T>(value: Option<T>, kind: ResourceKind, field: &str) -> Result<T> {
    value.ok_or_else(|| {
        DriverError::TranslationError(format!(
            "{} record is missing required field '{}'",
            kind, field
        ))
    })
}

/// Unwrap a required string field, treating "" as missing
pub fn require_str(value: Option<&str>, kind: ResourceKind, field: &str) -> Result<String> {
    require(value.filter(|v| !v.is_empty()), kind, field).map(str::to_string)
}

/// Translate a provider listing
///
/// List policy shared by every handler: one record that fails to translate
/// fails the whole listing. No partial lists are returned.
pub fn translate_all<N, T, F>(records: impl IntoIterator<Item = N>, translate: F) -> Result<Vec<T>>
where
    F: FnMut(N) -> Result<T>,
{
    records.into_iter().map(translate).collect()
}

/// Last path segment of a provider URL (`.../zones/us-east1-b` → `us-east1-b`)
pub fn last_segment(url: &str) -> &str {
    url.trim_end_matches('/').rsplit('/').next().unwrap_or(url)
}
