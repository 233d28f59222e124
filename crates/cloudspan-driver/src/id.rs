//! Composite resource identifiers
//!
//! Providers that need two coordinates to address a resource (resource group
//! and name, zone and name, ...) expose canonical ids of the form
//! `scope:name`. Every handler goes through [`encode`] / [`decode`] instead
//! of splitting strings itself.

use crate::error::{DriverError, Result};

/// Separator between scope and name
pub const SEPARATOR: char = ':';

/// Build `scope:name`, rejecting empty parts or parts containing the separator
pub fn encode(scope: &str, name: &str) -> Result<String> {
    for (part, label) in [(scope, "scope"), (name, "name")] {
        if part.is_empty() {
            return Err(DriverError::InvalidId(format!("empty {}", label)));
        }
        if part.contains(SEPARATOR) {
            return Err(DriverError::InvalidId(format!(
                "{} '{}' contains '{}'",
                label, part, SEPARATOR
            )));
        }
    }
    Ok(format!("{}{}{}", scope, SEPARATOR, name))
}

/// Split `scope:name` into its two parts
pub fn decode(id: &str) -> Result<(String, String)> {
    let [scope, name] = decode_parts::<2>(id).map_err(|_| {
        DriverError::InvalidId(format!(
            "'{}' is not of the form <scope>{}<name>",
            id, SEPARATOR
        ))
    })?;
    Ok((scope.to_string(), name.to_string()))
}

/// Join `parts` with the separator; same rules as [`encode`] for every part
pub fn encode_parts(parts: &[&str]) -> Result<String> {
    for part in parts {
        if part.is_empty() || part.contains(SEPARATOR) {
            return Err(DriverError::InvalidId(format!(
                "part '{}' is empty or contains '{}'",
                part, SEPARATOR
            )));
        }
    }
    Ok(parts.join(&SEPARATOR.to_string()))
}

/// Split an id made of exactly `N` non-empty parts
pub fn decode_parts<const N: usize>(id: &str) -> Result<[&str; N]> {
    let parts: Vec<&str> = id.split(SEPARATOR).collect();
    <[&str; N]>::try_from(parts)
        .ok()
        .filter(|parts| parts.iter().all(|p| !p.is_empty()))
        .ok_or_else(|| {
            DriverError::InvalidId(format!(
                "'{}' does not have {} '{}'-separated parts",
                id, N, SEPARATOR
            ))
        })
}

/// Decode and additionally require the scope to be `expected`
///
/// Used by handlers bound to a single scope (one resource group, one zone).
pub fn decode_in_scope(id: &str, expected: &str) -> Result<String> {
    let (scope, name) = decode(id)?;
    if scope != expected {
        return Err(DriverError::InvalidId(format!(
            "'{}' is outside scope '{}'",
            id, expected
        )));
    }
    Ok(name)
}

/// Validate an opaque (single-coordinate) provider id
pub fn validate_opaque(id: &str) -> Result<&str> {
    let trimmed = id.trim();
    if trimmed.is_empty() || trimmed != id || id.contains(SEPARATOR) || id.contains('/') {
        return Err(DriverError::InvalidId(format!("'{}' is not a valid id", id)));
    }
    Ok(id)
}
