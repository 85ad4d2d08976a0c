//! Collection and resource name validation.
//!
//! A name must be non-empty and map onto exactly one path component below its
//! parent directory:
//! - Must not be `.` or `..`
//! - Must not contain `/`, `\` or NUL

use crate::error::{Result, StoreError};

/// Characters that would let a name escape its directory.
const FORBIDDEN_CHARS: &[char] = &['/', '\\', '\0'];

/// Validate a collection name.
///
/// ```
/// use jsondrive_store::names::validate_collection;
///
/// assert!(validate_collection("users").is_ok());
/// assert!(validate_collection("").is_err());
/// assert!(validate_collection("../etc").is_err());
/// ```
pub fn validate_collection(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(StoreError::MissingCollection);
    }
    check_component(name)
}

/// Validate a resource name. Same rules as collection names.
pub fn validate_resource(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(StoreError::MissingResource);
    }
    check_component(name)
}

fn check_component(name: &str) -> Result<()> {
    if name == "." || name == ".." {
        return Err(StoreError::InvalidName {
            name: name.to_string(),
            reason: "must not be '.' or '..'".into(),
        });
    }

    if let Some(ch) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(StoreError::InvalidName {
            name: name.to_string(),
            reason: format!("contains forbidden character: {ch:?}"),
        });
    }

    Ok(())
}
