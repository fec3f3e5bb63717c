//! Path validation utilities.
//!
//! Labels come from a remote page and filenames from whatever the user had
//! lying around; both get joined onto the shelf root, so both must be exactly
//! one normal path component.

use std::path::{Component, Path};

use crate::error::{ErrorKind, Result};

/// Validates that `name` is usable as a single path component.
///
/// Rejects empty names, `.` and `..`, anything containing a path separator
/// (either `/` or `\`, regardless of platform) and null bytes.
///
/// # Examples
///
/// ```
/// use shelve_storage::validate_component;
/// assert!(validate_component("Jane Doe").is_ok());
/// assert!(validate_component("X-1.mp4").is_ok());
/// assert!(validate_component("..").is_err());
/// assert!(validate_component("a/b").is_err());
/// assert!(validate_component("a\0b").is_err());
/// ```
pub fn validate_component(name: &str) -> Result<&str> {
    // Null bytes cause truncation in C-based syscalls, and backslashes are
    // separators on Windows even though they're legal on Unix.
    if name.contains(['\0', '/', '\\']) {
        exn::bail!(ErrorKind::InvalidComponent(name.to_string()));
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(component)), None) if component == name => Ok(name),
        _ => exn::bail!(ErrorKind::InvalidComponent(name.to_string())),
    }
}
