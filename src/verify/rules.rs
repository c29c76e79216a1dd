//! Validation rules for submodule names.
//!
//! Pure functions with no I/O or side effects.

use crate::error::{RenameError, Result};
use std::path::is_separator;

/// Reserved because names are spliced into `#`-delimited substitution patterns.
pub const RESERVED_CHAR: char = '#';

/// Validates a submodule name.
///
/// ## Rules
/// - Not empty
/// - No `#`
/// - No leading or trailing path separator
/// - No empty, `.` or `..` segments (storage must stay under `.git/modules`)
///
/// `arg` names the argument in the `MissingArgument` error.
pub fn validate_name(candidate: &str, arg: &'static str) -> Result<()> {
    if candidate.is_empty() {
        return Err(RenameError::MissingArgument(arg));
    }

    if candidate.contains(RESERVED_CHAR) {
        return Err(RenameError::ReservedCharacter(candidate.to_string()));
    }

    if candidate.starts_with(is_separator) {
        return Err(RenameError::InvalidPathShape(
            candidate.to_string(),
            "cannot start with a path separator".to_string(),
        ));
    }

    if candidate.ends_with(is_separator) {
        return Err(RenameError::InvalidPathShape(
            candidate.to_string(),
            "cannot end with a path separator".to_string(),
        ));
    }

    for segment in candidate.split('/') {
        match segment {
            "" => {
                return Err(RenameError::InvalidPathShape(
                    candidate.to_string(),
                    "contains an empty path segment".to_string(),
                ));
            }
            "." | ".." => {
                return Err(RenameError::InvalidPathShape(
                    candidate.to_string(),
                    format!("contains '{}'", segment),
                ));
            }
            _ => {}
        }
    }

    if candidate.chars().any(char::is_whitespace) {
        log::warn!("'{}' contains whitespace", candidate);
    }

    Ok(())
}

pub fn validate_distinct_names(old_name: &str, new_name: &str) -> Result<()> {
    if old_name == new_name {
        return Err(RenameError::IdenticalNames(old_name.to_string()));
    }
    Ok(())
}
