//! Validation and confirmation for rename operations.

pub mod preflight;
pub mod prompt;
pub mod rules;

pub use preflight::{preflight_checks, validate_repo_shape, validate_storage_state};
pub use prompt::confirm_operation;
pub use rules::{validate_distinct_names, validate_name};
