//! Error types for git-rename-submodule.
//!
//! All operations return `Result<T>` which aliases `Result<T, RenameError>`.
//! Every variant maps to one of four process exit codes via
//! [`RenameError::exit_code`].

use std::path::PathBuf;
use thiserror::Error;

/// Errors from rename operations.
#[derive(Debug, Error)]
pub enum RenameError {
    /// A required name argument was empty.
    #[error("Missing argument: {0} cannot be empty")]
    MissingArgument(&'static str),

    /// Name contains `#`, which is reserved as the substitution delimiter.
    #[error("Invalid name '{0}': must not contain '#'")]
    ReservedCharacter(String),

    /// Name is not a well-formed relative path.
    #[error("Invalid name '{0}': {1}")]
    InvalidPathShape(String, String),

    /// Old and new names are the same.
    #[error("Old and new names are identical: '{0}'")]
    IdenticalNames(String),

    /// Repository root has no `.git` directory.
    #[error("Not a git repository (no .git directory): {0}")]
    NotAGitRepo(PathBuf),

    /// Repository root has no `.gitmodules` file.
    #[error("No submodules declared (missing {0})")]
    NoSubmodulesDeclared(PathBuf),

    /// No metadata storage exists for the old name.
    #[error("Submodule storage not found: {0}")]
    OldStorageNotFound(PathBuf),

    /// Metadata storage already exists for the new name.
    #[error("Submodule storage already exists: {0}")]
    NewStorageAlreadyExists(PathBuf),

    /// Working tree has not been moved to the new name yet.
    #[error("Working directory not found: {0} (move the submodule there first, e.g. with `git mv`)")]
    NewWorkingPathNotFound(PathBuf),

    /// User declined confirmation.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// A commit failed after some operations were already applied.
    ///
    /// Nothing is rolled back; the repository needs manual repair.
    #[error("Rename incomplete after {applied} of {total} operations: {source}")]
    IncompleteRename {
        applied: usize,
        total: usize,
        #[source]
        source: std::io::Error,
    },

    /// File system operation failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Regex compilation failed (indicates bug).
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Unexpected error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse error category, used to pick the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad, missing or duplicate names, or a repository state mismatch.
    Argument,
    /// The repository itself is missing or has no submodules.
    RepositoryState,
    /// The operator declined.
    UserAbort,
    /// I/O and other failures outside validation.
    Internal,
}

impl RenameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RenameError::MissingArgument(_)
            | RenameError::ReservedCharacter(_)
            | RenameError::InvalidPathShape(..)
            | RenameError::IdenticalNames(_)
            | RenameError::OldStorageNotFound(_)
            | RenameError::NewStorageAlreadyExists(_)
            | RenameError::NewWorkingPathNotFound(_) => ErrorKind::Argument,
            RenameError::NotAGitRepo(_) | RenameError::NoSubmodulesDeclared(_) => {
                ErrorKind::RepositoryState
            }
            RenameError::Cancelled => ErrorKind::UserAbort,
            RenameError::IncompleteRename { .. }
            | RenameError::Io(_)
            | RenameError::Regex(_)
            | RenameError::Other(_) => ErrorKind::Internal,
        }
    }

    /// Process exit code for this error.
    ///
    /// `1` user abort, `3` missing repository or `.gitmodules`, `2` everything else.
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::UserAbort => 1,
            ErrorKind::RepositoryState => 3,
            ErrorKind::Argument | ErrorKind::Internal => 2,
        }
    }
}

/// Result type alias for git-rename-submodule operations.
pub type Result<T> = std::result::Result<T, RenameError>;
