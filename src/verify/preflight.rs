//! Pre-flight checks performed before executing a rename operation.
//!
//! Unlike `rules`, these functions inspect the filesystem. None of them
//! modify it.

use crate::error::{RenameError, Result};
use crate::git::RepositoryRoot;
use crate::verify::rules::{validate_distinct_names, validate_name};

/// Checks that the root looks like a repository with submodules.
///
/// - `.git` must be a directory, otherwise `NotAGitRepo`
/// - `.gitmodules` must exist, otherwise `NoSubmodulesDeclared`
pub fn validate_repo_shape(root: &RepositoryRoot) -> Result<()> {
    let git_dir = root.git_dir();
    if !git_dir.is_dir() {
        return Err(RenameError::NotAGitRepo(root.path().to_path_buf()));
    }

    let gitmodules = root.gitmodules();
    if !gitmodules.is_file() {
        return Err(RenameError::NoSubmodulesDeclared(gitmodules));
    }

    Ok(())
}

/// Checks storage and working directories on both sides of the rename.
///
/// The working tree must already sit at `new_name`; storage must exist for
/// `old_name` and must not exist for `new_name`. The new storage may not lie
/// inside the old one, since the directory move could never succeed.
pub fn validate_storage_state(root: &RepositoryRoot, old_name: &str, new_name: &str) -> Result<()> {
    let old_storage = root.storage_dir(old_name);
    if !old_storage.is_dir() {
        return Err(RenameError::OldStorageNotFound(old_storage));
    }

    let new_storage = root.storage_dir(new_name);
    if new_storage.starts_with(&old_storage) {
        return Err(RenameError::InvalidPathShape(
            new_name.to_string(),
            format!("storage would be nested inside the storage of '{}'", old_name),
        ));
    }

    if new_storage.exists() {
        return Err(RenameError::NewStorageAlreadyExists(new_storage));
    }

    let new_working = root.working_dir(new_name);
    if !new_working.is_dir() {
        return Err(RenameError::NewWorkingPathNotFound(new_working));
    }

    let old_working = root.working_dir(old_name);
    if old_working.join(".git").exists() {
        log::warn!(
            "'{}' still contains a .git marker; was the working tree moved?",
            root.display(&old_working)
        );
    }

    if let Some(parent) = new_storage.parent()
        && !parent.exists()
    {
        log::info!("Parent directory '{}' will be created", root.display(parent));
    }

    Ok(())
}

/// Performs all validation before any file is touched.
///
/// # Checks Performed
///
/// 1. Both names are well-formed
/// 2. Names differ
/// 3. Repository has `.git` and `.gitmodules`
/// 4. Storage and working directories are in the expected state
///
/// Returns the first failure. Name checks come first so that argument
/// errors are reported regardless of repository state.
pub fn preflight_checks(root: &RepositoryRoot, old_name: &str, new_name: &str) -> Result<()> {
    validate_name(old_name, "old_name")?;
    validate_name(new_name, "new_name")?;
    validate_distinct_names(old_name, new_name)?;

    validate_repo_shape(root)?;
    validate_storage_state(root, old_name, new_name)?;

    log::debug!("Pre-flight checks passed for '{}' → '{}'", old_name, new_name);
    Ok(())
}
