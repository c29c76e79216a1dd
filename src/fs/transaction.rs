//! Staged file system operations.
//!
//! Coordinates the file updates and the directory move of a rename so that
//! every precondition is checked before the first write.
//!
//! ## Execution Guarantees
//!
//! - **Validation**: paths exist, files are writable, move target is free
//! - **Ordering**: operations run exactly in staging order
//! - **Idempotency**: files with unchanged content are never staged
//! - **No rollback**: a failure part-way through `commit()` is reported as
//!   [`RenameError::IncompleteRename`] and left for manual repair
//!
//! A file may be staged at a path that only exists once an earlier staged
//! move has run; its current content is read from the move source.
//!
//! ## Example
//!
//! ```no_run
//! # use git_rename_submodule::fs::Transaction;
//! # use std::path::PathBuf;
//! # fn example() -> git_rename_submodule::error::Result<()> {
//! let mut txn = Transaction::new(false);
//!
//! txn.move_directory(PathBuf::from(".git/modules/old"), PathBuf::from(".git/modules/new"))?;
//! txn.update_file(PathBuf::from(".git/modules/new/config"), "[core]\n".into())?;
//!
//! txn.commit()?;
//! # Ok(())
//! # }
//! ```

use crate::error::{RenameError, Result};
use crate::git::RepositoryRoot;

use colored::Colorize;
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A staged file system operation.
#[derive(Debug, Clone)]
pub enum Operation {
    /// Replace file contents.
    UpdateFile { path: PathBuf, new: String },
    /// Move a directory, creating missing parents of `to`.
    MoveDirectory { from: PathBuf, to: PathBuf },
}

impl Operation {
    fn describe(&self, root: &RepositoryRoot) -> String {
        match self {
            Operation::UpdateFile { path, .. } => format!("Update: {}", root.display(path)),
            Operation::MoveDirectory { from, to } => {
                format!("Move: {} → {}", root.display(from), root.display(to))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransactionState {
    /// Staging operations.
    Building,
    /// All operations succeeded.
    Committed,
    /// Validation or execution failed.
    Failed,
}

/// Ordered set of file system operations.
///
/// Must be explicitly committed. Dropping an uncommitted transaction applies
/// nothing.
///
/// ## Dry-Run Mode
///
/// When `dry_run = true`, operations are staged but `commit()` writes nothing.
#[must_use = "Transaction must be committed"]
pub struct Transaction {
    operations: Vec<Operation>,
    dry_run: bool,
    state: TransactionState,
    executed: usize,
    /// Staged moves as (to, from), used to find the current location of a
    /// path that will only exist after a move.
    path_redirects: Vec<(PathBuf, PathBuf)>,
}

impl Transaction {
    pub fn new(dry_run: bool) -> Self {
        Self {
            operations: Vec::new(),
            dry_run,
            state: TransactionState::Building,
            executed: 0,
            path_redirects: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Returns true if successfully committed.
    pub fn is_committed(&self) -> bool {
        self.state == TransactionState::Committed
    }

    /// Human-readable description of every staged operation, in order.
    pub fn preview(&self, root: &RepositoryRoot) -> Vec<String> {
        self.operations.iter().map(|op| op.describe(root)).collect()
    }

    /// Operations not yet applied by `commit()`.
    pub fn pending(&self, root: &RepositoryRoot) -> Vec<String> {
        self.operations[self.executed..]
            .iter()
            .map(|op| op.describe(root))
            .collect()
    }

    /// Where `path` lives right now, accounting for staged moves.
    fn staged_source(&self, path: &Path) -> PathBuf {
        for (to, from) in self.path_redirects.iter().rev() {
            if let Ok(rest) = path.strip_prefix(to) {
                return from.join(rest);
            }
        }
        path.to_path_buf()
    }

    fn ensure_building(&self) -> Result<()> {
        if self.state != TransactionState::Building {
            return Err(RenameError::Other(anyhow::anyhow!(
                "Cannot modify transaction after commit"
            )));
        }
        Ok(())
    }

    /// Stages a directory move.
    pub fn move_directory(&mut self, from: PathBuf, to: PathBuf) -> Result<()> {
        self.ensure_building()?;

        if to.exists() {
            return Err(RenameError::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("Target directory already exists: {}", to.display()),
            )));
        }

        if !from.is_dir() {
            return Err(RenameError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Source directory does not exist: {}", from.display()),
            )));
        }

        if to.starts_with(&from) {
            return Err(nested_move_error(&from, &to));
        }

        if self.dry_run {
            log::debug!("Would move: {} → {}", from.display(), to.display());
        }

        self.path_redirects.push((to.clone(), from.clone()));
        self.operations.push(Operation::MoveDirectory { from, to });
        Ok(())
    }

    /// Stages a file update.
    ///
    /// Reads current content and compares to `new_content`. If identical,
    /// skips. Otherwise stages for commit.
    pub fn update_file(&mut self, path: PathBuf, new_content: String) -> Result<()> {
        self.ensure_building()?;

        log::debug!("Staging update for: {}", path.display());

        let source = self.staged_source(&path);
        let original = fs::read_to_string(&source).map_err(|e| {
            log::error!("Failed to read {}: {}", source.display(), e);
            RenameError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read {}: {}", source.display(), e),
            ))
        })?;

        if original == new_content {
            log::debug!("Content unchanged, skipping: {}", path.display());
            return Ok(());
        }

        if self.dry_run {
            log::debug!("Would update: {}", path.display());
        }

        self.operations.push(Operation::UpdateFile {
            path,
            new: new_content,
        });

        Ok(())
    }

    /// Validates all staged operations against the current filesystem.
    ///
    /// Checks:
    /// - No duplicate file operations
    /// - Files exist and are writable
    /// - Move sources exist, targets don't, and no target lies inside its source
    fn validate(&self) -> Result<()> {
        let mut file_paths = HashSet::new();

        for op in &self.operations {
            match op {
                Operation::UpdateFile { path, .. } => {
                    if !file_paths.insert(path.clone()) {
                        return Err(RenameError::Other(anyhow::anyhow!(
                            "Duplicate file operation: {}",
                            path.display()
                        )));
                    }

                    let source = self.staged_source(path);
                    let metadata = fs::metadata(&source).map_err(|e| {
                        RenameError::Io(std::io::Error::new(
                            e.kind(),
                            format!("File no longer exists: {}", source.display()),
                        ))
                    })?;

                    if metadata.permissions().readonly() {
                        return Err(RenameError::Io(std::io::Error::new(
                            std::io::ErrorKind::PermissionDenied,
                            format!("File is read-only: {}", source.display()),
                        )));
                    }
                }
                Operation::MoveDirectory { from, to } => {
                    if !from.is_dir() {
                        return Err(RenameError::Io(std::io::Error::new(
                            std::io::ErrorKind::NotFound,
                            format!("Directory no longer exists: {}", from.display()),
                        )));
                    }

                    if to.starts_with(from) {
                        return Err(nested_move_error(from, to));
                    }

                    if to.exists() {
                        return Err(RenameError::Io(std::io::Error::new(
                            std::io::ErrorKind::AlreadyExists,
                            format!("Target directory already exists: {}", to.display()),
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    fn execute(op: &Operation) -> std::io::Result<()> {
        match op {
            Operation::UpdateFile { path, new } => {
                fs::write(path, new).map_err(|e| {
                    std::io::Error::new(
                        e.kind(),
                        format!("Failed to write {}: {}", path.display(), e),
                    )
                })?;
                log::debug!("Updated: {}", path.display());
            }
            Operation::MoveDirectory { from, to } => {
                if let Some(parent) = to.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::rename(from, to).map_err(|e| {
                    std::io::Error::new(
                        e.kind(),
                        format!(
                            "Failed to move {} → {}: {}",
                            from.display(),
                            to.display(),
                            e
                        ),
                    )
                })?;
                log::debug!("Moved: {} → {}", from.display(), to.display());
            }
        }
        Ok(())
    }

    /// Applies all staged operations in order.
    ///
    /// Fails before any write if validation fails. A failure after the first
    /// write returns `IncompleteRename`; applied operations stay applied.
    pub fn commit(&mut self) -> Result<()> {
        if self.state != TransactionState::Building {
            return Err(RenameError::Other(anyhow::anyhow!(
                "Transaction already committed"
            )));
        }

        if self.dry_run {
            self.state = TransactionState::Committed;
            return Ok(());
        }

        if let Err(e) = self.validate() {
            self.state = TransactionState::Failed;
            return Err(e);
        }

        for op in &self.operations {
            if let Err(e) = Self::execute(op) {
                self.state = TransactionState::Failed;
                if self.executed == 0 {
                    return Err(RenameError::Io(e));
                }
                return Err(RenameError::IncompleteRename {
                    applied: self.executed,
                    total: self.operations.len(),
                    source: e,
                });
            }
            self.executed += 1;
        }

        self.state = TransactionState::Committed;
        Ok(())
    }

    /// Writes a categorized summary to `output`.
    ///
    /// Groups:
    /// - Registry (`.gitmodules`, `.git/config`)
    /// - Back-reference (the working tree's `.git` file)
    /// - Storage (directory move and its config)
    ///
    /// Paths are relative to the repository root with forward slashes.
    pub fn print_summary<W: Write>(&self, root: &RepositoryRoot, output: &mut W) -> Result<()> {
        if self.operations.is_empty() {
            writeln!(output, "\n{}", "No changes needed".yellow())?;
            return Ok(());
        }

        let mut registry = Vec::new();
        let mut back_reference = Vec::new();
        let mut storage = Vec::new();

        for op in &self.operations {
            match op {
                Operation::UpdateFile { path, .. } => {
                    let display = root.display(path);
                    if *path == root.gitmodules() || *path == root.local_config() {
                        registry.push(display);
                    } else if path.file_name().is_some_and(|n| n == ".git") {
                        back_reference.push(display);
                    } else {
                        storage.push(display);
                    }
                }
                Operation::MoveDirectory { from, to } => {
                    let from_display = root.display(from);
                    let to_display = root.display(to);
                    if self.dry_run {
                        storage.push(format!("{} → {}", from_display.yellow(), to_display.green()));
                    } else {
                        storage.push(format!("{} → {}", from_display, to_display.green()));
                    }
                }
            }
        }

        let marker = if self.dry_run {
            "•".to_string()
        } else {
            "✓".green().to_string()
        };

        for (title, entries) in [
            ("Registry", &registry),
            ("Back-reference", &back_reference),
            ("Storage", &storage),
        ] {
            if entries.is_empty() {
                continue;
            }
            writeln!(output, "\n{}", title.bold())?;
            for entry in entries {
                writeln!(output, "   {} {}", marker, entry.dimmed())?;
            }
        }

        writeln!(output)?;
        let num_ops = self.operations.len();
        if self.dry_run {
            writeln!(
                output,
                "{} {} pending. Run without {} to apply.",
                num_ops.to_string().cyan().bold(),
                if num_ops == 1 { "operation" } else { "operations" },
                "--dry-run".cyan()
            )?;
        } else {
            writeln!(
                output,
                "{} Completed {} {}",
                "✓".green().bold(),
                num_ops,
                if num_ops == 1 { "operation" } else { "operations" }
            )?;
        }

        Ok(())
    }
}

fn nested_move_error(from: &Path, to: &Path) -> RenameError {
    RenameError::Io(std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        format!(
            "Cannot move {} into itself ({})",
            from.display(),
            to.display()
        ),
    ))
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if self.state == TransactionState::Building && !self.operations.is_empty() && !self.dry_run
        {
            log::debug!("Transaction dropped without commit");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_new_transaction() {
        let txn = Transaction::new(false);
        assert!(!txn.is_dry_run());
        assert!(txn.is_empty());
        assert_eq!(txn.len(), 0);
    }

    #[test]
    fn test_update_file_no_change_skips() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("config");
        fs::write(&file_path, "same content").unwrap();

        let mut txn = Transaction::new(false);
        txn.update_file(file_path, "same content".to_string())
            .unwrap();

        assert_eq!(txn.len(), 0);
    }

    #[test]
    fn test_update_file_nonexistent_fails() {
        let temp = TempDir::new().unwrap();

        let mut txn = Transaction::new(false);
        let result = txn.update_file(temp.path().join("missing"), "content".to_string());

        assert!(result.is_err());
    }

    #[test]
    fn test_move_directory_existing_target_fails() {
        let temp = TempDir::new().unwrap();
        let from = temp.path().join("old");
        let to = temp.path().join("new");
        fs::create_dir(&from).unwrap();
        fs::create_dir(&to).unwrap();

        let mut txn = Transaction::new(false);
        assert!(txn.move_directory(from, to).is_err());
    }

    #[test]
    fn test_dry_run_does_not_modify() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("config");
        let from = temp.path().join("old");
        let to = temp.path().join("new");
        fs::write(&file, "original").unwrap();
        fs::create_dir(&from).unwrap();

        let mut txn = Transaction::new(true);
        txn.update_file(file.clone(), "modified".to_string())
            .unwrap();
        txn.move_directory(from.clone(), to.clone()).unwrap();
        txn.commit().unwrap();

        assert_eq!(txn.len(), 2);
        assert!(txn.is_committed());
        assert_eq!(fs::read_to_string(&file).unwrap(), "original");
        assert!(from.exists());
        assert!(!to.exists());
    }

    #[test]
    fn test_update_after_move_reads_from_source() {
        let temp = TempDir::new().unwrap();
        let from = temp.path().join("modules/old");
        let to = temp.path().join("modules/group/new");
        fs::create_dir_all(&from).unwrap();
        fs::write(from.join("config"), "worktree = ../../../old\n").unwrap();

        let mut txn = Transaction::new(false);
        txn.move_directory(from.clone(), to.clone()).unwrap();
        txn.update_file(to.join("config"), "worktree = ../../../../group/new\n".to_string())
            .unwrap();
        assert_eq!(txn.len(), 2);

        txn.commit().unwrap();

        assert!(!from.exists());
        assert_eq!(
            fs::read_to_string(to.join("config")).unwrap(),
            "worktree = ../../../../group/new\n"
        );
    }

    #[test]
    fn test_commit_runs_in_staging_order() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.txt");
        let from = temp.path().join("old");
        let to = temp.path().join("nested/path/new");
        fs::write(&file, "1").unwrap();
        fs::create_dir(&from).unwrap();
        fs::write(from.join("config"), "x").unwrap();

        let mut txn = Transaction::new(false);
        txn.update_file(file.clone(), "2".to_string()).unwrap();
        txn.move_directory(from.clone(), to.clone()).unwrap();
        txn.update_file(to.join("config"), "y".to_string()).unwrap();

        let root = RepositoryRoot::new(temp.path());
        assert_eq!(
            txn.preview(&root),
            vec![
                "Update: a.txt".to_string(),
                "Move: old → nested/path/new".to_string(),
                "Update: nested/path/new/config".to_string(),
            ]
        );

        txn.commit().unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), "2");
        assert_eq!(fs::read_to_string(to.join("config")).unwrap(), "y");
        assert!(txn.pending(&root).is_empty());
    }

    #[test]
    fn test_validation_failure_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.txt");
        let from = temp.path().join("old");
        let to = temp.path().join("new");
        fs::write(&file, "1").unwrap();
        fs::create_dir(&from).unwrap();

        let mut txn = Transaction::new(false);
        txn.update_file(file.clone(), "2".to_string()).unwrap();
        txn.move_directory(from, to.clone()).unwrap();

        // Target appears between staging and commit
        fs::create_dir(&to).unwrap();

        assert!(txn.commit().is_err());
        assert!(!txn.is_committed());
        assert_eq!(fs::read_to_string(&file).unwrap(), "1");
    }

    #[test]
    fn test_failure_after_first_write_is_incomplete() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.txt");
        let from = temp.path().join("old");
        let to = temp.path().join("new");
        fs::write(&file, "1").unwrap();
        fs::create_dir(&from).unwrap();
        fs::write(from.join("config"), "x").unwrap();

        let mut txn = Transaction::new(false);
        txn.update_file(file.clone(), "2".to_string()).unwrap();
        txn.move_directory(from, to.clone()).unwrap();
        txn.update_file(to.join("config"), "y".to_string()).unwrap();

        // Parent of the move target is a regular file, so execution fails.
        txn.operations[1] = Operation::MoveDirectory {
            from: temp.path().join("old"),
            to: file.join("new"),
        };

        let err = txn.commit().unwrap_err();
        assert!(matches!(
            err,
            RenameError::IncompleteRename {
                applied: 1,
                total: 3,
                ..
            }
        ));
        assert_eq!(fs::read_to_string(&file).unwrap(), "2");
        let root = RepositoryRoot::new(temp.path());
        assert_eq!(txn.pending(&root).len(), 2);
    }

    #[test]
    fn test_cannot_stage_after_commit() {
        let mut txn = Transaction::new(true);
        txn.commit().unwrap();
        assert!(txn.commit().is_err());

        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.txt");
        fs::write(&file, "1").unwrap();
        assert!(txn.update_file(file, "2".to_string()).is_err());
    }

    fn summary(txn: &Transaction, root: &RepositoryRoot) -> String {
        let mut output = Vec::new();
        txn.print_summary(root, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_print_summary_empty() {
        let temp = TempDir::new().unwrap();
        let root = RepositoryRoot::new(temp.path());

        assert!(summary(&Transaction::new(false), &root).contains("No changes needed"));
    }

    #[test]
    fn test_print_summary_categories() {
        let temp = TempDir::new().unwrap();
        let root = RepositoryRoot::new(temp.path());
        fs::create_dir_all(root.storage_dir("a")).unwrap();
        fs::create_dir_all(root.working_dir("b")).unwrap();
        fs::write(root.gitmodules(), "a").unwrap();
        fs::write(root.local_config(), "a").unwrap();
        fs::write(root.marker_file("b"), "a").unwrap();
        fs::write(root.storage_config("a"), "a").unwrap();

        let mut txn = Transaction::new(true);
        txn.update_file(root.gitmodules(), "b".to_string()).unwrap();
        txn.update_file(root.local_config(), "b".to_string()).unwrap();
        txn.update_file(root.marker_file("b"), "b".to_string()).unwrap();
        txn.move_directory(root.storage_dir("a"), root.storage_dir("b"))
            .unwrap();
        txn.update_file(root.storage_config("b"), "b".to_string())
            .unwrap();

        let output = summary(&txn, &root);
        let registry = output.find("Registry").unwrap();
        let back_reference = output.find("Back-reference").unwrap();
        let storage = output.find("Storage").unwrap();
        assert!(registry < back_reference && back_reference < storage);
        assert!(output.contains(".gitmodules"));
        assert!(output.contains(".git/config"));
        assert!(output.contains("b/.git"));
        assert!(output.contains(".git/modules/b/config"));
        assert!(output.contains("--dry-run"));
    }

    #[test]
    fn test_print_summary_after_commit() {
        let temp = TempDir::new().unwrap();
        let root = RepositoryRoot::new(temp.path());
        fs::write(root.gitmodules(), "a").unwrap();

        let mut txn = Transaction::new(false);
        txn.update_file(root.gitmodules(), "b".to_string()).unwrap();
        txn.commit().unwrap();

        let output = summary(&txn, &root);
        assert!(output.contains("Completed 1 operation"));
        assert!(!output.contains("--dry-run"));
    }

    #[test]
    fn test_move_into_itself_rejected_when_staging() {
        let temp = TempDir::new().unwrap();
        let from = temp.path().join("modules/foo");
        fs::create_dir_all(&from).unwrap();

        let mut txn = Transaction::new(false);
        assert!(txn.move_directory(from.clone(), from.join("bar")).is_err());
        assert!(txn.is_empty());
    }

    #[test]
    fn test_move_into_itself_rejected_before_any_write() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.txt");
        let from = temp.path().join("modules/foo");
        fs::write(&file, "1").unwrap();
        fs::create_dir_all(&from).unwrap();

        let mut txn = Transaction::new(false);
        txn.update_file(file.clone(), "2".to_string()).unwrap();
        txn.move_directory(from.clone(), temp.path().join("modules/other"))
            .unwrap();
        txn.operations[1] = Operation::MoveDirectory {
            from: from.clone(),
            to: from.join("bar"),
        };

        let err = txn.commit().unwrap_err();
        assert!(matches!(err, RenameError::Io(_)));
        assert_eq!(fs::read_to_string(&file).unwrap(), "1");
        assert!(from.is_dir());
    }
}
