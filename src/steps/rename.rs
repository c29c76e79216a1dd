//! Orchestration logic for submodule rename operations.
//!
//! All file system modifications go through a `Transaction`, staged in a
//! fixed order:
//!
//! 1. `.gitmodules` section header
//! 2. `.git/config` section header
//! 3. `gitdir:` line of the working tree's `.git` file
//! 4. Move `.git/modules/<old>` to `.git/modules/<new>`
//! 5. `worktree =` line of the moved storage's `config`

use crate::error::{RenameError, Result};
use crate::fs::transaction::Transaction;
use crate::git::{
    RepositoryRoot, SubmoduleIdentity, rewrite_gitdir, rewrite_section_header, rewrite_worktree,
};
use crate::verify::{confirm_operation, preflight_checks};

use clap::Parser;
use colored::Colorize;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Rename a git submodule, keeping its storage and back-references in sync.
///
/// Move the working tree first (e.g. `git mv old new`), then run this to
/// re-link the registry, the storage directory and the `.git` file.
#[derive(Parser, Debug, Clone)]
#[command(name = "git-rename-submodule", version, verbatim_doc_comment)]
pub struct RenameArgs {
    /// Current name of the submodule
    pub old_name: String,

    /// New name of the submodule (its working tree must already be here)
    pub new_name: String,

    /// Skip interactive confirmation
    #[arg(long, short = 'f')]
    pub force: bool,

    /// Preview changes without applying them
    #[arg(long, short = 'n')]
    pub dry_run: bool,

    /// Repository root
    #[arg(long = "repo", short = 'C', value_name = "PATH", default_value = ".")]
    pub repo: PathBuf,
}

/// Validation and mutation of one submodule rename.
#[derive(Debug, Clone)]
pub struct RenamePipeline {
    root: RepositoryRoot,
    old: SubmoduleIdentity,
    new: SubmoduleIdentity,
}

impl RenamePipeline {
    pub fn new(root: RepositoryRoot, old_name: &str, new_name: &str) -> Self {
        Self {
            root,
            old: SubmoduleIdentity::new(old_name),
            new: SubmoduleIdentity::new(new_name),
        }
    }

    pub fn root(&self) -> &RepositoryRoot {
        &self.root
    }

    /// Runs every check; touches nothing.
    pub fn validate(&self) -> Result<()> {
        preflight_checks(&self.root, self.old.name(), self.new.name())
    }

    /// Stages all five mutations, in order.
    pub fn stage_mutations(&self, txn: &mut Transaction) -> Result<()> {
        let (old, new) = (self.old.name(), self.new.name());

        for registry in [self.root.gitmodules(), self.root.local_config()] {
            let content = read_file(&registry)?;
            match rewrite_section_header(&content, old, new)? {
                Some(updated) => {
                    log::info!(
                        "Updating registry record in {}",
                        self.root.display(&registry)
                    );
                    txn.update_file(registry, updated)?;
                }
                None => log::warn!(
                    "No [submodule \"{}\"] record in {}",
                    old,
                    self.root.display(&registry)
                ),
            }
        }

        let marker = self.root.marker_file(self.new.working_path());
        let content = read_file(&marker)?;
        match rewrite_gitdir(&content, old, new)? {
            Some(updated) => {
                log::info!(
                    "Updating back-reference in {}",
                    self.root.display(&marker)
                );
                txn.update_file(marker, updated)?;
            }
            None => log::warn!(
                "{} does not point at modules/{}",
                self.root.display(&marker),
                old
            ),
        }

        let old_storage = self.root.storage_dir(old);
        let new_storage = self.root.storage_dir(new);
        log::info!(
            "Staging storage move {} → {}",
            self.root.display(&old_storage),
            self.root.display(&new_storage)
        );
        txn.move_directory(old_storage, new_storage)?;

        let content = read_file(&self.root.storage_config(old))?;
        match rewrite_worktree(&content, &self.new.worktree_path())? {
            Some(updated) => txn.update_file(self.root.storage_config(new), updated)?,
            None => log::warn!("No worktree setting in storage config of '{}'", old),
        }

        log::debug!("Staged {} operations", txn.len());
        Ok(())
    }
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        RenameError::Io(io::Error::new(
            e.kind(),
            format!("Failed to read {}: {}", path.display(), e),
        ))
    })
}

/// Executes a submodule rename against stdin/stdout.
pub fn execute(args: RenameArgs) -> Result<()> {
    execute_with(&args, &mut io::stdin().lock(), &mut io::stdout())
}

/// Executes a submodule rename.
///
/// ## Phases
///
/// 1. Pre-flight checks (names, repository shape, storage state)
/// 2. Stage mutations in a transaction
/// 3. User confirmation (unless `--force` or `--dry-run`)
/// 4. Commit in order; no rollback on failure
/// 5. Print summary
pub fn execute_with<R: BufRead, W: Write>(
    args: &RenameArgs,
    input: &mut R,
    output: &mut W,
) -> Result<()> {
    let pipeline = RenamePipeline::new(
        RepositoryRoot::new(&args.repo),
        &args.old_name,
        &args.new_name,
    );
    pipeline.validate()?;

    let mut txn = Transaction::new(args.dry_run);
    if let Err(e) = pipeline.stage_mutations(&mut txn) {
        eprintln!("{} No changes were made.", "ℹ".blue().bold());
        return Err(e);
    }

    let plan = txn.preview(pipeline.root());
    if !confirm_operation(args, &plan, input, output)? {
        writeln!(output, "\n{}", "Operation cancelled.".yellow())?;
        return Err(RenameError::Cancelled);
    }

    if let Err(e) = txn.commit() {
        return handle_commit_error(e, &txn, pipeline.root());
    }

    txn.print_summary(pipeline.root(), output)?;

    if !args.dry_run {
        writeln!(
            output,
            "\n{} {} → {}",
            "✓ Renamed submodule".green().bold(),
            args.old_name.yellow(),
            args.new_name.green().bold()
        )?;
    }

    Ok(())
}

fn handle_commit_error(e: RenameError, txn: &Transaction, root: &RepositoryRoot) -> Result<()> {
    if let RenameError::IncompleteRename { .. } = e {
        eprintln!("{}", "Not applied:".red().bold());
        for step in txn.pending(root) {
            eprintln!("   • {}", step);
        }
        eprintln!(
            "{}",
            "⚠ The submodule is partially renamed. Manual repair is required."
                .yellow()
                .bold()
        );
    } else {
        eprintln!("{} No changes were made.", "ℹ".blue().bold());
    }

    Err(e)
}
