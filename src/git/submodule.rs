//! Submodule identity and the line rewrites that carry it.
//!
//! Each rewrite targets one narrowly-shaped line and returns `None` when the
//! line is absent, so callers can decide whether that is worth a warning.
//! Names are always passed through `regex::escape`, and replacements never
//! expand `$` references.

use crate::error::Result;
use crate::git::layout::{GIT_DIR, MODULES_DIR};
use regex::{Captures, NoExpand, Regex};

/// A submodule's registered name.
///
/// The working path is always the name itself; this tool never relocates
/// checked-out content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmoduleIdentity {
    name: String,
}

impl SubmoduleIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn working_path(&self) -> &str {
        &self.name
    }

    /// Storage location relative to the repository root, e.g. `.git/modules/foo`.
    pub fn storage_path(&self) -> String {
        format!("{}/{}/{}", GIT_DIR, MODULES_DIR, self.name)
    }

    /// Value of `core.worktree` as seen from the storage directory.
    ///
    /// One `..` per component of [`storage_path`](Self::storage_path),
    /// then the working path.
    pub fn worktree_path(&self) -> String {
        let depth = self.storage_path().split('/').count();
        let mut path = "../".repeat(depth);
        path.push_str(self.working_path());
        path
    }
}

/// Rewrites every `[submodule "<old>"]` header to `[submodule "<new>"]`.
pub fn rewrite_section_header(content: &str, old: &str, new: &str) -> Result<Option<String>> {
    let pattern = Regex::new(&format!(r#"\[submodule "{}"\]"#, regex::escape(old)))?;
    if !pattern.is_match(content) {
        return Ok(None);
    }

    let header = format!(r#"[submodule "{}"]"#, new);
    Ok(Some(
        pattern.replace_all(content, NoExpand(&header)).into_owned(),
    ))
}

/// Points a `gitdir: <prefix>/modules/<old>` line at `<new>`.
///
/// Everything up to and including `modules/` is kept as-is.
pub fn rewrite_gitdir(content: &str, old: &str, new: &str) -> Result<Option<String>> {
    let pattern = Regex::new(&format!(
        r"(?m)^(gitdir:[ \t]*.*?{}/){}([ \t]*\r?)$",
        MODULES_DIR,
        regex::escape(old)
    ))?;
    if !pattern.is_match(content) {
        return Ok(None);
    }

    Ok(Some(
        pattern
            .replace_all(content, |caps: &Captures| {
                format!("{}{}{}", &caps[1], new, &caps[2])
            })
            .into_owned(),
    ))
}

/// Replaces the value of every `worktree = ...` line with `worktree`.
pub fn rewrite_worktree(content: &str, worktree: &str) -> Result<Option<String>> {
    let pattern = Regex::new(r"(?m)^([ \t]*worktree[ \t]*=[ \t]*)[^\r\n]*")?;
    if !pattern.is_match(content) {
        return Ok(None);
    }

    Ok(Some(
        pattern
            .replace_all(content, |caps: &Captures| format!("{}{}", &caps[1], worktree))
            .into_owned(),
    ))
}
