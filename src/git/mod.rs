//! Git repository layout and submodule records.
//!
//! Everything here works on plain text and root-relative paths; no git
//! binary or library is involved.

pub mod layout;
pub mod submodule;

pub use layout::RepositoryRoot;
pub use submodule::{SubmoduleIdentity, rewrite_gitdir, rewrite_section_header, rewrite_worktree};
