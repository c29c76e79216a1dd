//! Root-relative paths of the files a submodule rename touches.

use std::path::{Path, PathBuf};

/// Name of the top-level metadata directory.
pub const GIT_DIR: &str = ".git";
/// Name of the submodule declaration file.
pub const GITMODULES: &str = ".gitmodules";
/// Directory under `.git` holding per-submodule storage.
pub const MODULES_DIR: &str = "modules";

/// Top-level directory of the repository being operated on.
///
/// All paths are derived from this value, never from the process working
/// directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRoot {
    root: PathBuf,
}

impl RepositoryRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// `<root>/.git`
    pub fn git_dir(&self) -> PathBuf {
        self.root.join(GIT_DIR)
    }

    /// `<root>/.gitmodules`
    pub fn gitmodules(&self) -> PathBuf {
        self.root.join(GITMODULES)
    }

    /// `<root>/.git/config`
    pub fn local_config(&self) -> PathBuf {
        self.git_dir().join("config")
    }

    /// `<root>/.git/modules/<name>`
    pub fn storage_dir(&self, name: &str) -> PathBuf {
        join_segments(self.git_dir().join(MODULES_DIR), name)
    }

    /// `<root>/.git/modules/<name>/config`
    pub fn storage_config(&self, name: &str) -> PathBuf {
        self.storage_dir(name).join("config")
    }

    /// `<root>/<name>`
    pub fn working_dir(&self, name: &str) -> PathBuf {
        join_segments(self.root.clone(), name)
    }

    /// `<root>/<name>/.git`, the back-reference marker file.
    pub fn marker_file(&self, name: &str) -> PathBuf {
        self.working_dir(name).join(GIT_DIR)
    }

    /// Renders `path` relative to the root with forward slashes.
    pub fn display(&self, path: &Path) -> String {
        let relative = pathdiff::diff_paths(path, &self.root).unwrap_or_else(|| path.to_path_buf());
        relative.to_string_lossy().replace('\\', "/")
    }
}

// Names always use `/`; split so the platform separator is used on disk.
fn join_segments(base: PathBuf, name: &str) -> PathBuf {
    name.split('/').fold(base, |path, segment| path.join(segment))
}
