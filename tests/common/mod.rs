//! Shared fixtures for git-rename-submodule integration tests.
//!
//! Fixtures lay out the files a real `git submodule add` followed by
//! `git mv` would leave behind; no git binary is needed.

use assert_cmd::cargo::cargo_bin_cmd;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Repository where submodule `old` has been registered and its working
/// tree already moved to `new`.
#[allow(unused)]
pub fn create_test_repo(old: &str, new: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    let storage = storage_dir(root, old);
    fs::create_dir_all(&storage).unwrap();
    fs::write(
        root.join(".gitmodules"),
        format!(
            "[submodule \"{old}\"]\n\tpath = {new}\n\turl = https://example.com/{old}.git\n"
        ),
    )
    .unwrap();
    fs::write(
        root.join(".git/config"),
        format!(
            "[core]\n\trepositoryformatversion = 0\n\tbare = false\n[submodule \"{old}\"]\n\turl = https://example.com/{old}.git\n\tactive = true\n"
        ),
    )
    .unwrap();

    // Storage config still points at the pre-move working tree.
    let depth = format!(".git/modules/{old}").split('/').count();
    fs::write(
        storage.join("config"),
        format!(
            "[core]\n\trepositoryformatversion = 0\n\tbare = false\n\tworktree = {}{}\n",
            "../".repeat(depth),
            old
        ),
    )
    .unwrap();
    fs::write(storage.join("HEAD"), "ref: refs/heads/main\n").unwrap();

    let working = root.join(new);
    fs::create_dir_all(&working).unwrap();
    fs::write(
        working.join(".git"),
        format!(
            "gitdir: {}.git/modules/{old}\n",
            "../".repeat(new.split('/').count())
        ),
    )
    .unwrap();
    fs::write(working.join("README.md"), "tracked content\n").unwrap();

    temp
}

#[allow(unused)]
pub fn storage_dir(root: &Path, name: &str) -> PathBuf {
    root.join(".git/modules").join(name)
}

#[allow(unused)]
pub fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative)).unwrap()
}

/// Runs the binary against `root` with `--force`.
#[allow(unused)]
pub fn run_rename(
    root: &Path,
    old_name: &str,
    new_name: &str,
    extra_args: &[&str],
) -> assert_cmd::assert::Assert {
    let mut cmd = cargo_bin_cmd!("git-rename-submodule");
    cmd.arg(old_name)
        .arg(new_name)
        .arg("--force")
        .args(extra_args)
        .current_dir(root);

    cmd.assert()
}

/// Runs the binary without `--force`, feeding `stdin` to the prompt.
#[allow(unused)]
pub fn run_rename_interactive(
    root: &Path,
    old_name: &str,
    new_name: &str,
    stdin: &str,
) -> assert_cmd::assert::Assert {
    let mut cmd = cargo_bin_cmd!("git-rename-submodule");
    cmd.arg(old_name)
        .arg(new_name)
        .current_dir(root)
        .write_stdin(stdin);

    cmd.assert()
}
