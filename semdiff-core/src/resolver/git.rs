//! Thin wrapper over the `git` command line.
//!
//! Only three kinds of query are issued: repository-root detection, tree
//! listing at a revision, and blob retrieval at a revision. Everything runs
//! with `-C <root>` so the caller's working directory does not matter.

use std::path::{Path, PathBuf};
use std::process::Command;

use super::relative_path;
use crate::error::{Result, SemdiffError};

/// One line of `git ls-tree` output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: String,
    /// `blob`, `tree` or `commit` (submodule).
    pub kind: String,
    /// Repository-relative path.
    pub path: String,
}

impl TreeEntry {
    pub fn is_blob(&self) -> bool {
        self.kind == "blob"
    }

    pub fn is_tree(&self) -> bool {
        self.kind == "tree"
    }
}

/// A work tree located on disk.
#[derive(Clone, Debug)]
pub struct GitRepo {
    git: String,
    root: PathBuf,
}

impl GitRepo {
    /// Find the repository containing `path`. The path itself need not exist
    /// any more; its nearest existing ancestor is used for detection.
    pub fn discover(git: &str, path: &Path) -> Result<Self> {
        let probe = existing_dir(path);
        let output = Command::new(git)
            .arg("-C")
            .arg(&probe)
            .args(["rev-parse", "--show-toplevel"])
            .output()
            .map_err(|e| command_error(git, &["rev-parse", "--show-toplevel"], e.to_string()))?;

        if !output.status.success() {
            return Err(SemdiffError::NotVersionControlled {
                path: path.display().to_string(),
            });
        }

        let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
        tracing::debug!(root = %root, "found repository");
        Ok(Self {
            git: git.to_string(),
            root: PathBuf::from(root),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `path` relative to the repository root, `/`-separated. Empty for the
    /// root itself.
    pub fn relative_path(&self, path: &Path) -> String {
        let absolute = absolutize(path);
        let root = self
            .root
            .canonicalize()
            .unwrap_or_else(|_| self.root.clone());
        relative_path(&absolute, &root)
    }

    /// Fail unless `revision` names a commit.
    pub fn verify_revision(&self, revision: &str) -> Result<()> {
        let unknown = || SemdiffError::UnknownRevision {
            revision: revision.to_string(),
        };
        if revision.is_empty() || revision.starts_with('-') {
            return Err(unknown());
        }

        let spec = format!("{}^{{commit}}", revision);
        let output = self.command(&["rev-parse", "--verify", "--quiet", &spec])?;
        if output.status.success() {
            Ok(())
        } else {
            Err(unknown())
        }
    }

    /// Entries naming exactly `path` at `revision`. A directory path yields
    /// its own `tree` entry, not its contents.
    pub fn ls_tree(&self, revision: &str, path: &str) -> Result<Vec<TreeEntry>> {
        let stdout = self.run(&["ls-tree", "-z", "--full-tree", revision, "--", path])?;
        Ok(split_nul(&stdout).filter_map(parse_tree_line).collect())
    }

    /// Every file below `path` at `revision`, repository-relative.
    pub fn list_files(&self, revision: &str, path: &str) -> Result<Vec<String>> {
        let mut args = vec!["ls-tree", "-r", "-z", "--full-tree", "--name-only", revision];
        if !path.is_empty() {
            args.extend(["--", path]);
        }
        let stdout = self.run(&args)?;
        Ok(split_nul(&stdout).map(|s| s.to_string()).collect())
    }

    /// Raw content of `path` at `revision`.
    pub fn read_blob(&self, revision: &str, path: &str) -> Result<Vec<u8>> {
        self.run(&["cat-file", "blob", &format!("{}:{}", revision, path)])
    }

    fn command(&self, args: &[&str]) -> Result<std::process::Output> {
        tracing::debug!(git = %self.git, ?args, "running git");
        Command::new(&self.git)
            .arg("-C")
            .arg(&self.root)
            .args(args)
            .output()
            .map_err(|e| command_error(&self.git, args, e.to_string()))
    }

    fn run(&self, args: &[&str]) -> Result<Vec<u8>> {
        let output = self.command(args)?;
        if !output.status.success() {
            return Err(SemdiffError::Command {
                command: format!("{} {}", self.git, args.join(" ")),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output.stdout)
    }
}

fn command_error(git: &str, args: &[&str], message: String) -> SemdiffError {
    SemdiffError::Command {
        command: format!("{} {}", git, args.join(" ")),
        status: "not started".to_string(),
        stderr: message,
    }
}

/// Nearest existing directory at or above `path`.
fn existing_dir(path: &Path) -> PathBuf {
    let mut current = absolutize(path);
    loop {
        if current.is_dir() {
            return current;
        }
        if !current.pop() {
            return PathBuf::from(".");
        }
    }
}

/// Canonical form of the longest existing prefix, with the missing remainder
/// appended as written.
fn absolutize(path: &Path) -> PathBuf {
    let path = if path.as_os_str().is_empty() {
        Path::new(".")
    } else {
        path
    };

    let mut missing = Vec::new();
    let mut current = path.to_path_buf();
    loop {
        if let Ok(canonical) = current.canonicalize() {
            let mut result = canonical;
            for part in missing.iter().rev() {
                result.push(part);
            }
            return result;
        }
        match (current.file_name().map(|n| n.to_os_string()), current.parent()) {
            (Some(name), Some(parent)) => {
                missing.push(name);
                current = if parent.as_os_str().is_empty() {
                    PathBuf::from(".")
                } else {
                    parent.to_path_buf()
                };
            }
            _ => return path.to_path_buf(),
        }
    }
}

fn split_nul(stdout: &[u8]) -> impl Iterator<Item = &str> {
    stdout
        .split(|b| *b == 0)
        .filter(|s| !s.is_empty())
        .filter_map(|s| std::str::from_utf8(s).ok())
}

/// `<mode> SP <type> SP <object> TAB <path>`
fn parse_tree_line(line: &str) -> Option<TreeEntry> {
    let (meta, path) = line.split_once('\t')?;
    let mut parts = meta.split_whitespace();
    let mode = parts.next()?.to_string();
    let kind = parts.next()?.to_string();
    Some(TreeEntry {
        mode,
        kind,
        path: path.to_string(),
    })
}
