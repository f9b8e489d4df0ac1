//! Historical resolution: a file or directory as it existed at a revision.
//!
//! Two address shapes are accepted after the `git://` scheme:
//!
//! - `path@revision` (preferred), e.g. `git://src/app.py@HEAD~1`
//! - `revision/path` (legacy), e.g. `git://HEAD~1/src/app.py`
//!
//! The legacy form splits at the first `/`, so revisions that contain a
//! slash (`origin/main`) must use the `@` form.
//!
//! Historical file content is written to a uniquely named temporary file
//! carrying the original extension, analyzed with the same analyzer a live
//! file would get, and removed when the handle drops.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use super::directory::{absorb_outcome, in_skipped_dir};
use super::git::GitRepo;
use super::Resolver;
use crate::error::{Result, SemdiffError};
use crate::types::Structure;

/// Scheme routed to the revision resolver.
pub const REVISION_SCHEME: &str = "git";

/// A path pinned to a revision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevisionAddress {
    pub path: String,
    pub revision: String,
}

/// Parse the resource part of a `git://` locator.
pub fn parse_revision_address(resource: &str) -> Result<RevisionAddress> {
    if let Some((path, revision)) = resource.rsplit_once('@') {
        if revision.is_empty() {
            return Err(SemdiffError::format(format!(
                "missing revision after '@' in '{}', expected git://path@revision",
                resource
            )));
        }
        let path = if path.is_empty() { "." } else { path };
        return Ok(RevisionAddress {
            path: path.to_string(),
            revision: revision.to_string(),
        });
    }

    match resource.split_once('/') {
        Some((revision, path)) if !revision.is_empty() && !path.is_empty() => {
            Ok(RevisionAddress {
                path: path.to_string(),
                revision: revision.to_string(),
            })
        }
        _ => Err(SemdiffError::format(format!(
            "cannot read revision address '{}', expected git://path@revision or git://revision/path",
            resource
        ))),
    }
}

impl Resolver<'_> {
    /// Resolve `path` as it existed at `revision`.
    pub fn resolve_revision(&self, revision: &str, path: &str) -> Result<Structure> {
        let repo = GitRepo::discover(&self.options().git_binary, Path::new(path))?;
        repo.verify_revision(revision)?;

        let repo_path = repo.relative_path(Path::new(path));
        let label = format!("{}@{}", path, revision);
        tracing::debug!(repo_path = %repo_path, revision, "resolving revision");

        if repo_path.is_empty() {
            return self.resolve_revision_directory(&repo, revision, "", &label);
        }

        let entries = repo.ls_tree(revision, &repo_path)?;
        match entries.as_slice() {
            [] => Err(SemdiffError::PathNotFoundAtRevision {
                path: repo_path,
                revision: revision.to_string(),
            }),
            [entry] if entry.is_blob() => {
                let mut structure = self
                    .analyze_blob(&repo, revision, &entry.path, &label)?
                    .ok_or_else(|| SemdiffError::NoAnalyzer {
                        path: label.clone(),
                    })?;
                structure.path = Some(label);
                Ok(structure)
            }
            _ => self.resolve_revision_directory(&repo, revision, &repo_path, &label),
        }
    }

    fn resolve_revision_directory(
        &self,
        repo: &GitRepo,
        revision: &str,
        repo_dir: &str,
        label: &str,
    ) -> Result<Structure> {
        let prefix = if repo_dir.is_empty() {
            String::new()
        } else {
            format!("{}/", repo_dir)
        };

        let mut structure = Structure::directory(label);
        for file in repo.list_files(revision, repo_dir)? {
            let rel_path = file.strip_prefix(&prefix).unwrap_or(&file);
            if in_skipped_dir(rel_path, &self.options().skip_dirs) {
                continue;
            }

            let name = Path::new(&file);
            // Extensionless files go through the shebang check after materializing.
            if name.extension().is_some() && self.registry.analyzer_for(name).is_none() {
                continue;
            }

            let historical = format!("{}@{}", file, revision);
            if let Some(outcome) = self
                .analyze_blob(repo, revision, &file, &historical)
                .transpose()
            {
                absorb_outcome(&mut structure, outcome, rel_path);
            }
        }

        Ok(structure)
    }

    /// Materialize one historical file and analyze it. `Ok(None)` when no
    /// analyzer handles it.
    fn analyze_blob(
        &self,
        repo: &GitRepo,
        revision: &str,
        repo_file: &str,
        label: &str,
    ) -> Result<Option<Structure>> {
        let content = repo.read_blob(revision, repo_file)?;
        let temp = self.materialize(&content, repo_file)?;

        let Some(analyzer) = self.registry.analyzer_for(temp.path()) else {
            return Ok(None);
        };
        tracing::debug!(file = repo_file, temp = %temp.path().display(), "analyzing historical file");

        analyzer
            .analyze(temp.path())
            .map(Some)
            .map_err(|e| match e {
                SemdiffError::Analysis { message, .. } => SemdiffError::analysis(label, message),
                other => other,
            })
    }

    fn materialize(&self, content: &[u8], repo_file: &str) -> Result<NamedTempFile> {
        let suffix = Path::new(repo_file)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();

        let mut builder = tempfile::Builder::new();
        builder.prefix("semdiff-").suffix(&suffix);
        let mut file = match &self.options().temp_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(content)?;
        file.flush()?;
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn address(path: &str, revision: &str) -> RevisionAddress {
        RevisionAddress {
            path: path.to_string(),
            revision: revision.to_string(),
        }
    }

    #[test]
    fn test_path_qualified() {
        assert_eq!(
            parse_revision_address("src/app.py@HEAD~1").unwrap(),
            address("src/app.py", "HEAD~1")
        );
        assert_eq!(
            parse_revision_address("src@origin/main").unwrap(),
            address("src", "origin/main")
        );
        assert_eq!(
            parse_revision_address("@v1.2.0").unwrap(),
            address(".", "v1.2.0")
        );
    }

    #[test]
    fn test_last_at_wins() {
        assert_eq!(
            parse_revision_address("pkgs/name@2/mod.py@abc123").unwrap(),
            address("pkgs/name@2/mod.py", "abc123")
        );
    }

    #[test]
    fn test_revision_qualified() {
        assert_eq!(
            parse_revision_address("HEAD~1/src/app.py").unwrap(),
            address("src/app.py", "HEAD~1")
        );
        assert_eq!(
            parse_revision_address("a1b2c3d/lib.rs").unwrap(),
            address("lib.rs", "a1b2c3d")
        );
    }

    #[test]
    fn test_malformed_addresses() {
        for bad in ["HEAD", "src/app.py@", "/app.py", "HEAD~1/", ""] {
            let err = parse_revision_address(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Format, "input: {bad:?}");
        }
    }
}
