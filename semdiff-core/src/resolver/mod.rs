//! Resource resolution.
//!
//! A [`Resolver`] turns one [`ResourceLocator`] into a [`Structure`]:
//!
//! 1. `file` scheme, directory: recursive aggregation ([`Resolver::resolve_directory`])
//! 2. `file` scheme, file: the registered analyzer for that file
//! 3. `git` scheme: historical lookup ([`Resolver::resolve_revision`])
//! 4. anything else: the adapter registered for the scheme

use std::path::{Path, PathBuf};

use crate::error::{Result, SemdiffError};
use crate::locator::{ResourceLocator, DEFAULT_SCHEME};
use crate::registry::Registry;
use crate::types::Structure;

mod directory;
pub mod git;
mod revision;

pub use directory::relative_path;
pub use revision::{parse_revision_address, RevisionAddress, REVISION_SCHEME};

/// Directory names never descended into during aggregation.
pub const DEFAULT_SKIP_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "__pycache__",
    ".venv",
    "venv",
    "target",
    "build",
    "dist",
    ".tox",
    ".pytest_cache",
    ".mypy_cache",
    ".ruff_cache",
];

/// Settings the resolver needs from the embedding application.
#[derive(Clone, Debug)]
pub struct ResolveOptions {
    /// Directory names skipped during aggregation.
    pub skip_dirs: Vec<String>,
    /// Honor `.gitignore` / `.ignore` files while walking directories.
    pub respect_gitignore: bool,
    /// Version-control binary.
    pub git_binary: String,
    /// Where historical file content is materialized. `None` uses the
    /// system temporary directory.
    pub temp_dir: Option<PathBuf>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            skip_dirs: DEFAULT_SKIP_DIRS.iter().map(|s| s.to_string()).collect(),
            respect_gitignore: false,
            git_binary: "git".to_string(),
            temp_dir: None,
        }
    }
}

impl ResolveOptions {
    /// Add directory names to the skip list, ignoring duplicates.
    pub fn with_extra_skip_dirs<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for dir in extra {
            let dir = dir.into();
            let dir = dir.trim_end_matches('/').to_string();
            if !dir.is_empty() && !self.skip_dirs.contains(&dir) {
                self.skip_dirs.push(dir);
            }
        }
        self
    }
}

/// Resolves locators against a registry. Holds no per-request state, so one
/// resolver can serve any number of calls.
pub struct Resolver<'a> {
    registry: &'a Registry,
    options: ResolveOptions,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a Registry, options: ResolveOptions) -> Self {
        Self { registry, options }
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    pub fn resolve(&self, locator: &ResourceLocator) -> Result<Structure> {
        tracing::debug!(scheme = locator.scheme(), resource = locator.resource(), "resolving");

        match locator.scheme() {
            DEFAULT_SCHEME => self.resolve_path(Path::new(locator.resource())),
            REVISION_SCHEME => {
                let address = parse_revision_address(locator.resource())?;
                self.resolve_revision(&address.revision, &address.path)
            }
            scheme => self.resolve_adapter(scheme, locator.resource()),
        }
    }

    /// Resolve a live filesystem path: file or directory.
    pub fn resolve_path(&self, path: &Path) -> Result<Structure> {
        if !path.exists() {
            return Err(SemdiffError::PathNotFound {
                path: path.display().to_string(),
            });
        }

        if path.is_dir() {
            self.resolve_directory(path)
        } else {
            self.analyze_file(path)
        }
    }

    /// Run the registered analyzer on a single file.
    pub fn analyze_file(&self, path: &Path) -> Result<Structure> {
        let analyzer = self
            .registry
            .analyzer_for(path)
            .ok_or_else(|| SemdiffError::NoAnalyzer {
                path: path.display().to_string(),
            })?;
        tracing::debug!(path = %path.display(), analyzer = analyzer.name(), "analyzing file");
        analyzer.analyze(path)
    }

    fn resolve_adapter(&self, scheme: &str, resource: &str) -> Result<Structure> {
        let factory =
            self.registry
                .adapter(scheme)
                .ok_or_else(|| SemdiffError::UnsupportedScheme {
                    scheme: scheme.to_string(),
                })?;

        let argument = factory.accepts_resource().then_some(resource);
        tracing::debug!(scheme, with_resource = argument.is_some(), "creating adapter");

        let adapter = factory.create(argument)?;
        adapter.get_structure()
    }
}
