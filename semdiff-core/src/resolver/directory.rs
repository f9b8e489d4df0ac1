//! Recursive directory aggregation using the `ignore` crate.

use std::collections::HashSet;
use std::path::{Component, Path};

use ignore::WalkBuilder;

use super::Resolver;
use crate::error::Result;
use crate::types::Structure;

/// `path` relative to `root`, joined with `/` regardless of platform.
/// Falls back to the full path when `path` is not under `root`.
pub fn relative_path(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// True when any directory component of `rel_path` is in `skip_dirs`. The
/// file name itself is not checked.
pub(crate) fn in_skipped_dir(rel_path: &str, skip_dirs: &[String]) -> bool {
    let mut parts: Vec<&str> = rel_path.split('/').collect();
    parts.pop();
    parts
        .iter()
        .any(|part| skip_dirs.iter().any(|dir| dir == part))
}

/// Fold one file's analysis outcome into an aggregate. Failures are logged
/// and counted, never returned.
pub(crate) fn absorb_outcome(aggregate: &mut Structure, outcome: Result<Structure>, rel_path: &str) {
    match outcome {
        Ok(file) => aggregate.absorb(file, rel_path),
        Err(e) => {
            tracing::warn!(file = rel_path, error = %e, "skipping file");
            aggregate.skipped_files += 1;
        }
    }
}

impl Resolver<'_> {
    /// Analyze every file under `root` that has a registered analyzer.
    pub fn resolve_directory(&self, root: &Path) -> Result<Structure> {
        let options = self.options();
        let skip: HashSet<String> = options.skip_dirs.iter().cloned().collect();

        let mut builder = WalkBuilder::new(root);
        builder
            .hidden(false)
            .git_ignore(options.respect_gitignore)
            .git_global(options.respect_gitignore)
            .git_exclude(options.respect_gitignore)
            .ignore(options.respect_gitignore)
            .parents(options.respect_gitignore)
            .require_git(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
                entry.depth() == 0
                    || !is_dir
                    || !skip.contains(entry.file_name().to_string_lossy().as_ref())
            });

        let mut structure = Structure::directory(root.display().to_string());
        let mut seen = 0usize;

        for entry in builder.build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(error = %e, "walk error");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let path = entry.path();
            let Some(analyzer) = self.registry.analyzer_for(path) else {
                continue;
            };

            seen += 1;
            let rel_path = relative_path(path, root);
            tracing::debug!(file = %rel_path, analyzer = analyzer.name(), "analyzing");
            absorb_outcome(&mut structure, analyzer.analyze(path), &rel_path);
        }

        tracing::debug!(
            root = %root.display(),
            analyzable = seen,
            skipped = structure.skipped_files,
            "directory aggregated"
        );
        Ok(structure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SemdiffError;
    use crate::registry::{Analyzer, Registry};
    use crate::resolver::ResolveOptions;
    use crate::types::CodeElement;
    use std::fs;
    use std::sync::Arc;

    /// One function per line of the file; files containing `boom` fail.
    struct LineAnalyzer;

    impl Analyzer for LineAnalyzer {
        fn name(&self) -> &'static str {
            "lines"
        }

        fn extensions(&self) -> &'static [&'static str] {
            &["src"]
        }

        fn analyze(&self, path: &Path) -> Result<Structure> {
            let content = fs::read_to_string(path)?;
            if content.contains("boom") {
                return Err(SemdiffError::analysis(path.display().to_string(), "boom"));
            }
            let mut s = Structure::file(path.display().to_string());
            for line in content.lines() {
                s.functions.push(CodeElement::named(line.trim()));
            }
            Ok(s)
        }
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register_analyzer(Arc::new(LineAnalyzer));
        registry
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_in_skipped_dir() {
        let skip = vec!["node_modules".to_string(), "build".to_string()];
        assert!(in_skipped_dir("node_modules/dep.py", &skip));
        assert!(in_skipped_dir("web/node_modules/x/dep.py", &skip));
        assert!(!in_skipped_dir("app.py", &skip));
        assert!(!in_skipped_dir("src/build.py", &skip));
        assert!(!in_skipped_dir("build", &skip));
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(
            relative_path(Path::new("/repo/src/a.py"), Path::new("/repo")),
            "src/a.py"
        );
        assert_eq!(relative_path(Path::new("/repo"), Path::new("/repo")), "");
    }

    #[test]
    fn test_aggregates_and_tags() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.src", "foo\n");
        write(dir.path(), "pkg/b.src", "foo\nbar\n");
        write(dir.path(), "README.md", "not analyzed");

        let registry = registry();
        let resolver = Resolver::new(&registry, ResolveOptions::default());
        let s = resolver.resolve_directory(dir.path()).unwrap();

        assert_eq!(s.kind, crate::types::StructureKind::Directory);
        assert_eq!(s.file_count, Some(2));
        assert_eq!(s.skipped_files, 0);

        let tagged: Vec<_> = s
            .functions
            .iter()
            .map(|f| (f.file.as_deref().unwrap(), f.name.as_str()))
            .collect();
        assert_eq!(
            tagged,
            vec![("a.src", "foo"), ("pkg/b.src", "foo"), ("pkg/b.src", "bar")]
        );
    }

    #[test]
    fn test_skips_known_directories() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "main.src", "main\n");
        write(dir.path(), "node_modules/dep.src", "dep\n");
        write(dir.path(), "__pycache__/cached.src", "cached\n");
        write(dir.path(), ".git/hooks/hook.src", "hook\n");

        let registry = registry();
        let resolver = Resolver::new(&registry, ResolveOptions::default());
        let s = resolver.resolve_directory(dir.path()).unwrap();

        assert_eq!(s.file_count, Some(1));
        assert_eq!(s.functions.len(), 1);
        assert_eq!(s.functions[0].name, "main");
    }

    #[test]
    fn test_extra_skip_dir() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "main.src", "main\n");
        write(dir.path(), "vendor/lib.src", "lib\n");

        let registry = registry();
        let options = ResolveOptions::default().with_extra_skip_dirs(["vendor"]);
        let resolver = Resolver::new(&registry, options);
        let s = resolver.resolve_directory(dir.path()).unwrap();

        assert_eq!(s.file_count, Some(1));
    }

    #[test]
    fn test_failed_file_is_counted_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "good.src", "ok\n");
        write(dir.path(), "bad.src", "boom\n");

        let registry = registry();
        let resolver = Resolver::new(&registry, ResolveOptions::default());
        let s = resolver.resolve_directory(dir.path()).unwrap();

        assert_eq!(s.file_count, Some(1));
        assert_eq!(s.skipped_files, 1);
        assert_eq!(s.functions[0].name, "ok");
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry();
        let resolver = Resolver::new(&registry, ResolveOptions::default());
        let s = resolver.resolve_directory(dir.path()).unwrap();

        assert_eq!(s.file_count, Some(0));
        assert_eq!(s.element_count(), 0);
    }

    #[test]
    fn test_gitignore_respected_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ".gitignore", "generated/\n");
        write(dir.path(), "main.src", "main\n");
        write(dir.path(), "generated/out.src", "out\n");

        let registry = registry();

        let resolver = Resolver::new(&registry, ResolveOptions::default());
        assert_eq!(resolver.resolve_directory(dir.path()).unwrap().file_count, Some(2));

        let options = ResolveOptions {
            respect_gitignore: true,
            ..Default::default()
        };
        let resolver = Resolver::new(&registry, options);
        assert_eq!(resolver.resolve_directory(dir.path()).unwrap().file_count, Some(1));
    }
}
