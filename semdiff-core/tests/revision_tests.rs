//! Historical resolution against a scratch git repository.
//!
//! Every test returns early when `git` is not installed.

use std::fs;
use std::path::Path;
use std::process::Command;

use semdiff_core::{
    diff_structures, Registry, ResolveOptions, Resolver, ResourceLocator, SemdiffError,
    StructureKind,
};
use tempfile::TempDir;

const FIRST: &str = "import os\n\n\ndef greet(name):\n    return name\n\n\ndef farewell():\n    pass\n";
const SECOND: &str = "import os\n\n\ndef greet(name):\n    if name:\n        return name\n    return ''\n";

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(["-c", "user.name=Test", "-c", "user.email=test@example.com"])
        .args(["-c", "commit.gpgsign=false"])
        .args(args)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

fn write(root: &Path, rel: &str, content: impl AsRef<[u8]>) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Two commits: the first has `farewell` and `lib/util.py`, the second
/// drops `farewell` and adds `lib/extra.py`.
fn scratch_repo() -> Option<TempDir> {
    if !git_available() {
        eprintln!("git not available, skipping");
        return None;
    }

    let dir = TempDir::new().unwrap();
    let root = dir.path();
    git(root, &["init", "-q"]);

    write(root, "app.py", FIRST);
    write(root, "lib/util.py", "def util():\n    pass\n");
    write(root, "scripts/run", "#!/usr/bin/env python3\ndef main():\n    pass\n");
    write(root, "notes.txt", "not code\n");
    git(root, &["add", "-A"]);
    git(root, &["commit", "-q", "-m", "first"]);

    write(root, "app.py", SECOND);
    write(root, "lib/extra.py", "def extra():\n    pass\n");
    git(root, &["add", "-A"]);
    git(root, &["commit", "-q", "-m", "second"]);

    Some(dir)
}

fn path_str(path: &Path) -> String {
    path.to_str().unwrap().to_string()
}

#[test]
fn test_file_at_previous_revision() {
    let Some(repo) = scratch_repo() else { return };
    let registry = Registry::with_defaults();
    let resolver = Resolver::new(&registry, ResolveOptions::default());
    let app = path_str(&repo.path().join("app.py"));

    let old = resolver.resolve_revision("HEAD~1", &app).unwrap();
    assert_eq!(old.kind, StructureKind::File);
    assert_eq!(old.path, Some(format!("{}@HEAD~1", app)));
    assert!(old.functions.iter().any(|f| f.name == "farewell"));
    assert!(old.functions.iter().all(|f| f.file.is_none()));

    let live = resolver.resolve_path(Path::new(&app)).unwrap();
    let result = diff_structures(&old, &live);
    assert_eq!(result.summary.functions.removed, 1);
    assert_eq!(result.summary.functions.modified, 1);
    assert_eq!(result.diff.functions[0].element.name, "farewell");
}

#[test]
fn test_both_address_forms_agree() {
    let Some(repo) = scratch_repo() else { return };
    let registry = Registry::with_defaults();
    let resolver = Resolver::new(&registry, ResolveOptions::default());
    let app = path_str(&repo.path().join("app.py"));

    let preferred = resolver
        .resolve(&ResourceLocator::parse(&format!("git://{}@HEAD~1", app)))
        .unwrap();
    let legacy = resolver
        .resolve(&ResourceLocator::parse(&format!("git://HEAD~1/{}", app)))
        .unwrap();

    assert_eq!(preferred.functions, legacy.functions);
    assert_eq!(preferred.imports, legacy.imports);
}

#[test]
fn test_directory_at_revision() {
    let Some(repo) = scratch_repo() else { return };
    let registry = Registry::with_defaults();
    let resolver = Resolver::new(&registry, ResolveOptions::default());

    let old = resolver
        .resolve_revision("HEAD~1", &path_str(repo.path()))
        .unwrap();
    assert_eq!(old.kind, StructureKind::Directory);
    // app.py, lib/util.py and the python shebang script
    assert_eq!(old.file_count, Some(3));

    let main = old.functions.iter().find(|f| f.name == "main").unwrap();
    assert_eq!(main.file.as_deref(), Some("scripts/run"));

    let lib = resolver
        .resolve_revision("HEAD", &path_str(&repo.path().join("lib")))
        .unwrap();
    let mut files: Vec<_> = lib
        .functions
        .iter()
        .filter_map(|f| f.file.as_deref())
        .collect();
    files.sort();
    assert_eq!(files, vec!["extra.py", "util.py"]);
}

#[test]
fn test_directory_history_against_live_tree() {
    let Some(repo) = scratch_repo() else { return };
    let registry = Registry::with_defaults();
    let resolver = Resolver::new(&registry, ResolveOptions::default());

    let old = resolver
        .resolve_revision("HEAD~1", &path_str(repo.path()))
        .unwrap();
    let live = resolver.resolve_path(repo.path()).unwrap();
    let result = diff_structures(&old, &live);

    assert_eq!(result.summary.functions.added, 1);
    assert_eq!(result.summary.functions.removed, 1);
    let added = &result.diff.functions[0];
    assert_eq!(added.element.name, "extra");
    assert_eq!(added.element.file.as_deref(), Some("lib/extra.py"));
}

#[test]
fn test_skip_dirs_apply_to_history() {
    let Some(repo) = scratch_repo() else { return };
    write(repo.path(), "node_modules/dep.py", "def dep():\n    pass\n");
    write(repo.path(), "build/gen.py", "def gen():\n    pass\n");
    git(repo.path(), &["add", "-A", "-f"]);
    git(repo.path(), &["commit", "-q", "-m", "vendored"]);

    let registry = Registry::with_defaults();
    let resolver = Resolver::new(&registry, ResolveOptions::default());

    let historical = resolver
        .resolve_revision("HEAD", &path_str(repo.path()))
        .unwrap();
    let live = resolver.resolve_path(repo.path()).unwrap();

    assert_eq!(historical.file_count, live.file_count);
    assert!(historical.functions.iter().all(|f| f.name != "dep" && f.name != "gen"));
    assert!(diff_structures(&historical, &live).summary.is_empty());
}

#[test]
fn test_path_missing_at_revision() {
    let Some(repo) = scratch_repo() else { return };
    let registry = Registry::with_defaults();
    let resolver = Resolver::new(&registry, ResolveOptions::default());

    let err = resolver
        .resolve_revision("HEAD~1", &path_str(&repo.path().join("lib/extra.py")))
        .unwrap_err();
    assert!(matches!(err, SemdiffError::PathNotFoundAtRevision { ref path, .. } if path == "lib/extra.py"));
}

#[test]
fn test_unknown_revision() {
    let Some(repo) = scratch_repo() else { return };
    let registry = Registry::with_defaults();
    let resolver = Resolver::new(&registry, ResolveOptions::default());

    let err = resolver
        .resolve_revision("no-such-branch", &path_str(&repo.path().join("app.py")))
        .unwrap_err();
    assert!(matches!(err, SemdiffError::UnknownRevision { .. }));
}

#[test]
fn test_not_version_controlled() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    write(dir.path(), "app.py", FIRST);

    let registry = Registry::with_defaults();
    let resolver = Resolver::new(&registry, ResolveOptions::default());
    let err = resolver
        .resolve_revision("HEAD", &path_str(&dir.path().join("app.py")))
        .unwrap_err();
    assert!(matches!(err, SemdiffError::NotVersionControlled { .. }));
}

#[test]
fn test_temp_files_removed_on_success_and_failure() {
    let Some(repo) = scratch_repo() else { return };
    write(repo.path(), "broken.py", b"def\xff\xfe");
    git(repo.path(), &["add", "-A"]);
    git(repo.path(), &["commit", "-q", "-m", "broken"]);

    let scratch = TempDir::new().unwrap();
    let registry = Registry::with_defaults();
    let options = ResolveOptions {
        temp_dir: Some(scratch.path().to_path_buf()),
        ..Default::default()
    };
    let resolver = Resolver::new(&registry, options);

    resolver
        .resolve_revision("HEAD", &path_str(&repo.path().join("app.py")))
        .unwrap();

    let err = resolver
        .resolve_revision("HEAD", &path_str(&repo.path().join("broken.py")))
        .unwrap_err();
    assert!(matches!(err, SemdiffError::Analysis { ref path, .. } if path.ends_with("broken.py@HEAD")));

    let whole = resolver
        .resolve_revision("HEAD", &path_str(repo.path()))
        .unwrap();
    assert_eq!(whole.skipped_files, 1);

    assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
}
