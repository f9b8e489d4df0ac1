//! Analyzer and adapter registry.
//!
//! One [`Registry`] is built at startup and handed to the resolver. It maps
//! file extensions (and shebang interpreters) to [`Analyzer`]s and scheme
//! names to [`AdapterFactory`]s.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::adapters::{JsonAdapterFactory, StdinAdapterFactory};
use crate::analyzer::{python::PythonAnalyzer, rust_lang::RustAnalyzer};
use crate::error::Result;
use crate::types::Structure;

/// Turns one source file into a [`Structure`].
pub trait Analyzer: Send + Sync {
    /// Language name, e.g. `python`.
    fn name(&self) -> &'static str;

    /// Lowercase extensions without the leading dot.
    fn extensions(&self) -> &'static [&'static str];

    /// Interpreter names recognized in a `#!` line.
    fn interpreters(&self) -> &'static [&'static str] {
        &[]
    }

    fn analyze(&self, path: &Path) -> Result<Structure>;
}

/// A structure source addressed by scheme, e.g. `json://snapshot.json`.
pub trait Adapter {
    fn get_structure(&self) -> Result<Structure>;
}

/// Builds adapters for one scheme.
pub trait AdapterFactory: Send + Sync {
    fn scheme(&self) -> &'static str;

    /// Whether `create` expects the resource string. Factories that return
    /// `false` are always called with `None`.
    fn accepts_resource(&self) -> bool {
        true
    }

    fn create(&self, resource: Option<&str>) -> Result<Box<dyn Adapter>>;
}

static SHEBANG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#!\s*(?:\S*/)?(?:env\s+(?:-\S+\s+)*)?([A-Za-z_]+)").unwrap()
});

/// Lookup tables for analyzers and adapters.
#[derive(Default)]
pub struct Registry {
    analyzers: Vec<Arc<dyn Analyzer>>,
    by_extension: HashMap<String, usize>,
    by_interpreter: HashMap<String, usize>,
    adapters: BTreeMap<String, Box<dyn AdapterFactory>>,
}

impl Registry {
    /// Empty registry; tests use this to inject fakes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in analyzers and adapters.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_analyzer(Arc::new(PythonAnalyzer));
        registry.register_analyzer(Arc::new(RustAnalyzer));
        registry.register_adapter(Box::new(JsonAdapterFactory));
        registry.register_adapter(Box::new(StdinAdapterFactory));
        registry
    }

    /// Register an analyzer. Later registrations win on extension clashes.
    pub fn register_analyzer(&mut self, analyzer: Arc<dyn Analyzer>) {
        let index = self.analyzers.len();
        for ext in analyzer.extensions() {
            self.by_extension.insert(ext.to_ascii_lowercase(), index);
        }
        for interpreter in analyzer.interpreters() {
            self.by_interpreter.insert(interpreter.to_string(), index);
        }
        self.analyzers.push(analyzer);
    }

    pub fn register_adapter(&mut self, factory: Box<dyn AdapterFactory>) {
        self.adapters
            .insert(factory.scheme().to_ascii_lowercase(), factory);
    }

    /// Analyzer for a path: by extension, then by shebang for
    /// extensionless files.
    pub fn analyzer_for(&self, path: &Path) -> Option<&dyn Analyzer> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self
                .by_extension
                .get(&ext.to_ascii_lowercase())
                .map(|i| self.analyzers[*i].as_ref()),
            None => {
                let interpreter = read_shebang(path)?;
                self.by_interpreter
                    .get(&interpreter)
                    .map(|i| self.analyzers[*i].as_ref())
            }
        }
    }

    pub fn adapter(&self, scheme: &str) -> Option<&dyn AdapterFactory> {
        self.adapters
            .get(&scheme.to_ascii_lowercase())
            .map(|f| f.as_ref())
    }

    pub fn analyzers(&self) -> impl Iterator<Item = &dyn Analyzer> {
        self.analyzers.iter().map(|a| a.as_ref())
    }

    pub fn schemes(&self) -> impl Iterator<Item = &str> {
        self.adapters.keys().map(|s| s.as_str())
    }
}

fn read_shebang(path: &Path) -> Option<String> {
    let file = File::open(path).ok()?;
    let mut first = String::new();
    BufReader::new(file).read_line(&mut first).ok()?;
    interpreter_from_shebang(&first)
}

fn interpreter_from_shebang(line: &str) -> Option<String> {
    SHEBANG
        .captures(line.trim_end())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
}
