//! semdiff core - structural diff between code resources.
//!
//! Two resources (files, directories, historical revisions, or anything a
//! registered adapter exposes) are each resolved to a [`Structure`] of
//! functions, classes and imports, then compared element by element.
//!
//! # Features
//!
//! - **Compound locators**: `left:right[/element]`, with scheme-qualified sides
//!   and Windows drive prefixes told apart from the separator
//! - **Directory aggregation**: every analyzable file, tagged with its
//!   relative path
//! - **Historical revisions**: `git://path@rev` and the legacy `git://rev/path`
//! - **Pluggable analyzers and adapters** through an injected [`Registry`]
//!
//! # Usage
//!
//! ```no_run
//! use semdiff_core::{diff_structures, CompoundLocator, Registry, ResolveOptions, Resolver};
//!
//! let registry = Registry::with_defaults();
//! let resolver = Resolver::new(&registry, ResolveOptions::default());
//!
//! let locator = CompoundLocator::parse("git://src@HEAD~1:src")?;
//! let left = resolver.resolve(&locator.left)?;
//! let right = resolver.resolve(&locator.right)?;
//! println!("{}", diff_structures(&left, &right).summary.text());
//! # Ok::<(), semdiff_core::SemdiffError>(())
//! ```

pub mod adapters;
pub mod analyzer;
pub mod differ;
pub mod error;
pub mod locator;
pub mod registry;
pub mod resolver;
pub mod types;

pub use differ::{diff_element, diff_structures, DiffReport, DiffSummary, ElementDiff, SideInfo};
pub use error::{ErrorKind, Result, SemdiffError};
pub use locator::{parse_compound, CompoundLocator, ResourceLocator};
pub use registry::{Adapter, AdapterFactory, Analyzer, Registry};
pub use resolver::{ResolveOptions, Resolver};
pub use types::{Category, CodeElement, Structure, StructureKind};
