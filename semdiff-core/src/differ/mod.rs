//! Structural diff engine.
//!
//! [`diff_structures`] compares two whole [`Structure`](crate::types::Structure)s
//! and reports per-category counts plus ordered change records.
//! [`diff_element`] looks one name up on both sides and classifies it.
//!
//! # Example
//!
//! ```
//! use semdiff_core::differ::diff_structures;
//! use semdiff_core::types::{CodeElement, Structure};
//!
//! let left = Structure::default();
//! let mut right = Structure::default();
//! right.functions.push(CodeElement::named("greet"));
//!
//! let result = diff_structures(&left, &right);
//! assert_eq!(result.summary.text(), "functions: 1 added");
//! ```

pub mod changes;
pub mod comparator;
pub mod element;

pub use changes::{
    CategorySummary, ChangeKind, DiffDetail, DiffRecord, DiffReport, DiffSummary, FieldChange,
    FieldChanges, SideInfo, StructureDiff,
};
pub use comparator::{compare_elements, diff_structures};
pub use element::{diff_element, find_element, ElementDiff};
