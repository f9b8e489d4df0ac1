//! Change types and result structures for structural diff.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Category, CodeElement, Structure, StructureKind};

/// Type of change detected for one element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
            ChangeKind::Modified => "modified",
        }
    }

    /// One-character marker used by line-oriented output.
    pub fn sigil(&self) -> char {
        match self {
            ChangeKind::Added => '+',
            ChangeKind::Removed => '-',
            ChangeKind::Modified => '~',
        }
    }
}

/// Old and new value of one compared field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub old: Value,
    pub new: Value,

    /// `new - old`, for numeric fields present on both sides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<i64>,

    /// Method names only on the new side.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub added: Vec<String>,

    /// Method names only on the old side.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed: Vec<String>,
}

impl FieldChange {
    pub fn values(old: impl Serialize, new: impl Serialize) -> Self {
        Self {
            old: serde_json::to_value(old).unwrap_or(Value::Null),
            new: serde_json::to_value(new).unwrap_or(Value::Null),
            delta: None,
            added: Vec::new(),
            removed: Vec::new(),
        }
    }

    pub fn numeric(old: Option<u32>, new: Option<u32>) -> Self {
        let mut change = Self::values(old, new);
        if let (Some(old), Some(new)) = (old, new) {
            change.delta = Some(i64::from(new) - i64::from(old));
        }
        change
    }
}

/// Field name to change, sorted by field name.
pub type FieldChanges = BTreeMap<String, FieldChange>;

/// One entry in a category's detail list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiffRecord {
    pub change: ChangeKind,

    /// The added or removed element, or the new side of a modified one.
    #[serde(flatten)]
    pub element: CodeElement,

    /// Differing fields (modified records only).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub changes: FieldChanges,
}

impl DiffRecord {
    pub fn added(element: CodeElement) -> Self {
        Self {
            change: ChangeKind::Added,
            element,
            changes: FieldChanges::new(),
        }
    }

    pub fn removed(element: CodeElement) -> Self {
        Self {
            change: ChangeKind::Removed,
            element,
            changes: FieldChanges::new(),
        }
    }

    pub fn modified(element: CodeElement, changes: FieldChanges) -> Self {
        Self {
            change: ChangeKind::Modified,
            element,
            changes,
        }
    }
}

/// Counts for one category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
}

impl CategorySummary {
    pub fn total(&self) -> usize {
        self.added + self.removed + self.modified
    }
}

/// Summary statistics for a diff.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub functions: CategorySummary,
    pub classes: CategorySummary,
    /// Serialized without `modified`: imports are only ever added or removed.
    #[serde(with = "import_counts")]
    pub imports: CategorySummary,
}

mod import_counts {
    use super::CategorySummary;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct ImportCounts {
        added: usize,
        removed: usize,
    }

    pub fn serialize<S: Serializer>(counts: &CategorySummary, s: S) -> Result<S::Ok, S::Error> {
        ImportCounts {
            added: counts.added,
            removed: counts.removed,
        }
        .serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<CategorySummary, D::Error> {
        let counts = ImportCounts::deserialize(d)?;
        Ok(CategorySummary {
            added: counts.added,
            removed: counts.removed,
            modified: 0,
        })
    }
}

impl DiffSummary {
    pub fn get(&self, category: Category) -> &CategorySummary {
        match category {
            Category::Function => &self.functions,
            Category::Class => &self.classes,
            Category::Import => &self.imports,
        }
    }

    /// Increment the counter for one change.
    pub fn record(&mut self, category: Category, change: ChangeKind) {
        let counts = match category {
            Category::Function => &mut self.functions,
            Category::Class => &mut self.classes,
            Category::Import => &mut self.imports,
        };
        match change {
            ChangeKind::Added => counts.added += 1,
            ChangeKind::Removed => counts.removed += 1,
            ChangeKind::Modified => counts.modified += 1,
        }
    }

    pub fn total(&self) -> usize {
        Category::ALL.iter().map(|c| self.get(*c).total()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Generate human-readable summary string.
    pub fn text(&self) -> String {
        let mut parts = Vec::new();

        for category in Category::ALL {
            let counts = self.get(category);
            let mut category_parts = Vec::new();
            if counts.added > 0 {
                category_parts.push(format!("{} added", counts.added));
            }
            if counts.removed > 0 {
                category_parts.push(format!("{} removed", counts.removed));
            }
            if counts.modified > 0 {
                category_parts.push(format!("{} modified", counts.modified));
            }
            if !category_parts.is_empty() {
                parts.push(format!("{}: {}", category.plural(), category_parts.join(", ")));
            }
        }

        if parts.is_empty() {
            "No changes".to_string()
        } else {
            parts.join("; ")
        }
    }
}

/// Per-category ordered change records: added, then removed, then modified.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffDetail {
    pub functions: Vec<DiffRecord>,
    pub classes: Vec<DiffRecord>,
    pub imports: Vec<DiffRecord>,
}

impl DiffDetail {
    pub fn records(&self, category: Category) -> &[DiffRecord] {
        match category {
            Category::Function => &self.functions,
            Category::Class => &self.classes,
            Category::Import => &self.imports,
        }
    }

    pub fn records_mut(&mut self, category: Category) -> &mut Vec<DiffRecord> {
        match category {
            Category::Function => &mut self.functions,
            Category::Class => &mut self.classes,
            Category::Import => &mut self.imports,
        }
    }

    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|c| self.records(*c).is_empty())
    }
}

/// Result of comparing two whole structures.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StructureDiff {
    pub summary: DiffSummary,
    pub diff: DiffDetail,
}

impl StructureDiff {
    pub fn has_changes(&self) -> bool {
        !self.diff.is_empty()
    }
}

/// What a renderer needs to know about one side of the comparison.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SideInfo {
    pub uri: String,

    #[serde(rename = "type")]
    pub kind: StructureKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_count: Option<usize>,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub skipped_files: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl SideInfo {
    pub fn new(uri: impl Into<String>, structure: &Structure) -> Self {
        Self {
            uri: uri.into(),
            kind: structure.kind,
            file_count: structure.file_count,
            skipped_files: structure.skipped_files,
        }
    }

    /// "3 of 12 files skipped" when aggregation dropped files.
    pub fn skipped_note(&self) -> Option<String> {
        if self.skipped_files == 0 {
            return None;
        }
        let total = self.file_count.unwrap_or(0) + self.skipped_files;
        Some(format!("{} of {} files skipped", self.skipped_files, total))
    }
}

/// Full structural diff with both sides described, ready for rendering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiffReport {
    pub left: SideInfo,
    pub right: SideInfo,
    pub summary: DiffSummary,
    pub diff: DiffDetail,
}

impl DiffReport {
    pub fn new(left: SideInfo, right: SideInfo, result: StructureDiff) -> Self {
        Self {
            left,
            right,
            summary: result.summary,
            diff: result.diff,
        }
    }
}
