//! Whole-structure comparison.
//!
//! Elements are matched by identity within each category: `name` for
//! functions and classes, `content` for imports. When both structures carry
//! `file` tags (directory or historical aggregates) the file path is part of
//! the function and class key, so same-named functions in different files
//! never pair up. Imports stay keyed by content alone.
//! Inputs are never mutated.

use std::collections::{BTreeSet, HashMap};

use crate::differ::changes::{DiffRecord, FieldChange, FieldChanges, StructureDiff};
use crate::types::{Category, CodeElement, Structure};

type Key<'a> = (Option<&'a str>, &'a str);

/// Elements of one category keyed by identity. A repeated key keeps its
/// last occurrence, and iteration follows the position of that occurrence.
struct Index<'a> {
    by_key: HashMap<Key<'a>, (usize, &'a CodeElement)>,
}

impl<'a> Index<'a> {
    fn build(elements: &'a [CodeElement], category: Category, file_scoped: bool) -> Self {
        let mut by_key = HashMap::with_capacity(elements.len());
        for (position, element) in elements.iter().enumerate() {
            let identity = element.identity(category);
            if identity.is_empty() {
                continue;
            }
            let file = if file_scoped && category != Category::Import {
                element.file.as_deref()
            } else {
                None
            };
            by_key.insert((file, identity), (position, element));
        }
        Self { by_key }
    }

    fn contains(&self, key: &Key<'a>) -> bool {
        self.by_key.contains_key(key)
    }

    fn get(&self, key: &Key<'a>) -> Option<&'a CodeElement> {
        self.by_key.get(key).map(|(_, element)| *element)
    }

    fn ordered(&self) -> Vec<(Key<'a>, &'a CodeElement)> {
        let mut entries: Vec<_> = self
            .by_key
            .iter()
            .map(|(key, (position, element))| (*position, *key, *element))
            .collect();
        entries.sort_unstable_by_key(|(position, _, _)| *position);
        entries
            .into_iter()
            .map(|(_, key, element)| (key, element))
            .collect()
    }
}

/// Compare two structures category by category.
pub fn diff_structures(left: &Structure, right: &Structure) -> StructureDiff {
    let file_scoped = left.is_file_tagged() && right.is_file_tagged();
    let mut result = StructureDiff::default();

    for category in Category::ALL {
        let records = diff_category(
            category,
            left.elements(category),
            right.elements(category),
            file_scoped,
        );
        for record in &records {
            result.summary.record(category, record.change);
        }
        *result.diff.records_mut(category) = records;
    }

    tracing::debug!(file_scoped, summary = %result.summary.text(), "structures compared");
    result
}

fn diff_category(
    category: Category,
    left: &[CodeElement],
    right: &[CodeElement],
    file_scoped: bool,
) -> Vec<DiffRecord> {
    let left_index = Index::build(left, category, file_scoped);
    let right_index = Index::build(right, category, file_scoped);
    let left_ordered = left_index.ordered();

    let mut records = Vec::new();

    for (key, element) in right_index.ordered() {
        if !left_index.contains(&key) {
            records.push(DiffRecord::added(element.clone()));
        }
    }

    for (key, element) in &left_ordered {
        if !right_index.contains(key) {
            records.push(DiffRecord::removed((*element).clone()));
        }
    }

    // Imports match on content, so a surviving import is unchanged by definition.
    if category == Category::Import {
        return records;
    }

    for (key, old) in &left_ordered {
        if let Some(new) = right_index.get(key) {
            let changes = compare_elements(category, old, new);
            if !changes.is_empty() {
                records.push(DiffRecord::modified(new.clone(), changes));
            }
        }
    }

    records
}

/// Fields that differ between two matched elements. Empty when they are
/// equivalent.
pub fn compare_elements(category: Category, old: &CodeElement, new: &CodeElement) -> FieldChanges {
    let mut changes = FieldChanges::new();
    if category == Category::Import {
        return changes;
    }

    if old.signature != new.signature {
        changes.insert(
            "signature".to_string(),
            FieldChange::values(&old.signature, &new.signature),
        );
    }
    if old.complexity != new.complexity {
        changes.insert(
            "complexity".to_string(),
            FieldChange::numeric(old.complexity, new.complexity),
        );
    }
    if old.line_count != new.line_count {
        changes.insert(
            "line_count".to_string(),
            FieldChange::numeric(old.line_count, new.line_count),
        );
    }
    if old.line != new.line {
        changes.insert("line".to_string(), FieldChange::numeric(old.line, new.line));
    }

    if category == Category::Class {
        if old.bases != new.bases {
            changes.insert("bases".to_string(), FieldChange::values(&old.bases, &new.bases));
        }
        if let Some(methods) = compare_methods(old, new) {
            changes.insert("methods".to_string(), methods);
        }
    }

    changes
}

/// Method-name set change: counts plus the names on only one side.
fn compare_methods(old: &CodeElement, new: &CodeElement) -> Option<FieldChange> {
    let old_names: BTreeSet<&str> = old.methods.iter().map(|m| m.name.as_str()).collect();
    let new_names: BTreeSet<&str> = new.methods.iter().map(|m| m.name.as_str()).collect();
    if old_names == new_names {
        return None;
    }

    let mut change = FieldChange::numeric(
        Some(old.methods.len() as u32),
        Some(new.methods.len() as u32),
    );
    change.added = first_seen(&new.methods, |name| !old_names.contains(name));
    change.removed = first_seen(&old.methods, |name| !new_names.contains(name));
    Some(change)
}

fn first_seen(methods: &[CodeElement], keep: impl Fn(&str) -> bool) -> Vec<String> {
    let mut seen = BTreeSet::new();
    methods
        .iter()
        .map(|m| m.name.as_str())
        .filter(|name| keep(name) && seen.insert(*name))
        .map(str::to_string)
        .collect()
}
