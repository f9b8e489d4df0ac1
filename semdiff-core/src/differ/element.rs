//! Single-element comparison.

use serde::{Deserialize, Serialize};

use crate::differ::changes::FieldChanges;
use crate::differ::comparator::compare_elements;
use crate::types::{Category, CodeElement, Structure};

/// Outcome of looking up one name on both sides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementDiff {
    NotFound {
        name: String,
    },
    Added {
        name: String,
        element: CodeElement,
    },
    Removed {
        name: String,
        element: CodeElement,
    },
    Unchanged {
        name: String,
        element: CodeElement,
    },
    Modified {
        name: String,
        old: CodeElement,
        new: CodeElement,
        changes: FieldChanges,
    },
}

impl ElementDiff {
    pub fn name(&self) -> &str {
        match self {
            ElementDiff::NotFound { name }
            | ElementDiff::Added { name, .. }
            | ElementDiff::Removed { name, .. }
            | ElementDiff::Unchanged { name, .. }
            | ElementDiff::Modified { name, .. } => name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ElementDiff::NotFound { .. } => "not_found",
            ElementDiff::Added { .. } => "added",
            ElementDiff::Removed { .. } => "removed",
            ElementDiff::Unchanged { .. } => "unchanged",
            ElementDiff::Modified { .. } => "modified",
        }
    }
}

/// First element called `name`: functions, then classes, then methods of
/// each class in order. The lookup ignores scope.
pub fn find_element<'a>(structure: &'a Structure, name: &str) -> Option<(Category, &'a CodeElement)> {
    if let Some(function) = structure.functions.iter().find(|f| f.name == name) {
        return Some((Category::Function, function));
    }
    if let Some(class) = structure.classes.iter().find(|c| c.name == name) {
        return Some((Category::Class, class));
    }
    structure
        .classes
        .iter()
        .find_map(|c| c.find_method(name))
        .map(|method| (Category::Function, method))
}

/// Compare the element called `name` in two structures.
pub fn diff_element(left: &Structure, right: &Structure, name: &str) -> ElementDiff {
    let name_owned = name.to_string();
    match (find_element(left, name), find_element(right, name)) {
        (None, None) => ElementDiff::NotFound { name: name_owned },
        (None, Some((_, new))) => ElementDiff::Added {
            name: name_owned,
            element: new.clone(),
        },
        (Some((_, old)), None) => ElementDiff::Removed {
            name: name_owned,
            element: old.clone(),
        },
        (Some((left_category, old)), Some((right_category, new))) => {
            // A function on one side and a class on the other still gets the
            // class fields compared.
            let category = if left_category == Category::Class || right_category == Category::Class {
                Category::Class
            } else {
                Category::Function
            };
            let changes = compare_elements(category, old, new);
            if changes.is_empty() {
                ElementDiff::Unchanged {
                    name: name_owned,
                    element: new.clone(),
                }
            } else {
                ElementDiff::Modified {
                    name: name_owned,
                    old: old.clone(),
                    new: new.clone(),
                    changes,
                }
            }
        }
    }
}
