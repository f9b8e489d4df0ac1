//! Data models for analyzed code structure.
//!
//! A [`Structure`] is the language-agnostic summary of one resource: its
//! functions, classes and imports as flat, line-numbered [`CodeElement`]s.
//! Analyzers produce them, adapters load them, and the differ compares them.

use serde::{Deserialize, Serialize};

/// The element categories every structure carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Function,
    Class,
    Import,
}

impl Category {
    /// All categories in rendering order.
    pub const ALL: [Category; 3] = [Category::Function, Category::Class, Category::Import];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Function => "function",
            Category::Class => "class",
            Category::Import => "import",
        }
    }

    /// Plural key used in serialized structures and reports.
    pub fn plural(&self) -> &'static str {
        match self {
            Category::Function => "functions",
            Category::Class => "classes",
            Category::Import => "imports",
        }
    }
}

/// What kind of resource a structure was built from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureKind {
    #[default]
    File,
    Directory,
    #[serde(other)]
    Other,
}

impl StructureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StructureKind::File => "file",
            StructureKind::Directory => "directory",
            StructureKind::Other => "other",
        }
    }
}

/// One named unit of code structure: a function, class, method or import.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeElement {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Starting line (1-indexed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_count: Option<u32>,

    /// Parameter list and return annotation as written in source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    /// McCabe cyclomatic complexity (minimum 1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<u32>,

    /// Superclass / supertrait names, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bases: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<CodeElement>,

    /// Path relative to the aggregation root, set only for elements that
    /// came from a directory or historical-directory resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Raw import statement text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl CodeElement {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn import(content: impl Into<String>, line: u32) -> Self {
        let content = content.into();
        Self {
            name: content.clone(),
            line: Some(line),
            content: Some(content),
            ..Default::default()
        }
    }

    /// Identity used for matching in its category: `content` for imports,
    /// `name` for everything else. Empty keys are never matched.
    pub fn identity(&self, category: Category) -> &str {
        match category {
            Category::Import => self.content.as_deref().unwrap_or(&self.name),
            _ => &self.name,
        }
    }

    pub fn method_names(&self) -> Vec<&str> {
        self.methods.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn find_method(&self, name: &str) -> Option<&CodeElement> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// Normalized analysis result for one resource.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    #[serde(rename = "type", default)]
    pub kind: StructureKind,

    /// The resource this structure describes, as given by the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Language of the analyzer that produced a single-file structure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Files analyzed successfully (aggregated structures only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_count: Option<usize>,

    /// Files whose analysis failed and were left out of the aggregate.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub skipped_files: usize,

    #[serde(default)]
    pub functions: Vec<CodeElement>,

    #[serde(default)]
    pub classes: Vec<CodeElement>,

    #[serde(default)]
    pub imports: Vec<CodeElement>,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl Structure {
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            kind: StructureKind::File,
            path: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            kind: StructureKind::Directory,
            path: Some(path.into()),
            file_count: Some(0),
            ..Default::default()
        }
    }

    pub fn elements(&self, category: Category) -> &[CodeElement] {
        match category {
            Category::Function => &self.functions,
            Category::Class => &self.classes,
            Category::Import => &self.imports,
        }
    }

    pub fn elements_mut(&mut self, category: Category) -> &mut Vec<CodeElement> {
        match category {
            Category::Function => &mut self.functions,
            Category::Class => &mut self.classes,
            Category::Import => &mut self.imports,
        }
    }

    pub fn element_count(&self) -> usize {
        self.functions.len() + self.classes.len() + self.imports.len()
    }

    /// True when any element carries a `file` tag.
    pub fn is_file_tagged(&self) -> bool {
        Category::ALL
            .iter()
            .flat_map(|c| self.elements(*c))
            .any(|e| e.file.is_some())
    }

    /// Fold one file's structure into this aggregate, tagging every element
    /// with `rel_path`.
    pub fn absorb(&mut self, file: Structure, rel_path: &str) {
        let mut file = file;
        for category in Category::ALL {
            let incoming = std::mem::take(file.elements_mut(category));
            self.elements_mut(category)
                .extend(incoming.into_iter().map(|mut element| {
                    element.file = Some(rel_path.to_string());
                    element
                }));
        }
        *self.file_count.get_or_insert(0) += 1;
    }
}
