//! Python analyzer using tree-sitter.

use std::path::Path;

use tree_sitter::Node;

use super::{
    collapse_whitespace, complexity, field_text, has_child_kind, line_span, node_text, parse_file,
    start_line,
};
use crate::error::Result;
use crate::registry::Analyzer;
use crate::types::{CodeElement, Structure};

/// Top-level functions, classes with their methods, and import statements.
pub struct PythonAnalyzer;

impl Analyzer for PythonAnalyzer {
    fn name(&self) -> &'static str {
        "python"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["py", "pyi", "pyw"]
    }

    fn interpreters(&self) -> &'static [&'static str] {
        &["python"]
    }

    fn analyze(&self, path: &Path) -> Result<Structure> {
        let (source, tree) = parse_file(path, &tree_sitter_python::LANGUAGE.into(), "python")?;
        let mut structure = Structure::file(path.display().to_string());
        structure.language = Some("python".to_string());

        let root = tree.root_node();
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            match child.kind() {
                "import_statement" | "import_from_statement" | "future_import_statement" => {
                    structure.imports.push(CodeElement::import(
                        collapse_whitespace(node_text(&child, &source)),
                        start_line(&child),
                    ));
                }
                "function_definition" => {
                    structure.functions.push(extract_function(&child, &child, &source));
                }
                "class_definition" => {
                    structure.classes.push(extract_class(&child, &child, &source));
                }
                "decorated_definition" => {
                    let Some(definition) = child.child_by_field_name("definition") else {
                        continue;
                    };
                    match definition.kind() {
                        "function_definition" => structure
                            .functions
                            .push(extract_function(&definition, &child, &source)),
                        "class_definition" => structure
                            .classes
                            .push(extract_class(&definition, &child, &source)),
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        Ok(structure)
    }
}

/// `span` is the decorated wrapper when present, so line numbers include
/// decorators.
fn extract_function(node: &Node, span: &Node, source: &str) -> CodeElement {
    let name = field_text(node, "name", source).unwrap_or_default().to_string();
    let params = field_text(node, "parameters", source).unwrap_or("()");
    let returns = field_text(node, "return_type", source)
        .map(|t| format!(" -> {}", t))
        .unwrap_or_default();
    let prefix = if has_child_kind(node, "async") {
        "async "
    } else {
        ""
    };

    let complexity = node
        .child_by_field_name("body")
        .map(|body| complexity::calculate_for_node(&body, source, "python"))
        .unwrap_or(1);

    CodeElement {
        signature: Some(collapse_whitespace(&format!(
            "{}{}{}{}",
            prefix, name, params, returns
        ))),
        name,
        line: Some(start_line(span)),
        line_count: Some(line_span(span)),
        complexity: Some(complexity),
        ..Default::default()
    }
}

fn extract_class(node: &Node, span: &Node, source: &str) -> CodeElement {
    let mut class = CodeElement {
        name: field_text(node, "name", source).unwrap_or_default().to_string(),
        line: Some(start_line(span)),
        line_count: Some(line_span(span)),
        ..Default::default()
    };

    if let Some(superclasses) = node.child_by_field_name("superclasses") {
        let mut cursor = superclasses.walk();
        for arg in superclasses.named_children(&mut cursor) {
            if matches!(arg.kind(), "identifier" | "attribute" | "subscript") {
                class.bases.push(node_text(&arg, source).to_string());
            }
        }
    }

    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for stmt in body.children(&mut cursor) {
            match stmt.kind() {
                "function_definition" => {
                    class.methods.push(extract_function(&stmt, &stmt, source));
                }
                "decorated_definition" => {
                    if let Some(def) = stmt
                        .child_by_field_name("definition")
                        .filter(|d| d.kind() == "function_definition")
                    {
                        class.methods.push(extract_function(&def, &stmt, source));
                    }
                }
                _ => {}
            }
        }
    }

    class
}
