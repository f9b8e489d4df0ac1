//! Built-in per-file analyzers.
//!
//! Each analyzer parses one file with its tree-sitter grammar and lowers the
//! syntax tree into the flat [`Structure`](crate::types::Structure) model.

use std::fs;
use std::path::Path;

use tree_sitter::{Language, Node, Parser, Tree};

use crate::error::{Result, SemdiffError};

pub mod complexity;
pub mod python;
pub mod rust_lang;

/// Read a file and parse it with `language`.
pub(crate) fn parse_file(path: &Path, language: &Language, name: &str) -> Result<(String, Tree)> {
    let shown = path.display().to_string();
    let bytes = fs::read(path)?;
    let source = String::from_utf8(bytes)
        .map_err(|e| SemdiffError::analysis(&shown, format!("not valid UTF-8: {}", e)))?;

    let mut parser = Parser::new();
    parser.set_language(language).map_err(|e| {
        SemdiffError::analysis(&shown, format!("failed to load {} grammar: {}", name, e))
    })?;

    let tree = parser.parse(&source, None).ok_or_else(|| {
        SemdiffError::analysis(&shown, format!("{} parser produced no tree", name))
    })?;

    if tree.root_node().has_error() {
        tracing::debug!(path = %shown, "syntax errors present, continuing with partial tree");
    }

    Ok((source, tree))
}

/// Get the text content of a node.
pub(crate) fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    let start = node.start_byte();
    let end = node.end_byte();
    if start < source.len() && end <= source.len() && start < end {
        &source[start..end]
    } else {
        ""
    }
}

/// Field child text, if the field is present.
pub(crate) fn field_text<'a>(node: &Node, field: &str, source: &'a str) -> Option<&'a str> {
    node.child_by_field_name(field).map(|n| node_text(&n, source))
}

/// Start line (1-indexed).
pub(crate) fn start_line(node: &Node) -> u32 {
    node.start_position().row as u32 + 1
}

/// Number of lines the node spans.
pub(crate) fn line_span(node: &Node) -> u32 {
    (node.end_position().row - node.start_position().row) as u32 + 1
}

/// Collapse runs of whitespace (including newlines) into single spaces.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True if `node` has a direct child of kind `kind`.
pub(crate) fn has_child_kind(node: &Node, kind: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == kind);
    found
}
