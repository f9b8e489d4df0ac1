//! Rust analyzer using tree-sitter.
//!
//! Structs, enums, unions and traits become classes. Methods from `impl`
//! blocks are attached to the type they implement, and the trait of a
//! `impl Trait for Type` block is recorded as one of the type's bases.

use std::collections::HashMap;
use std::path::Path;

use tree_sitter::Node;

use super::{
    collapse_whitespace, complexity, field_text, line_span, node_text, parse_file, start_line,
};
use crate::error::Result;
use crate::registry::Analyzer;
use crate::types::{CodeElement, Structure};

pub struct RustAnalyzer;

#[derive(Default)]
struct ImplBlock {
    traits: Vec<String>,
    methods: Vec<CodeElement>,
}

impl Analyzer for RustAnalyzer {
    fn name(&self) -> &'static str {
        "rust"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["rs"]
    }

    fn analyze(&self, path: &Path) -> Result<Structure> {
        let (source, tree) = parse_file(path, &tree_sitter_rust::LANGUAGE.into(), "rust")?;
        let mut structure = Structure::file(path.display().to_string());
        structure.language = Some("rust".to_string());

        // Keyed by type name, in first-seen order for stable output.
        let mut impls: HashMap<String, ImplBlock> = HashMap::new();
        let mut impl_order: Vec<String> = Vec::new();

        let root = tree.root_node();
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            match child.kind() {
                "use_declaration" | "extern_crate_declaration" => {
                    structure.imports.push(CodeElement::import(
                        collapse_whitespace(node_text(&child, &source)),
                        start_line(&child),
                    ));
                }
                "mod_item" if child.child_by_field_name("body").is_none() => {
                    structure.imports.push(CodeElement::import(
                        collapse_whitespace(node_text(&child, &source)),
                        start_line(&child),
                    ));
                }
                "function_item" => {
                    structure.functions.push(extract_function(&child, &source));
                }
                "struct_item" | "enum_item" | "union_item" => {
                    structure.classes.push(extract_type(&child, &source));
                }
                "trait_item" => {
                    structure.classes.push(extract_trait(&child, &source));
                }
                "impl_item" => {
                    let Some(type_name) = field_text(&child, "type", &source).map(strip_generics)
                    else {
                        continue;
                    };
                    if !impls.contains_key(&type_name) {
                        impl_order.push(type_name.clone());
                    }
                    let block = impls.entry(type_name).or_default();
                    if let Some(trait_name) = field_text(&child, "trait", &source) {
                        block.traits.push(strip_generics(trait_name));
                    }
                    block.methods.extend(extract_methods(&child, &source));
                }
                _ => {}
            }
        }

        for class in &mut structure.classes {
            if let Some(block) = impls.remove(&class.name) {
                attach_impl(class, block);
            }
        }

        // Impls for types declared elsewhere still carry methods worth diffing.
        for type_name in impl_order {
            if let Some(block) = impls.remove(&type_name) {
                if block.methods.is_empty() {
                    continue;
                }
                let mut class = CodeElement::named(type_name);
                attach_impl(&mut class, block);
                structure.classes.push(class);
            }
        }

        Ok(structure)
    }
}

fn attach_impl(class: &mut CodeElement, block: ImplBlock) {
    for trait_name in block.traits {
        if !class.bases.contains(&trait_name) {
            class.bases.push(trait_name);
        }
    }
    class.methods.extend(block.methods);
}

fn strip_generics(type_text: &str) -> String {
    type_text
        .split('<')
        .next()
        .unwrap_or(type_text)
        .trim()
        .to_string()
}

fn extract_function(node: &Node, source: &str) -> CodeElement {
    let name = field_text(node, "name", source).unwrap_or_default().to_string();
    let generics = field_text(node, "type_parameters", source).unwrap_or_default();
    let params = field_text(node, "parameters", source).unwrap_or("()");
    let returns = field_text(node, "return_type", source)
        .map(|t| format!(" -> {}", t))
        .unwrap_or_default();

    let mut modifiers = String::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "function_modifiers" {
            modifiers = format!("{} ", node_text(&child, source));
        }
    }

    let complexity = node
        .child_by_field_name("body")
        .map(|body| complexity::calculate_for_node(&body, source, "rust"))
        .unwrap_or(1);

    CodeElement {
        signature: Some(collapse_whitespace(&format!(
            "{}{}{}{}{}",
            modifiers, name, generics, params, returns
        ))),
        name,
        line: Some(start_line(node)),
        line_count: Some(line_span(node)),
        complexity: Some(complexity),
        ..Default::default()
    }
}

fn extract_type(node: &Node, source: &str) -> CodeElement {
    CodeElement {
        name: field_text(node, "name", source).unwrap_or_default().to_string(),
        line: Some(start_line(node)),
        line_count: Some(line_span(node)),
        ..Default::default()
    }
}

fn extract_trait(node: &Node, source: &str) -> CodeElement {
    let mut class = extract_type(node, source);

    if let Some(bounds) = node.child_by_field_name("bounds") {
        let mut cursor = bounds.walk();
        for bound in bounds.named_children(&mut cursor) {
            class.bases.push(strip_generics(node_text(&bound, source)));
        }
    }

    class.methods = extract_methods(node, source);
    class
}

/// Function items and signatures inside an impl or trait body.
fn extract_methods(node: &Node, source: &str) -> Vec<CodeElement> {
    let Some(body) = node.child_by_field_name("body") else {
        return Vec::new();
    };

    let mut methods = Vec::new();
    let mut cursor = body.walk();
    for item in body.children(&mut cursor) {
        if matches!(item.kind(), "function_item" | "function_signature_item") {
            methods.push(extract_function(&item, source));
        }
    }
    methods
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn analyze(source: &str) -> Structure {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.rs");
        fs::write(&path, source).unwrap();
        RustAnalyzer.analyze(&path).unwrap()
    }

    const SAMPLE: &str = r#"use std::collections::HashMap;
use std::fmt::{self, Display};

mod helpers;

pub trait Shape: Display + Clone {
    fn area(&self) -> f64;
}

pub struct Circle {
    radius: f64,
}

impl Circle {
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }
}

impl Shape for Circle {
    fn area(&self) -> f64 {
        if self.radius > 0.0 && self.radius < 1e9 {
            3.14 * self.radius * self.radius
        } else {
            0.0
        }
    }
}

impl Display for Circle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "circle")
    }
}

impl<K> Wrapper<K> for HashMap<K, f64> {
    fn wrap(self) {}
}

pub async fn load<T: Shape>(items: Vec<T>) -> usize {
    items.len()
}

#[cfg(test)]
mod tests {}
"#;

    #[test]
    fn test_imports() {
        let s = analyze(SAMPLE);
        let contents: Vec<_> = s.imports.iter().filter_map(|i| i.content.as_deref()).collect();
        assert_eq!(
            contents,
            vec![
                "use std::collections::HashMap;",
                "use std::fmt::{self, Display};",
                "mod helpers;"
            ]
        );
    }

    #[test]
    fn test_functions() {
        let s = analyze(SAMPLE);
        assert_eq!(s.functions.len(), 1);
        let load = &s.functions[0];
        assert_eq!(load.name, "load");
        assert_eq!(
            load.signature.as_deref(),
            Some("async load<T: Shape>(items: Vec<T>) -> usize")
        );
        assert_eq!(load.complexity, Some(1));
    }

    #[test]
    fn test_trait_bounds_become_bases() {
        let s = analyze(SAMPLE);
        let shape = s.classes.iter().find(|c| c.name == "Shape").unwrap();
        assert_eq!(shape.bases, vec!["Display", "Clone"]);
        assert_eq!(shape.method_names(), vec!["area"]);
    }

    #[test]
    fn test_impl_methods_attach_to_type() {
        let s = analyze(SAMPLE);
        let circle = s.classes.iter().find(|c| c.name == "Circle").unwrap();
        assert_eq!(circle.method_names(), vec!["new", "area", "fmt"]);
        assert_eq!(circle.bases, vec!["Shape", "Display"]);

        let area = circle.find_method("area").unwrap();
        assert_eq!(area.complexity, Some(3));
    }

    #[test]
    fn test_impl_for_foreign_type() {
        let s = analyze(SAMPLE);
        let foreign = s.classes.iter().find(|c| c.name == "HashMap").unwrap();
        assert_eq!(foreign.bases, vec!["Wrapper"]);
        assert_eq!(foreign.method_names(), vec!["wrap"]);
    }
}
