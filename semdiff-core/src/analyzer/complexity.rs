//! Cyclomatic complexity calculation.
//!
//! McCabe complexity by counting decision points in the syntax tree. Each
//! language lists the node kinds that branch control flow.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use tree_sitter::Node;

/// Decision point node types by language (tree-sitter node names).
static DECISION_POINTS: Lazy<HashMap<&str, HashSet<&str>>> = Lazy::new(|| {
    let mut m = HashMap::new();

    m.insert(
        "python",
        HashSet::from([
            "if_statement",
            "elif_clause",
            "for_statement",
            "while_statement",
            "except_clause",
            "with_statement",
            "assert_statement",
            "boolean_operator",
            "conditional_expression",
            "case_clause",
            "for_in_clause",
            "if_clause",
        ]),
    );

    m.insert(
        "rust",
        HashSet::from([
            "if_expression",
            "for_expression",
            "while_expression",
            "loop_expression",
            "match_arm",
            "try_expression",
            "binary_expression", // only && and ||
        ]),
    );

    m
});

static DECISION_OPERATORS: Lazy<HashSet<&str>> = Lazy::new(|| HashSet::from(["&&", "||"]));

/// Complexity of the subtree rooted at `node`. Base complexity is 1.
pub fn calculate_for_node(node: &Node, source: &str, language: &str) -> u32 {
    let Some(decision_types) = DECISION_POINTS.get(language) else {
        return 1;
    };

    fn is_decision_operator(node: &Node, source: &str) -> bool {
        node.child_by_field_name("operator")
            .map(|op| super::node_text(&op, source))
            .is_some_and(|text| DECISION_OPERATORS.contains(text))
    }

    fn traverse(node: &Node, source: &str, decision_types: &HashSet<&str>, complexity: &mut u32) {
        if decision_types.contains(node.kind())
            && (node.kind() != "binary_expression" || is_decision_operator(node, source))
        {
            *complexity += 1;
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            traverse(&child, source, decision_types, complexity);
        }
    }

    let mut complexity = 1u32;
    traverse(node, source, decision_types, &mut complexity);
    complexity
}
