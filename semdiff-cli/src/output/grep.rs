//! Line-oriented output for piping into grep, awk and friends.
//!
//! Each change is one line: `<sigil> <category> <name>[ <file>:<line>]`.

use semdiff_core::{Category, CodeElement};

/// Grep output formatter
pub struct GrepOutput;

impl GrepOutput {
    /// One change line.
    ///
    /// `fallback_file` names the resource when the element itself carries no
    /// file tag, as in single-file diffs.
    pub fn line(
        sigil: char,
        category: Category,
        element: &CodeElement,
        fallback_file: Option<&str>,
    ) -> String {
        let mut line = format!(
            "{} {} {}",
            sigil,
            category.as_str(),
            element.identity(category)
        );
        let file = element.file.as_deref().or(fallback_file);
        if let Some(location) = Self::location(file, element.line) {
            line.push(' ');
            line.push_str(&location);
        }
        line
    }

    /// `file:line`, `file`, or nothing.
    pub fn location(file: Option<&str>, line: Option<u32>) -> Option<String> {
        match (file, line) {
            (Some(file), Some(line)) => Some(format!("{}:{}", file, line)),
            (Some(file), None) => Some(file.to_string()),
            (None, _) => None,
        }
    }

    /// Join lines, with a trailing newline when there is anything to print.
    pub fn join(lines: Vec<String>) -> String {
        if lines.is_empty() {
            String::new()
        } else {
            let mut out = lines.join("\n");
            out.push('\n');
            out
        }
    }
}
