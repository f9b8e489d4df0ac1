//! Show command - print the structure one locator resolves to
//!
//! Useful for checking what the differ will see, and with `--format json`
//! for producing snapshots that `json://` locators can load back.

use std::sync::Arc;

use colored::Colorize;

use semdiff_core::{Category, CodeElement, Registry, ResolveOptions, ResourceLocator, Structure};

use super::diff::resolve_side;
use crate::output::{or_dash, GrepOutput, OutputConfig, Outputter, TableOutput};

/// Run the show command.
pub async fn run(
    locator: &str,
    registry: Arc<Registry>,
    options: ResolveOptions,
    config: &OutputConfig,
) -> anyhow::Result<()> {
    let locator = ResourceLocator::parse(locator);
    let structure = resolve_side(registry, options, locator).await?;
    structure.output(config);
    Ok(())
}

impl Outputter for Structure {
    fn to_table(&self, config: &OutputConfig) -> String {
        let mut output = format!(
            "{} {} [{}]\n",
            "STRUCTURE:".cyan().bold(),
            self.path.as_deref().unwrap_or("-").yellow(),
            self.kind.as_str()
        );

        let mut facts = Vec::new();
        if let Some(language) = &self.language {
            facts.push(format!("language {}", language));
        }
        if let Some(count) = self.file_count {
            facts.push(format!("{} files", count));
        }
        if self.skipped_files > 0 {
            facts.push(format!("{} skipped", self.skipped_files));
        }
        facts.push(format!(
            "{} functions, {} classes, {} imports",
            self.functions.len(),
            self.classes.len(),
            self.imports.len()
        ));
        output.push_str(&format!("{}\n\n", facts.join(", ").dimmed()));

        let tagged = self.is_file_tagged();
        let mut headers = vec!["kind", "name", "line", "lines", "complexity"];
        if tagged {
            headers.push("file");
        }

        let mut rows = Vec::new();
        for category in Category::ALL {
            for element in self.elements(category) {
                rows.push(row(category.as_str(), element.identity(category), element, tagged));
                for method in &element.methods {
                    let name = format!("{}.{}", element.name, method.name);
                    let mut method_row = row("method", &name, method, tagged);
                    if tagged && method.file.is_none() {
                        if let Some(last) = method_row.last_mut() {
                            *last = or_dash(element.file.as_deref());
                        }
                    }
                    rows.push(method_row);
                }
            }
        }

        output.push_str(&TableOutput::grid(&headers, rows, &[2, 3, 4], config));
        output.push('\n');
        output
    }

    fn to_grep(&self, _config: &OutputConfig) -> String {
        let fallback = self.path.as_deref();
        let lines = Category::ALL
            .iter()
            .flat_map(|&category| {
                self.elements(category).iter().map(move |element| {
                    let mut line = format!("{} {}", category.as_str(), element.identity(category));
                    let file = element.file.as_deref().or(fallback);
                    if let Some(location) = GrepOutput::location(file, element.line) {
                        line.push(' ');
                        line.push_str(&location);
                    }
                    line
                })
            })
            .collect();
        GrepOutput::join(lines)
    }
}

fn row(kind: &str, name: &str, element: &CodeElement, tagged: bool) -> Vec<String> {
    let mut row = vec![
        kind.to_string(),
        name.to_string(),
        or_dash(element.line),
        or_dash(element.line_count),
        or_dash(element.complexity),
    ];
    if tagged {
        row.push(or_dash(element.file.as_deref()));
    }
    row
}
