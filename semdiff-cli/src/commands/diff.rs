//! Diff command - structural diff between two resources
//!
//! Parses a compound `left:right[/element]` locator, resolves both sides
//! concurrently and reports added, removed and modified functions, classes
//! and imports. With an element name only that element is compared.

use std::sync::Arc;
use std::time::Instant;

use colored::Colorize;
use serde::Serialize;
use serde_json::Value;

use semdiff_core::differ::{ChangeKind, DiffRecord, FieldChange, FieldChanges};
use semdiff_core::{
    diff_element, diff_structures, Category, CodeElement, CompoundLocator, DiffReport, ElementDiff,
    Registry, ResolveOptions, Resolver, ResourceLocator, SideInfo, Structure, StructureKind,
};

use crate::output::{GrepOutput, OutputConfig, Outputter, TableOutput};

/// Single-element comparison with both locators attached.
#[derive(Debug, Serialize)]
pub struct ElementReport {
    pub left: String,
    pub right: String,
    #[serde(flatten)]
    pub result: ElementDiff,
}

/// Run the diff command.
///
/// `element` overrides any element suffix carried by the locator itself.
pub async fn run(
    locator: &str,
    element: Option<String>,
    registry: Arc<Registry>,
    options: ResolveOptions,
    config: &OutputConfig,
) -> anyhow::Result<()> {
    let start = Instant::now();
    let compound = CompoundLocator::parse(locator)?;
    let element = element.or(compound.element.clone());

    let (left, right) = tokio::try_join!(
        resolve_side(registry.clone(), options.clone(), compound.left.clone()),
        resolve_side(registry, options, compound.right.clone())
    )?;

    let left_uri = compound.left.to_string();
    let right_uri = compound.right.to_string();

    match element {
        Some(name) => {
            let report = ElementReport {
                result: diff_element(&left, &right, &name),
                left: left_uri,
                right: right_uri,
            };
            tracing::debug!(element = %name, outcome = report.result.kind(), "element diff");
            report.output(config);
        }
        None => {
            let result = diff_structures(&left, &right);
            let report = DiffReport::new(
                SideInfo::new(left_uri, &left),
                SideInfo::new(right_uri, &right),
                result,
            );
            report.output(config);
        }
    }

    tracing::debug!("diff finished in {}ms", start.elapsed().as_millis());
    Ok(())
}

/// Resolve one locator on the blocking pool.
pub async fn resolve_side(
    registry: Arc<Registry>,
    options: ResolveOptions,
    locator: ResourceLocator,
) -> anyhow::Result<Structure> {
    let structure = tokio::task::spawn_blocking(move || {
        Resolver::new(&registry, options).resolve(&locator)
    })
    .await??;
    Ok(structure)
}

impl Outputter for DiffReport {
    fn to_table(&self, config: &OutputConfig) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{} {} -> {}\n",
            "DIFF:".cyan().bold(),
            self.left.uri.yellow(),
            self.right.uri.green()
        ));
        output.push_str(&format!(
            "{}{} vs {}{}\n",
            self.left.kind.as_str(),
            describe_count(&self.left),
            self.right.kind.as_str(),
            describe_count(&self.right),
        ));
        for side in [&self.left, &self.right] {
            if let Some(note) = side.skipped_note() {
                let note = format!("{} ({})", note, side.uri);
                output.push_str(&format!("{} {}\n", "note:".yellow(), note.dimmed()));
            }
        }
        output.push('\n');

        if self.summary.is_empty() {
            output.push_str(&format!("{}\n", "No changes".dimmed()));
            return output;
        }

        for change in [ChangeKind::Added, ChangeKind::Modified, ChangeKind::Removed] {
            let records: Vec<(Category, &DiffRecord)> = Category::ALL
                .iter()
                .flat_map(|&category| {
                    self.diff
                        .records(category)
                        .iter()
                        .filter(move |r| r.change == change)
                        .map(move |r| (category, r))
                })
                .collect();
            if records.is_empty() {
                continue;
            }

            let heading = match change {
                ChangeKind::Added => "ADDED".green().bold(),
                ChangeKind::Modified => "MODIFIED".yellow().bold(),
                ChangeKind::Removed => "REMOVED".red().bold(),
            };
            output.push_str(&format!("{} ({}):\n", heading, records.len()));

            for (category, record) in records {
                let name = record.element.identity(category);
                let name = match change {
                    ChangeKind::Added => name.green(),
                    ChangeKind::Modified => name.yellow(),
                    ChangeKind::Removed => name.red(),
                };
                output.push_str(&format!(
                    "  {} {} [{}]",
                    change.sigil(),
                    name,
                    category.as_str()
                ));
                if let Some(location) =
                    GrepOutput::location(record.element.file.as_deref(), record.element.line)
                {
                    output.push_str(&format!(" {}", location.dimmed()));
                }
                output.push('\n');
                for line in describe_changes(&record.changes) {
                    output.push_str(&format!("      {}\n", line));
                }
            }
            output.push('\n');
        }

        output.push_str(&TableOutput::summary(&self.summary, config));
        output.push('\n');
        output
    }

    fn to_grep(&self, _config: &OutputConfig) -> String {
        let mut lines = Vec::new();
        for category in Category::ALL {
            for record in self.diff.records(category) {
                let fallback = match record.change {
                    ChangeKind::Removed => side_file(&self.left),
                    _ => side_file(&self.right),
                };
                lines.push(GrepOutput::line(
                    record.change.sigil(),
                    category,
                    &record.element,
                    fallback,
                ));
            }
        }
        GrepOutput::join(lines)
    }
}

impl Outputter for ElementReport {
    fn to_table(&self, _config: &OutputConfig) -> String {
        let mut output = format!(
            "{} {} in {} -> {}\n",
            "ELEMENT:".cyan().bold(),
            self.result.name().bold(),
            self.left.yellow(),
            self.right.green()
        );

        match &self.result {
            ElementDiff::NotFound { .. } => {
                output.push_str(&format!("{}\n", "not found on either side".dimmed()));
            }
            ElementDiff::Added { element, .. } => {
                output.push_str(&format!("{} {}\n", "ADDED".green().bold(), describe_element(element)));
            }
            ElementDiff::Removed { element, .. } => {
                output.push_str(&format!("{} {}\n", "REMOVED".red().bold(), describe_element(element)));
            }
            ElementDiff::Unchanged { element, .. } => {
                output.push_str(&format!("{} {}\n", "UNCHANGED".dimmed(), describe_element(element)));
            }
            ElementDiff::Modified { old, new, changes, .. } => {
                output.push_str(&format!("{}\n", "MODIFIED".yellow().bold()));
                output.push_str(&format!("  {} {}\n", "-".red(), describe_element(old)));
                output.push_str(&format!("  {} {}\n", "+".green(), describe_element(new)));
                for line in describe_changes(changes) {
                    output.push_str(&format!("      {}\n", line));
                }
            }
        }
        output
    }

    fn to_grep(&self, _config: &OutputConfig) -> String {
        let (sigil, element, file) = match &self.result {
            ElementDiff::NotFound { .. } => return String::new(),
            ElementDiff::Added { element, .. } => ('+', element, self.right.as_str()),
            ElementDiff::Removed { element, .. } => ('-', element, self.left.as_str()),
            ElementDiff::Unchanged { element, .. } => ('=', element, self.right.as_str()),
            ElementDiff::Modified { new, .. } => ('~', new, self.right.as_str()),
        };
        let category = if element.bases.is_empty() && element.methods.is_empty() {
            Category::Function
        } else {
            Category::Class
        };
        GrepOutput::join(vec![GrepOutput::line(sigil, category, element, Some(file))])
    }
}

fn describe_count(side: &SideInfo) -> String {
    match side.file_count {
        Some(1) => " (1 file)".to_string(),
        Some(n) => format!(" ({} files)", n),
        None => String::new(),
    }
}

/// The file a side's untagged elements belong to. Directory elements carry
/// their own tags.
fn side_file(side: &SideInfo) -> Option<&str> {
    match side.kind {
        StructureKind::Directory => None,
        _ => Some(side.uri.as_str()),
    }
}

fn describe_element(element: &CodeElement) -> String {
    let mut parts = vec![element
        .signature
        .clone()
        .unwrap_or_else(|| element.name.clone())];
    if let Some(location) = GrepOutput::location(element.file.as_deref(), element.line) {
        parts.push(location);
    } else if let Some(line) = element.line {
        parts.push(format!("line {}", line));
    }
    if let Some(complexity) = element.complexity {
        parts.push(format!("complexity {}", complexity));
    }
    parts.join("  ")
}

fn describe_changes(changes: &FieldChanges) -> Vec<String> {
    changes
        .iter()
        .map(|(field, change)| describe_change(field, change))
        .collect()
}

fn describe_change(field: &str, change: &FieldChange) -> String {
    let mut line = format!(
        "{}: {} -> {}",
        field.dimmed(),
        display_value(&change.old),
        display_value(&change.new)
    );
    if let Some(delta) = change.delta {
        line.push_str(&format!(" ({:+})", delta));
    }
    if !change.added.is_empty() {
        line.push_str(&format!(" added: {}", change.added.join(", ").green()));
    }
    if !change.removed.is_empty() {
        line.push_str(&format!(" removed: {}", change.removed.join(", ").red()));
    }
    line
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
