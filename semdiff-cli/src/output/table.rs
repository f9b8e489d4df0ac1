//! Grid formatting using the `tabled` crate.

use super::OutputConfig;
use semdiff_core::{Category, DiffSummary};
use tabled::{
    builder::Builder,
    settings::{object::Columns, style::Style, Alignment, Modify},
};

/// Table output formatter
pub struct TableOutput;

impl TableOutput {
    /// Build a grid from a header row and data rows.
    ///
    /// Columns listed in `numeric` are right-aligned.
    pub fn grid(
        headers: &[&str],
        rows: Vec<Vec<String>>,
        numeric: &[usize],
        config: &OutputConfig,
    ) -> String {
        if rows.is_empty() {
            return "(no elements)".to_string();
        }

        let mut builder = Builder::default();
        builder.push_record(headers.iter().copied());
        for row in rows {
            builder.push_record(row);
        }

        let mut table = builder.build();
        if config.compact {
            table.with(Style::blank());
        } else {
            table.with(Style::rounded());
        }
        for &col in numeric {
            table.with(Modify::new(Columns::single(col)).with(Alignment::right()));
        }

        table.to_string()
    }

    /// Per-category added/removed/modified counts.
    pub fn summary(summary: &DiffSummary, config: &OutputConfig) -> String {
        let rows = Category::ALL
            .iter()
            .map(|&category| {
                let counts = summary.get(category);
                let modified = match category {
                    Category::Import => "-".to_string(),
                    _ => counts.modified.to_string(),
                };
                vec![
                    category.plural().to_string(),
                    counts.added.to_string(),
                    counts.removed.to_string(),
                    modified,
                ]
            })
            .collect();

        Self::grid(
            &["category", "added", "removed", "modified"],
            rows,
            &[1, 2, 3],
            config,
        )
    }
}

/// Display form of an optional number, `-` when absent.
pub fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}
