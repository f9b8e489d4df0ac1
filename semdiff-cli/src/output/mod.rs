//! Output formatting for semdiff results.
//!
//! Every renderable result implements [`Outputter`] and can be printed as a
//! colored table, pretty JSON, or one grep-friendly line per change.
//! Colors are dropped automatically when stdout is not a terminal.

use clap::ValueEnum;
use serde::Serialize;
use std::io::IsTerminal;
use std::str::FromStr;

mod grep;
mod json;
mod table;

pub use self::grep::GrepOutput;
pub use self::json::JsonOutput;
pub use self::table::{or_dash, TableOutput};

/// Output format for CLI results
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable sections and summary grid (default)
    #[default]
    Table,
    /// JSON format for machine consumption
    Json,
    /// One line per change: `<sigil> <category> <name> [<file>:<line>]`
    Grep,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "grep" => Ok(OutputFormat::Grep),
            _ => Err(format!("Unknown output format: '{}'", s)),
        }
    }
}

/// Configuration for output rendering
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// The output format to use
    pub format: OutputFormat,
    /// Disable colored output
    pub no_color: bool,
    /// Compact mode (minified JSON, borderless tables)
    pub compact: bool,
}

impl OutputConfig {
    /// Create a new OutputConfig with the specified format
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            no_color: false,
            compact: false,
        }
    }

    /// Create an OutputConfig with TTY detection and optional color override.
    ///
    /// `Some(true)` forces colors on, `Some(false)` forces them off, and
    /// `None` enables them only when stdout is a terminal.
    pub fn auto_detect_with_color_override(
        format: OutputFormat,
        color_override: Option<bool>,
    ) -> Self {
        let use_color = color_override.unwrap_or_else(|| std::io::stdout().is_terminal());
        Self {
            format,
            no_color: !use_color,
            compact: false,
        }
    }

    /// Check if colors should be used
    pub fn use_colors(&self) -> bool {
        !self.no_color
    }

    /// Builder: enable compact mode
    pub fn compact(mut self) -> Self {
        self.compact = true;
        self
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::auto_detect_with_color_override(OutputFormat::Table, None)
    }
}

/// Types that can be rendered in every supported format.
pub trait Outputter: Serialize {
    /// Render as sections and tables
    fn to_table(&self, config: &OutputConfig) -> String;

    /// Render as JSON
    fn to_json(&self, config: &OutputConfig) -> String {
        JsonOutput::format(self, config)
    }

    /// Render as grep-friendly lines
    fn to_grep(&self, config: &OutputConfig) -> String;

    /// Render using the format specified in config
    fn render(&self, config: &OutputConfig) -> String {
        match config.format {
            OutputFormat::Table => self.to_table(config),
            OutputFormat::Json => self.to_json(config),
            OutputFormat::Grep => self.to_grep(config),
        }
    }

    /// Render and print to stdout
    fn output(&self, config: &OutputConfig) {
        let rendered = self.render(config);
        if rendered.ends_with('\n') {
            print!("{}", rendered);
        } else {
            println!("{}", rendered);
        }
    }
}
