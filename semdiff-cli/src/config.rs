//! semdiff configuration loading from `.semdiffrc.toml`.
//!
//! Configuration is optional. Without a file every setting takes its
//! built-in default, and command-line flags override whatever the file says.
//!
//! # Example Configuration
//!
//! ```toml
//! [resolver]
//! skip_dirs = ["vendor", "generated"]
//! respect_gitignore = true
//! git = "/usr/local/bin/git"
//!
//! [output]
//! format = "json"
//! color = false
//! ```

use serde::Deserialize;
use std::path::Path;

use semdiff_core::ResolveOptions;

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = ".semdiffrc.toml";

/// Root configuration structure loaded from `.semdiffrc.toml`.
#[derive(Debug, Deserialize, Default)]
pub struct SemdiffConfig {
    /// How resources are located and walked.
    #[serde(default)]
    pub resolver: ResolverSettings,

    /// Output formatting preferences.
    #[serde(default)]
    pub output: OutputSettings,
}

/// Resolver settings, merged onto [`ResolveOptions`] defaults.
#[derive(Debug, Deserialize, Default)]
pub struct ResolverSettings {
    /// Extra directory names to skip during directory aggregation.
    ///
    /// Added to the built-in list (`.git`, `node_modules`, `__pycache__`,
    /// `target`, ...), never replacing it.
    #[serde(default)]
    pub skip_dirs: Vec<String>,

    /// Honor `.gitignore` and `.ignore` files while walking directories.
    #[serde(default)]
    pub respect_gitignore: Option<bool>,

    /// Version-control binary used for `git://` locators.
    #[serde(default)]
    pub git: Option<String>,
}

/// Output formatting preferences.
#[derive(Debug, Deserialize, Default)]
pub struct OutputSettings {
    /// Default output format: `table`, `json` or `grep`.
    #[serde(default)]
    pub format: Option<String>,

    /// Whether to use colored output. Unset means auto-detect.
    #[serde(default)]
    pub color: Option<bool>,
}

impl SemdiffConfig {
    /// Load configuration from `.semdiffrc.toml` in the given directory.
    ///
    /// Missing files yield defaults. Unreadable or malformed files are
    /// logged as warnings and also yield defaults.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE);
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse {}: {}", CONFIG_FILE, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", CONFIG_FILE, e);
                }
            }
        }
        Self::default()
    }

    /// Resolver options with this file's settings applied.
    pub fn resolve_options(&self) -> ResolveOptions {
        let mut options =
            ResolveOptions::default().with_extra_skip_dirs(self.resolver.skip_dirs.iter().cloned());
        if let Some(respect) = self.resolver.respect_gitignore {
            options.respect_gitignore = respect;
        }
        if let Some(git) = &self.resolver.git {
            options.git_binary = git.clone();
        }
        options
    }

    /// Get the default output format, if configured.
    pub fn default_format(&self) -> Option<&str> {
        self.output.format.as_deref()
    }

    /// Returns the configured value, or `None` to use auto-detection.
    pub fn use_color(&self) -> Option<bool> {
        self.output.color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SemdiffConfig::default();
        assert!(config.resolver.skip_dirs.is_empty());
        assert!(config.output.format.is_none());

        let options = config.resolve_options();
        assert!(!options.respect_gitignore);
        assert_eq!(options.git_binary, "git");
        assert!(options.skip_dirs.contains(&"node_modules".to_string()));
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[resolver]
skip_dirs = ["vendor", "generated/"]
respect_gitignore = true
git = "/opt/git/bin/git"

[output]
format = "json"
color = false
"#;
        let config: SemdiffConfig = toml::from_str(toml_content).unwrap();

        assert_eq!(config.default_format(), Some("json"));
        assert_eq!(config.use_color(), Some(false));

        let options = config.resolve_options();
        assert!(options.respect_gitignore);
        assert_eq!(options.git_binary, "/opt/git/bin/git");
        assert!(options.skip_dirs.contains(&"vendor".to_string()));
        assert!(options.skip_dirs.contains(&"generated".to_string()));
        assert!(options.skip_dirs.contains(&".git".to_string()));
    }

    #[test]
    fn test_skip_dirs_not_duplicated() {
        let config: SemdiffConfig = toml::from_str("[resolver]\nskip_dirs = [\".git\"]\n").unwrap();
        let options = config.resolve_options();
        assert_eq!(options.skip_dirs.iter().filter(|d| *d == ".git").count(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = SemdiffConfig::load(dir.path());
        assert!(config.default_format().is_none());
    }

    #[test]
    fn test_load_malformed_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[output\nformat = ").unwrap();
        let config = SemdiffConfig::load(dir.path());
        assert!(config.default_format().is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[output]\nformat = \"grep\"\n").unwrap();
        let config = SemdiffConfig::load(dir.path());
        assert_eq!(config.default_format(), Some("grep"));
    }
}
