//! Loader configuration (loader.toml)
//!
//! ```toml
//! archives = ["lib/core.zip", "lib/extra.zip"]
//! entry_suffix = ".class"
//! separator = "."
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ConfigError;

/// Suffix appended to module entry keys unless configured otherwise.
pub const DEFAULT_ENTRY_SUFFIX: &str = ".class";

/// Module-name segment separator unless configured otherwise.
pub const DEFAULT_SEPARATOR: char = '.';

/// Configuration for an [`ArchiveLoader`](crate::ArchiveLoader).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Candidate archive sources, in lookup priority order
    #[serde(default)]
    pub archives: Vec<PathBuf>,

    /// Suffix appended to module entry keys (default: ".class")
    #[serde(default = "default_entry_suffix")]
    pub entry_suffix: String,

    /// Separator between module name segments (default: '.')
    #[serde(default = "default_separator")]
    pub separator: char,
}

fn default_entry_suffix() -> String {
    DEFAULT_ENTRY_SUFFIX.to_string()
}

fn default_separator() -> char {
    DEFAULT_SEPARATOR
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            archives: Vec::new(),
            entry_suffix: default_entry_suffix(),
            separator: default_separator(),
        }
    }
}

impl LoaderConfig {
    /// Load a configuration file.
    ///
    /// Relative archive paths are resolved against the directory that
    /// contains the file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: LoaderConfig = content.parse()?;

        if let Some(base) = path.parent() {
            for archive in &mut config.archives {
                if archive.is_relative() {
                    *archive = base.join(&*archive);
                }
            }
        }

        Ok(config)
    }

    /// Check that the configuration describes a usable key mapping.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.entry_suffix.starts_with('.') {
            return Err(ConfigError::Invalid(format!(
                "entry_suffix must start with '.', got {:?}",
                self.entry_suffix
            )));
        }
        if self.entry_suffix.contains('/') {
            return Err(ConfigError::Invalid(format!(
                "entry_suffix must not contain '/', got {:?}",
                self.entry_suffix
            )));
        }
        if self.separator == '/' {
            return Err(ConfigError::Invalid(
                "separator must not be '/'".to_string(),
            ));
        }
        Ok(())
    }

    /// Archive entry key for a fully-qualified module name.
    ///
    /// `pkg.sub.Foo` becomes `pkg/sub/Foo.class` with the default settings.
    pub fn entry_key(&self, name: &str) -> String {
        let mut key: String = name
            .chars()
            .map(|c| if c == self.separator { '/' } else { c })
            .collect();
        key.push_str(&self.entry_suffix);
        key
    }
}

impl FromStr for LoaderConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: LoaderConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}
