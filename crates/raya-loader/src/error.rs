//! Loader error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by module resolution.
///
/// Failures below this level (unusable archive sources, unreadable entries,
/// close failures) are recovered locally and never reach the caller.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// No archive and no parent loader produced the module.
    ///
    /// `cause` is set when an archive did provide bytes for the module but
    /// the host refused to materialize them.
    #[error("module {name} not found")]
    NotFound {
        /// Fully-qualified module name that was requested
        name: String,
        /// Host rejection that made the local lookup terminal
        #[source]
        cause: Option<DefineError>,
    },
}

impl LoaderError {
    /// Plain not-found error for `name`.
    pub fn not_found(name: impl Into<String>) -> Self {
        LoaderError::NotFound {
            name: name.into(),
            cause: None,
        }
    }

    /// Name of the module this error refers to.
    pub fn module_name(&self) -> &str {
        match self {
            LoaderError::NotFound { name, .. } => name,
        }
    }
}

/// Errors returned by a host when turning raw bytes into a module.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefineError {
    /// The bytes are not a valid module image
    #[error("malformed module: {0}")]
    Malformed(String),

    /// A module with the same name is already registered
    #[error("module already defined: {0}")]
    Duplicate(String),

    /// The host refused the module for another reason
    #[error("module rejected: {0}")]
    Rejected(String),
}

/// Errors that can occur while reading loader configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read loader config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse loader config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid loader config: {0}")]
    Invalid(String),
}
