//! Error types for configuration operations

use std::fmt;
use thiserror::Error;

/// A single problem found while resolving provider settings
///
/// Each issue is tied to the provider attribute it concerns so callers can
/// surface it next to the offending configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsIssue {
    /// Provider attribute the issue refers to (e.g. `account_id`)
    pub attribute: &'static str,
    /// Short, human readable summary
    pub summary: String,
    /// Longer explanation with remediation hints
    pub detail: String,
}

impl fmt::Display for SettingsIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.summary, self.attribute)
    }
}

/// Errors that can occur during configuration operations
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config from {path}: {source}")]
    LoadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("Invalid provider settings: {}", join_issues(.0))]
    InvalidSettings(Vec<SettingsIssue>),

    #[error("Failed to determine config directory")]
    ConfigDirError,
}

fn join_issues(issues: &[SettingsIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
