//! Error types for cirrus configuration.

use thiserror::Error;

/// Errors from reading settings or editing a stack file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),

    /// An environment variable has a value that cannot be parsed.
    #[error("invalid value for {name}: '{value}'")]
    InvalidVar {
        /// Variable name.
        name: &'static str,
        /// The offending value.
        value: String,
    },

    /// The stack file is not valid YAML.
    #[error("failed to parse YAML file: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A segment of a key path does not name a nested mapping.
    #[error("config key not found: \"{0}\"")]
    KeyNotFound(String),
}
