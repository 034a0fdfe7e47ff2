//! Deployment settings read from the environment.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Environment variable naming the project.
pub const PROJECT_VAR: &str = "CIRRUS_PROJECT";
/// Environment variable naming the stack.
pub const STACK_VAR: &str = "CIRRUS_STACK";
/// Environment variable enabling preview mode.
pub const DRY_RUN_VAR: &str = "CIRRUS_DRY_RUN";
/// Environment variable bounding concurrent registrations.
pub const PARALLEL_VAR: &str = "CIRRUS_PARALLEL";

const DEFAULT_PARALLEL: usize = 16;

/// Where and how a program's resources are registered.
///
/// Also deserializes from a settings document; absent flags take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentSettings {
    /// Project name.
    pub project: String,
    /// Stack name.
    pub stack: String,
    /// Whether this is a preview. Outputs the engine cannot compute yet come back unknown.
    #[serde(default)]
    pub dry_run: bool,
    /// Maximum number of registrations in flight.
    #[serde(default = "default_parallel")]
    pub parallel: usize,
}

fn default_parallel() -> usize {
    DEFAULT_PARALLEL
}

impl DeploymentSettings {
    /// Creates settings for a project and stack with default flags.
    #[must_use]
    pub fn new(project: impl Into<String>, stack: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            stack: stack.into(),
            dry_run: false,
            parallel: DEFAULT_PARALLEL,
        }
    }

    /// Sets the preview flag.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Sets the registration parallelism. Zero is raised to one.
    #[must_use]
    pub fn with_parallel(mut self, parallel: usize) -> Self {
        self.parallel = parallel.max(1);
        self
    }

    /// Reads settings from the environment, loading `.env` first if present.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingVar`] if the project or stack is not set
    /// - [`ConfigError::InvalidVar`] if a flag or count does not parse
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded environment file");
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let project = lookup(PROJECT_VAR).ok_or(ConfigError::MissingVar(PROJECT_VAR))?;
        let stack = lookup(STACK_VAR).ok_or(ConfigError::MissingVar(STACK_VAR))?;

        let dry_run = match lookup(DRY_RUN_VAR) {
            Some(value) => parse_flag(DRY_RUN_VAR, value)?,
            None => false,
        };
        let parallel = match lookup(PARALLEL_VAR) {
            Some(value) => match value.trim().parse::<usize>() {
                Ok(parallel) => parallel,
                Err(_) => {
                    return Err(ConfigError::InvalidVar {
                        name: PARALLEL_VAR,
                        value,
                    });
                }
            },
            None => DEFAULT_PARALLEL,
        };

        Ok(Self::new(project, stack)
            .with_dry_run(dry_run)
            .with_parallel(parallel))
    }
}

fn parse_flag(name: &'static str, value: String) -> Result<bool, ConfigError> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidVar { name, value }),
    }
}
