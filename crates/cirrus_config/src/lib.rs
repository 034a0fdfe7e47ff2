//! Configuration for cirrus deployments.
//!
//! - [`DeploymentSettings`]: project, stack and flags read from the
//!   environment (and `.env`)
//! - [`StackConfigFile`]: in-place editing of a stack's YAML config file

pub mod error;
pub mod settings;
pub mod stack_file;

pub use error::ConfigError;
pub use settings::DeploymentSettings;
pub use stack_file::{ConfigValue, StackConfigFile};
