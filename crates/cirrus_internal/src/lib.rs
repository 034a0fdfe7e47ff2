//! # Cirrus Internal Library
//!
//! Re-exports the cirrus crates for convenience.

/// Runtime contract: outputs, options, registration and translation.
pub use cirrus_runtime;

/// Deployment settings and stack file editing.
pub use cirrus_config;

/// Bindings for the `example` provider package.
pub use cirrus_example;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use cirrus_config::{ConfigValue, StackConfigFile};
    pub use cirrus_example::{OtherResource, OtherResourceArgs, Resource, ResourceArgs};
    pub use cirrus_runtime::prelude::*;
}
