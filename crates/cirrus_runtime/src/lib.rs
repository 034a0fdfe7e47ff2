//! The runtime contract for cirrus resource bindings.
//!
//! `cirrus_runtime` provides everything a generated binding needs to turn a
//! constructor call into a registration with the deployment engine:
//!
//! - [`output`] - Deferred values settled after registration
//! - [`input`] - Inputs that are either plain values or outputs
//! - [`property`] - Wire-level property values and maps
//! - [`urn`] - Resource URNs and type tokens
//! - [`options`] - The resource options object
//! - [`dynamic`] - The flattened, dynamically-typed calling convention
//! - [`init`] - Constructor normalization shared by every binding
//! - [`monitor`] - The engine interface
//! - [`deployment`] - The registration call and resource module registry
//! - [`resource`] - Resource handles and modules
//! - [`translate`] - Property name translation
//! - [`logging`] - Subscriber setup
//!
//! # Architecture
//!
//! - **Runtime** (`cirrus_runtime`): the contract (this crate)
//! - **Configuration** (`cirrus_config`): deployment settings and stack files
//! - **Bindings** (`cirrus_example`, ...): one crate per provider package

/// The registration call and resource module registry.
pub mod deployment;

/// The flattened, dynamically-typed calling convention.
pub mod dynamic;

/// Error types.
pub mod error;

/// Constructor normalization shared by every binding.
pub mod init;

/// Inputs that are either plain values or outputs.
pub mod input;

/// Subscriber setup.
pub mod logging;

/// The engine interface.
pub mod monitor;

/// The resource options object.
pub mod options;

/// Deferred values.
pub mod output;

/// Wire-level property values and maps.
pub mod property;

/// Resource handles and modules.
pub mod resource;

/// In-memory monitor for tests.
#[cfg(feature = "test-utils")]
pub mod testing;

/// Property name translation.
pub mod translate;

/// Resource URNs and type tokens.
pub mod urn;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::deployment::{Deployment, RegisteredResource};
    pub use crate::dynamic::{CallShape, DynValue, DynamicArgs, resource_args_opts};
    pub use crate::error::{MonitorError, OutputError, ResourceError};
    pub use crate::init::{Construction, Deprecation, OptionsSource, Prepared, ResourceInit};
    pub use crate::input::Input;
    pub use crate::monitor::ResourceMonitor;
    pub use crate::options::ResourceOptions;
    pub use crate::output::{Output, OutputStatus};
    pub use crate::property::{
        FromProperty, IntoProperty, PropertyMap, PropertyValue, ResourceReference,
    };
    pub use crate::resource::{ResourceHandle, ResourceModule};
    pub use crate::translate::{PropertyTranslator, TranslationTable};
    pub use crate::urn::Urn;
    pub use cirrus_config::DeploymentSettings;
}
