//! Resource bindings for the `example` provider package.
//!
//! - [`OtherResource`] (`example::OtherResource`): a component with an
//!   optional `foo` relationship to a [`Resource`]
//! - [`Resource`] (`example::Resource`): a provider-managed resource with a
//!   string `bar` property
//!
//! Both accept a typed constructor and a dynamic one that understands the
//! bundled and flattened calling conventions.

pub mod module;
pub mod other_resource;
pub mod resource;
pub mod tables;
pub mod utilities;

pub use module::{ExampleModule, register};
pub use other_resource::{OtherResource, OtherResourceArgs};
pub use resource::{Resource, ResourceArgs};
