//! Typed resource bindings and the deployment runtime they register through.
//!
//! ```ignore
//! use cirrus::prelude::*;
//!
//! let deployment = Deployment::new(DeploymentSettings::from_env()?, monitor);
//! let resource = Resource::new(&deployment, "res", ResourceArgs::new().with_bar("x"), None)?;
//! let other = OtherResource::new(
//!     &deployment,
//!     "other",
//!     OtherResourceArgs::new().with_foo(resource),
//!     None,
//! )?;
//! deployment.wait_for_registrations().await;
//! ```

pub use cirrus_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use cirrus_internal::prelude::*;
}
