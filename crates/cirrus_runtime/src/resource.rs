//! Resource handles and resource modules.
//!
//! Every generated binding implements [`ResourceHandle`]. When a resource
//! reference comes back from the engine as an output property, the
//! [`Deployment`] looks up the [`ResourceModule`] registered for the
//! reference's package and asks it to rebuild a typed handle.

use crate::deployment::Deployment;
use crate::error::ResourceError;
use crate::output::Output;
use crate::property::ResourceReference;
use crate::urn::Urn;
use downcast_rs::{DowncastSync, impl_downcast};

/// A registered resource as seen by user code.
pub trait ResourceHandle: DowncastSync + core::fmt::Debug {
    /// The resource's URN, settled once the engine has registered it.
    fn urn(&self) -> &Output<Urn>;
}

impl_downcast!(sync ResourceHandle);

/// Rebuilds typed handles for one package's resource types.
pub trait ResourceModule: Send + Sync + 'static {
    /// Package name this module serves (the first segment of its type tokens).
    fn package(&self) -> &'static str;

    /// Package version.
    fn version(&self) -> &'static str;

    /// Builds a handle for the referenced resource.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnknownModule`] if the reference's type token
    /// is not served by this module.
    fn construct(
        &self,
        deployment: &Deployment,
        reference: &ResourceReference,
    ) -> Result<Box<dyn ResourceHandle>, ResourceError>;
}
