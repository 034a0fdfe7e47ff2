//! The `example` package's resource module.
//!
//! When a resource reference comes back as an output property (such as
//! `OtherResource.foo`), the deployment asks this module to rebuild the typed
//! wrapper for it.

use crate::other_resource::{OTHER_RESOURCE_TYPE, OtherResource};
use crate::resource::{RESOURCE_TYPE, Resource};
use crate::utilities;
use cirrus_runtime::deployment::Deployment;
use cirrus_runtime::error::ResourceError;
use cirrus_runtime::property::ResourceReference;
use cirrus_runtime::resource::{ResourceHandle, ResourceModule};

/// Package name shared by every type token in this crate.
pub const PACKAGE: &str = "example";

/// Rebuilds `example` resources from references.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExampleModule;

impl ResourceModule for ExampleModule {
    fn package(&self) -> &'static str {
        PACKAGE
    }

    fn version(&self) -> &'static str {
        utilities::version()
    }

    fn construct(
        &self,
        deployment: &Deployment,
        reference: &ResourceReference,
    ) -> Result<Box<dyn ResourceHandle>, ResourceError> {
        match reference.type_token() {
            RESOURCE_TYPE => Ok(Box::new(Resource::rehydrate(deployment, reference))),
            OTHER_RESOURCE_TYPE => Ok(Box::new(OtherResource::rehydrate(deployment, reference))),
            other => Err(ResourceError::UnknownModule(other.to_string())),
        }
    }
}

/// Installs [`ExampleModule`] into `deployment` if it is not there yet.
pub fn register(deployment: &Deployment) {
    deployment.ensure_module(ExampleModule);
}
