//! The [`ResourceMonitor`] trait: the runtime's link to the deployment engine.
//!
//! Bindings never talk to a monitor directly. The [`Deployment`](crate::deployment::Deployment)
//! resolves inputs, builds the requests below and settles the resource's
//! outputs from the responses.

use crate::error::MonitorError;
use crate::options::ResourceOptions;
use crate::property::PropertyMap;
use crate::urn::Urn;
use async_trait::async_trait;

/// A request to create or update a resource.
#[derive(Debug, Clone)]
pub struct RegisterResourceRequest {
    /// Type token, e.g. `example::OtherResource`.
    pub type_token: String,
    /// Logical name.
    pub name: String,
    /// URN of the parent resource.
    pub parent: Option<Urn>,
    /// Whether the resource is managed by a provider (as opposed to a component).
    pub custom: bool,
    /// Whether the resource's lifecycle is delegated to a provider process.
    pub remote: bool,
    /// Resolved input properties.
    pub properties: PropertyMap,
    /// URNs the resource depends on.
    pub dependencies: Vec<Urn>,
    /// Options, as stamped by the binding.
    pub options: ResourceOptions,
}

/// A request to read an existing object into the deployment.
#[derive(Debug, Clone)]
pub struct ReadResourceRequest {
    /// Type token.
    pub type_token: String,
    /// Logical name.
    pub name: String,
    /// Provider id of the existing object.
    pub id: String,
    /// URN of the parent resource.
    pub parent: Option<Urn>,
    /// Known state of the object.
    pub properties: PropertyMap,
    /// Options, as stamped by the binding.
    pub options: ResourceOptions,
}

/// The engine's answer to a registration, read or lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterResourceResponse {
    /// The resource's URN.
    pub urn: Urn,
    /// Provider-assigned id, for custom resources.
    pub id: Option<String>,
    /// Output properties, keyed by wire name.
    pub outputs: PropertyMap,
}

/// Connection to the deployment engine.
///
/// Implementations forward requests to the engine (over RPC in a real
/// deployment, in memory in tests).
#[async_trait]
pub trait ResourceMonitor: Send + Sync + 'static {
    /// Registers a resource and returns its URN, id and outputs.
    async fn register_resource(
        &self,
        request: RegisterResourceRequest,
    ) -> Result<RegisterResourceResponse, MonitorError>;

    /// Reads an existing object by provider id.
    async fn read_resource(
        &self,
        request: ReadResourceRequest,
    ) -> Result<RegisterResourceResponse, MonitorError>;

    /// Looks up a resource that is already part of the deployment.
    async fn get_resource(&self, urn: &Urn) -> Result<RegisterResourceResponse, MonitorError>;
}
