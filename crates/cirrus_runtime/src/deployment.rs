//! The deployment context: the runtime registration call and everything it needs.
//!
//! A [`Deployment`] is a cheap, clonable handle. Registering a resource
//! returns a [`RegisteredResource`] immediately; the actual request runs on a
//! tokio task that waits for pending inputs, talks to the
//! [`ResourceMonitor`] and then settles the resource's outputs.
//!
//! # Example
//!
//! ```ignore
//! let deployment = Deployment::new(DeploymentSettings::new("proj", "dev"), monitor);
//! let registered = deployment.register_resource(
//!     "example::OtherResource",
//!     "my-other",
//!     PropertyMap::new(),
//!     ResourceOptions::default(),
//!     false,
//!     true,
//! );
//! let urn = registered.urn().value().await?;
//! ```

use crate::error::{OutputError, ResourceError};
use crate::input::Input;
use crate::monitor::{
    ReadResourceRequest, RegisterResourceRequest, RegisterResourceResponse, ResourceMonitor,
};
use crate::options::ResourceOptions;
use crate::output::{Output, OutputResolver};
use crate::property::{FromProperty, PropertyMap, PropertyValue, ResourceReference};
use crate::resource::{ResourceHandle, ResourceModule};
use crate::urn::{Urn, package_of};
use cirrus_config::DeploymentSettings;
use core::any::type_name;
use core::future::Future;
use hashbrown::HashMap;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Handle to the deployment a program's resources are registered into.
#[derive(Clone)]
pub struct Deployment {
    inner: Arc<Inner>,
}

struct Inner {
    settings: DeploymentSettings,
    monitor: Arc<dyn ResourceMonitor>,
    modules: RwLock<HashMap<String, Arc<dyn ResourceModule>>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    permits: Arc<Semaphore>,
}

impl core::fmt::Debug for Deployment {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Deployment")
            .field("project", &self.inner.settings.project)
            .field("stack", &self.inner.settings.stack)
            .field("dry_run", &self.inner.settings.dry_run)
            .finish_non_exhaustive()
    }
}

impl Deployment {
    /// Creates a deployment that registers resources through `monitor`.
    #[must_use]
    pub fn new(settings: DeploymentSettings, monitor: Arc<dyn ResourceMonitor>) -> Self {
        let permits = Arc::new(Semaphore::new(settings.parallel.max(1)));
        Self {
            inner: Arc::new(Inner {
                settings,
                monitor,
                modules: RwLock::new(HashMap::new()),
                tasks: Mutex::new(Vec::new()),
                permits,
            }),
        }
    }

    /// Project name.
    #[must_use]
    pub fn project(&self) -> &str {
        &self.inner.settings.project
    }

    /// Stack name.
    #[must_use]
    pub fn stack(&self) -> &str {
        &self.inner.settings.stack
    }

    /// Whether this deployment is a preview.
    #[must_use]
    pub fn is_dry_run(&self) -> bool {
        self.inner.settings.dry_run
    }

    /// Settings the deployment was created with.
    #[must_use]
    pub fn settings(&self) -> &DeploymentSettings {
        &self.inner.settings
    }

    /// Registers a resource with the engine.
    ///
    /// Returns immediately. Pending values in `properties` are awaited on a
    /// background task before the request is sent. If `options.urn` is set the
    /// existing resource is looked up instead of registered.
    ///
    /// Outputs of the returned handle stay pending until the engine answers,
    /// and fail if the request fails. Requires a tokio runtime; without one the
    /// outputs fail with [`OutputError::Abandoned`].
    #[must_use]
    pub fn register_resource(
        &self,
        type_token: &str,
        name: &str,
        properties: PropertyMap,
        options: ResourceOptions,
        custom: bool,
        remote: bool,
    ) -> RegisteredResource {
        if let Some(urn) = options.urn.clone() {
            return self.get_resource(urn, custom);
        }

        let (registered, resolvers) = RegisteredResource::pending(self.clone(), custom);
        let monitor = Arc::clone(&self.inner.monitor);
        let permits = Arc::clone(&self.inner.permits);
        tracing::debug!(type_token, name, custom, remote, "registering resource");
        let type_token = type_token.to_string();
        let name = name.to_string();
        self.spawn(resolvers, async move {
            // Inputs must settle before a permit is taken: holding one while
            // waiting on another registration can deadlock.
            let properties = properties.resolve().await?;
            let request = RegisterResourceRequest {
                type_token,
                name,
                parent: options.parent.as_ref().map(|parent| parent.urn.clone()),
                custom,
                remote,
                properties,
                dependencies: options.dependency_urns(),
                options,
            };
            let _permit = permits.acquire_owned().await;
            monitor.register_resource(request).await.map_err(failure)
        });
        registered
    }

    /// Reads an existing object into the deployment by provider id.
    #[must_use]
    pub fn read_resource(
        &self,
        type_token: &str,
        name: &str,
        id: Input<String>,
        properties: Option<PropertyMap>,
        options: ResourceOptions,
    ) -> RegisteredResource {
        let (registered, resolvers) = RegisteredResource::pending(self.clone(), true);
        let monitor = Arc::clone(&self.inner.monitor);
        let permits = Arc::clone(&self.inner.permits);
        let type_token = type_token.to_string();
        let name = name.to_string();

        tracing::debug!(type_token = %type_token, name = %name, "reading existing resource");
        self.spawn(resolvers, async move {
            let id = id.into_output().value().await?;
            let properties = properties.unwrap_or_default().resolve().await?;
            let request = ReadResourceRequest {
                type_token,
                name,
                id,
                parent: options.parent.as_ref().map(|parent| parent.urn.clone()),
                properties,
                options,
            };
            let _permit = permits.acquire_owned().await;
            monitor.read_resource(request).await.map_err(failure)
        });
        registered
    }

    /// Looks up a resource that is already part of the deployment.
    #[must_use]
    pub fn get_resource(&self, urn: Urn, custom: bool) -> RegisteredResource {
        let (registered, resolvers) = RegisteredResource::pending(self.clone(), custom);
        let monitor = Arc::clone(&self.inner.monitor);
        let permits = Arc::clone(&self.inner.permits);
        tracing::debug!(%urn, "looking up existing resource");
        self.spawn(resolvers, async move {
            let _permit = permits.acquire_owned().await;
            monitor.get_resource(&urn).await.map_err(failure)
        });
        registered
    }

    /// Registers a package's resource module.
    ///
    /// # Panics
    ///
    /// Panics if a module for the same package is already registered.
    pub fn register_module(&self, module: impl ResourceModule) {
        let package = module.package();
        let mut modules = self.inner.modules.write();
        assert!(
            !modules.contains_key(package),
            "Resource module for package '{package}' already registered"
        );
        tracing::debug!(package, version = module.version(), "registered resource module");
        modules.insert(package.to_string(), Arc::new(module));
    }

    /// Registers `module` unless its package already has one.
    pub fn ensure_module(&self, module: impl ResourceModule) {
        let package = module.package();
        let mut modules = self.inner.modules.write();
        if !modules.contains_key(package) {
            tracing::debug!(package, version = module.version(), "registered resource module");
            modules.insert(package.to_string(), Arc::new(module));
        }
    }

    /// Returns whether a module is registered for `package`.
    #[must_use]
    pub fn has_module(&self, package: &str) -> bool {
        self.inner.modules.read().contains_key(package)
    }

    /// Rebuilds a typed handle for a resource reference.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::UnknownModule`] if no module serves the reference's package
    /// - [`ResourceError::TypeMismatch`] if the module builds a different type than `R`
    pub fn construct<R: ResourceHandle>(
        &self,
        reference: &ResourceReference,
    ) -> Result<R, ResourceError> {
        let package = package_of(reference.type_token());
        let module = self
            .inner
            .modules
            .read()
            .get(package)
            .cloned()
            .ok_or_else(|| ResourceError::UnknownModule(package.to_string()))?;

        module
            .construct(self, reference)?
            .downcast::<R>()
            .map(|handle| *handle)
            .map_err(|_| {
                ResourceError::type_mismatch(format!(
                    "resource '{}' cannot be represented as {}",
                    reference.urn,
                    type_name::<R>()
                ))
            })
    }

    /// Waits until every registration started so far has finished.
    pub async fn wait_for_registrations(&self) {
        loop {
            let tasks = core::mem::take(&mut *self.inner.tasks.lock());
            if tasks.is_empty() {
                return;
            }
            for result in futures::future::join_all(tasks).await {
                if let Err(err) = result {
                    tracing::error!(error = %err, "registration task did not complete");
                }
            }
        }
    }

    fn spawn<F>(&self, resolvers: Resolvers, work: F)
    where
        F: Future<Output = Result<RegisterResourceResponse, OutputError>> + Send + 'static,
    {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::error!("no tokio runtime is running; registration abandoned");
            return;
        };

        let dry_run = self.is_dry_run();
        let task = runtime.spawn(async move {
            match work.await {
                Ok(response) => resolvers.resolve(response, dry_run),
                Err(err) => {
                    tracing::warn!(error = %err, "resource registration failed");
                    resolvers.reject(&err);
                }
            }
        });
        self.inner.tasks.lock().push(task);
    }
}

fn failure(err: impl core::fmt::Display) -> OutputError {
    OutputError::failed(err.to_string())
}

/// The engine-side state of a registered resource.
#[derive(Debug, Clone)]
pub struct RegisteredResource {
    urn: Output<Urn>,
    id: Output<Option<String>>,
    outputs: Output<PropertyMap>,
    reference: Output<ResourceReference>,
    deployment: Deployment,
}

struct Resolvers {
    urn: OutputResolver<Urn>,
    id: OutputResolver<Option<String>>,
    outputs: OutputResolver<PropertyMap>,
    reference: OutputResolver<ResourceReference>,
    custom: bool,
}

impl Resolvers {
    fn resolve(self, response: RegisterResourceResponse, dry_run: bool) {
        self.reference.resolve(ResourceReference {
            urn: response.urn.clone(),
            id: response.id.clone(),
        });
        self.urn.resolve(response.urn);
        match response.id {
            None if self.custom && dry_run => self.id.resolve_unknown(),
            id => self.id.resolve(id),
        }
        self.outputs.resolve(response.outputs);
    }

    fn reject(self, err: &OutputError) {
        self.urn.reject(err.clone());
        self.id.reject(err.clone());
        self.outputs.reject(err.clone());
        self.reference.reject(err.clone());
    }
}

impl RegisteredResource {
    fn pending(deployment: Deployment, custom: bool) -> (Self, Resolvers) {
        let (urn, urn_resolver) = Output::pending();
        let (id, id_resolver) = Output::pending();
        let (outputs, outputs_resolver) = Output::pending();
        let (reference, reference_resolver) = Output::pending();
        (
            Self {
                urn,
                id,
                outputs,
                reference,
                deployment,
            },
            Resolvers {
                urn: urn_resolver,
                id: id_resolver,
                outputs: outputs_resolver,
                reference: reference_resolver,
                custom,
            },
        )
    }

    /// The resource's URN.
    #[must_use]
    pub fn urn(&self) -> &Output<Urn> {
        &self.urn
    }

    /// The provider-assigned id. Always `None` for components.
    #[must_use]
    pub fn id(&self) -> &Output<Option<String>> {
        &self.id
    }

    /// Every output property, keyed by wire name.
    #[must_use]
    pub fn outputs(&self) -> &Output<PropertyMap> {
        &self.outputs
    }

    /// A reference to the resource, settled together with its URN and id.
    #[must_use]
    pub fn reference(&self) -> &Output<ResourceReference> {
        &self.reference
    }

    /// The deployment the resource belongs to.
    #[must_use]
    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    /// Derives a typed output for the property `wire_name`.
    ///
    /// A property the engine did not return decodes from [`PropertyValue::Null`].
    #[must_use]
    pub fn output<T>(&self, wire_name: &str) -> Output<T>
    where
        T: FromProperty + Send + Sync + 'static,
    {
        let deployment = self.deployment.clone();
        let wire_name = wire_name.to_string();
        self.outputs.try_map(move |mut outputs| {
            let value = outputs.remove(&wire_name).unwrap_or(PropertyValue::Null);
            T::from_property(value, &deployment)
        })
    }
}
