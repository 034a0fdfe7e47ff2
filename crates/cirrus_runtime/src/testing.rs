//! In-memory [`ResourceMonitor`] for tests.
//!
//! [`RecordingMonitor`] accepts every request, records it, allocates URNs and
//! provider ids, and echoes the resolved inputs back as outputs. Individual
//! type tokens can be made to fail or to report extra outputs.
//!
//! ```ignore
//! let monitor = Arc::new(RecordingMonitor::new("proj", "dev"));
//! let deployment = monitor.deployment();
//! // ... construct resources ...
//! deployment.wait_for_registrations().await;
//! assert_eq!(monitor.registrations().len(), 1);
//! ```

use crate::deployment::Deployment;
use crate::error::MonitorError;
use crate::monitor::{
    ReadResourceRequest, RegisterResourceRequest, RegisterResourceResponse, ResourceMonitor,
};
use crate::property::PropertyMap;
use crate::urn::Urn;
use async_trait::async_trait;
use cirrus_config::DeploymentSettings;
use hashbrown::HashMap;
use parking_lot::Mutex;
use std::sync::Arc;

/// A monitor that records requests and answers them from memory.
#[derive(Debug, Default)]
pub struct RecordingMonitor {
    project: String,
    stack: String,
    registrations: Mutex<Vec<RegisterResourceRequest>>,
    reads: Mutex<Vec<ReadResourceRequest>>,
    state: Mutex<HashMap<Urn, RegisterResourceResponse>>,
    failures: Mutex<HashMap<String, MonitorError>>,
    extra_outputs: Mutex<HashMap<String, PropertyMap>>,
}

impl RecordingMonitor {
    /// Creates a monitor for the given project and stack.
    #[must_use]
    pub fn new(project: impl Into<String>, stack: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            stack: stack.into(),
            ..Self::default()
        }
    }

    /// Creates a deployment that registers through this monitor.
    #[must_use]
    pub fn deployment(self: &Arc<Self>) -> Deployment {
        self.deployment_with(DeploymentSettings::new(&self.project, &self.stack))
    }

    /// Creates a deployment with custom settings that registers through this monitor.
    #[must_use]
    pub fn deployment_with(self: &Arc<Self>, settings: DeploymentSettings) -> Deployment {
        Deployment::new(settings, Arc::clone(self) as Arc<dyn ResourceMonitor>)
    }

    /// Makes every request for `type_token` fail with `err`.
    pub fn fail_type(&self, type_token: impl Into<String>, err: MonitorError) {
        self.failures.lock().insert(type_token.into(), err);
    }

    /// Adds `outputs` to every response for `type_token`, on top of the echoed inputs.
    pub fn add_outputs(&self, type_token: impl Into<String>, outputs: PropertyMap) {
        self.extra_outputs.lock().insert(type_token.into(), outputs);
    }

    /// Seeds an existing resource that [`ResourceMonitor::get_resource`] can find.
    pub fn insert_existing(&self, response: RegisterResourceResponse) {
        self.state.lock().insert(response.urn.clone(), response);
    }

    /// Every registration request received, in arrival order.
    #[must_use]
    pub fn registrations(&self) -> Vec<RegisterResourceRequest> {
        self.registrations.lock().clone()
    }

    /// Every read request received, in arrival order.
    #[must_use]
    pub fn reads(&self) -> Vec<ReadResourceRequest> {
        self.reads.lock().clone()
    }

    /// The registration request for the resource named `name`, if any.
    #[must_use]
    pub fn registration(&self, name: &str) -> Option<RegisterResourceRequest> {
        self.registrations
            .lock()
            .iter()
            .find(|request| request.name == name)
            .cloned()
    }

    fn check(&self, type_token: &str) -> Result<(), MonitorError> {
        match self.failures.lock().get(type_token) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn respond(
        &self,
        type_token: &str,
        name: &str,
        parent: Option<&Urn>,
        id: Option<String>,
        inputs: PropertyMap,
    ) -> Result<RegisterResourceResponse, MonitorError> {
        let urn = Urn::new(
            &self.stack,
            &self.project,
            parent.map(Urn::qualified_type),
            type_token,
            name,
        )
        .map_err(|err| MonitorError::Rejected(err.to_string()))?;

        let mut outputs = inputs;
        if let Some(extra) = self.extra_outputs.lock().get(type_token) {
            for (key, value) in extra.iter() {
                outputs.insert(key, value.clone());
            }
        }

        let response = RegisterResourceResponse { urn, id, outputs };
        self.state
            .lock()
            .insert(response.urn.clone(), response.clone());
        Ok(response)
    }
}

#[async_trait]
impl ResourceMonitor for RecordingMonitor {
    async fn register_resource(
        &self,
        request: RegisterResourceRequest,
    ) -> Result<RegisterResourceResponse, MonitorError> {
        self.registrations.lock().push(request.clone());
        self.check(&request.type_token)?;

        let id = request.custom.then(|| nanoid::nanoid!());
        self.respond(
            &request.type_token,
            &request.name,
            request.parent.as_ref(),
            id,
            request.properties,
        )
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequest,
    ) -> Result<RegisterResourceResponse, MonitorError> {
        self.reads.lock().push(request.clone());
        self.check(&request.type_token)?;

        self.respond(
            &request.type_token,
            &request.name,
            request.parent.as_ref(),
            Some(request.id),
            request.properties,
        )
    }

    async fn get_resource(&self, urn: &Urn) -> Result<RegisterResourceResponse, MonitorError> {
        self.check(urn.type_token())?;
        self.state
            .lock()
            .get(urn)
            .cloned()
            .ok_or_else(|| MonitorError::NotFound(urn.to_string()))
    }
}
