//! Read-only view of which services differ from what is installed.

use serde::Serialize;

use stagehand_core::{Deployment, RemotePath, ServiceName};
use stagehand_remote::RemoteExecutor;
use stagehand_renderer::{Renderer, SecretsProvider};

use crate::deployer::staged_fingerprint;
use crate::error::{DeployError, RemoteStage};
use crate::fingerprint::{needs_update, remote_fingerprint, Fingerprint};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceState {
    pub service: ServiceName,
    pub installed_path: RemotePath,
    pub local: Fingerprint,
    /// `None` when nothing is installed.
    pub remote: Option<Fingerprint>,
    pub needs_update: bool,
}

/// Render and fingerprint every service, then compare with the target.
/// Stages files locally but changes nothing remotely.
pub fn inspect_all(
    deployment: &Deployment,
    secrets: &dyn SecretsProvider,
    executor: &dyn RemoteExecutor,
) -> Result<Vec<ServiceState>, DeployError> {
    let renderer = Renderer::new(deployment, secrets);
    let mut states = Vec::with_capacity(deployment.services().len());
    for service in deployment.services() {
        let artifact = renderer
            .render(service)
            .map_err(|source| DeployError::Template {
                service: service.name.clone(),
                source,
            })?;
        let local = staged_fingerprint(service, &artifact.path)?;
        let installed_path = deployment.installed_path(service);
        let remote = remote_fingerprint(executor, &installed_path).map_err(|source| {
            DeployError::RemoteUnavailable {
                service: service.name.clone(),
                stage: RemoteStage::Fingerprint,
                source,
            }
        })?;
        tracing::debug!(service = %service.name, local = local.short(), "inspected");
        states.push(ServiceState {
            service: service.name.clone(),
            needs_update: needs_update(&local, remote.as_ref()),
            installed_path,
            local,
            remote,
        });
    }
    Ok(states)
}
