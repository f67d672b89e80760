//! Fingerprint-gated deploy of every declared service.
//!
//! Per service, in declaration order:
//!
//! 1. Render the template into the staging directory.
//! 2. Fingerprint the staged bytes.
//! 3. Fingerprint the installed file on the target (missing counts as stale).
//! 4. Equal → `Unchanged`, nothing else happens.
//! 5. Otherwise upload with privileges and run the post-install action.
//!
//! A render or remote failure stops the run. Services already processed stay
//! as they are and come back in [`DeployAborted::completed`].

use std::path::Path;

use stagehand_core::{Deployment, ServiceDescriptor};
use stagehand_remote::RemoteExecutor;
use stagehand_renderer::{RenderError, Renderer, SecretsProvider};

use crate::actions;
use crate::error::{DeployAborted, DeployError, RemoteStage};
use crate::fingerprint::{local_fingerprint, needs_update, remote_fingerprint, Fingerprint};
use crate::report::{DeployReport, ServiceOutcome, ServiceStatus};

pub struct Deployer<'a> {
    deployment: &'a Deployment,
    renderer: Renderer<'a>,
    executor: &'a dyn RemoteExecutor,
    dry_run: bool,
}

impl<'a> Deployer<'a> {
    pub fn new(
        deployment: &'a Deployment,
        secrets: &'a dyn SecretsProvider,
        executor: &'a dyn RemoteExecutor,
    ) -> Self {
        Deployer {
            deployment,
            renderer: Renderer::new(deployment, secrets),
            executor,
            dry_run: false,
        }
    }

    /// Compare fingerprints only; never upload or run actions.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn deploy_all(&self) -> Result<DeployReport, DeployAborted> {
        let mut report = DeployReport::start(&self.deployment.target_name, self.dry_run);
        tracing::info!(
            target_name = %self.deployment.target_name,
            host = %self.executor.describe(),
            services = self.deployment.services().len(),
            dry_run = self.dry_run,
            "deploy started"
        );

        for service in self.deployment.services() {
            match self.deploy_service(service) {
                Ok(outcome) => report.services.push(outcome),
                Err(error) => {
                    tracing::error!(service = %service.name, error = %error, "deploy aborted");
                    return Err(DeployAborted {
                        completed: report.finish(),
                        error,
                    });
                }
            }
        }

        let report = report.finish();
        tracing::info!(
            updated = report.count(ServiceStatus::Updated),
            unchanged = report.count(ServiceStatus::Unchanged),
            would_update = report.count(ServiceStatus::WouldUpdate),
            "deploy finished"
        );
        Ok(report)
    }

    fn deploy_service(&self, service: &ServiceDescriptor) -> Result<ServiceOutcome, DeployError> {
        let artifact = self
            .renderer
            .render(service)
            .map_err(|source| DeployError::Template {
                service: service.name.clone(),
                source,
            })?;
        drop(artifact.content);
        let local = staged_fingerprint(service, &artifact.path)?;

        let installed = self.deployment.installed_path(service);
        let remote = remote_fingerprint(self.executor, &installed).map_err(|source| {
            DeployError::RemoteUnavailable {
                service: service.name.clone(),
                stage: RemoteStage::Fingerprint,
                source,
            }
        })?;

        if !needs_update(&local, remote.as_ref()) {
            tracing::info!(service = %service.name, fingerprint = local.short(), "unchanged");
            return Ok(ServiceOutcome::new(service.name.clone(), ServiceStatus::Unchanged));
        }

        if self.dry_run {
            tracing::info!(
                service = %service.name,
                local = local.short(),
                remote = remote.as_ref().map(Fingerprint::short).unwrap_or("-"),
                "[dry-run] would update"
            );
            return Ok(ServiceOutcome::new(service.name.clone(), ServiceStatus::WouldUpdate));
        }

        self.executor
            .upload(&artifact.path, &installed, true)
            .map_err(|source| DeployError::RemoteUnavailable {
                service: service.name.clone(),
                stage: RemoteStage::Upload,
                source,
            })?;
        tracing::info!(service = %service.name, path = %installed, "uploaded");

        let mut outcome = ServiceOutcome::new(service.name.clone(), ServiceStatus::Updated);
        if let Err(err) = actions::run_post_install(self.deployment, service, self.executor) {
            tracing::warn!(service = %service.name, command = %err.command, reason = %err.reason, "post-install action failed");
            outcome.post_action_error = Some(err);
        }
        Ok(outcome)
    }
}

/// Fingerprint of what was actually staged. A staged file that cannot be read
/// back counts as a failed render.
pub(crate) fn staged_fingerprint(
    service: &ServiceDescriptor,
    path: &Path,
) -> Result<Fingerprint, DeployError> {
    local_fingerprint(path).map_err(|source| DeployError::Template {
        service: service.name.clone(),
        source: RenderError::Io {
            path: path.to_path_buf(),
            source,
        },
    })
}
