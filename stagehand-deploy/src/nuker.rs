//! Remove every declared service from a target.

use stagehand_core::Deployment;
use stagehand_remote::RemoteExecutor;

use crate::actions;
use crate::report::NukeReport;

pub struct Nuker<'a> {
    deployment: &'a Deployment,
    executor: &'a dyn RemoteExecutor,
}

impl<'a> Nuker<'a> {
    pub fn new(deployment: &'a Deployment, executor: &'a dyn RemoteExecutor) -> Self {
        Nuker {
            deployment,
            executor,
        }
    }

    /// Run each service's cleanup in declaration order.
    ///
    /// Never stops early: a missing file is not an error, and any command
    /// that fails is recorded in [`NukeReport::errors`] before moving on.
    pub fn nuke_all(&self) -> NukeReport {
        tracing::info!(
            target_name = %self.deployment.target_name,
            host = %self.executor.describe(),
            "nuke started"
        );
        let mut report = NukeReport {
            target: self.deployment.target_name.clone(),
            services: Vec::new(),
            errors: Vec::new(),
        };
        for service in self.deployment.services() {
            let errors = actions::run_cleanup(self.deployment, service, self.executor);
            report.services.push(service.name.clone());
            report.errors.extend(errors);
        }
        if report.is_clean() {
            tracing::info!(services = report.services.len(), "nuke finished");
        } else {
            tracing::warn!(
                services = report.services.len(),
                errors = report.errors.len(),
                "nuke finished with errors"
            );
        }
        report
    }
}
