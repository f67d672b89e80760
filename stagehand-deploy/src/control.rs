//! Start, stop or restart one project service through the init system.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use stagehand_core::{Deployment, ServiceName};
use stagehand_remote::{RemoteCommand, RemoteExecutor};

use crate::error::ControlError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceVerb {
    Start,
    Stop,
    Restart,
}

impl ServiceVerb {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceVerb::Start => "start",
            ServiceVerb::Stop => "stop",
            ServiceVerb::Restart => "restart",
        }
    }
}

impl fmt::Display for ServiceVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceVerb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(ServiceVerb::Start),
            "stop" => Ok(ServiceVerb::Stop),
            "restart" => Ok(ServiceVerb::Restart),
            other => Err(format!("unknown service verb `{other}`")),
        }
    }
}

/// `service {project}.{name} {verb}`, run privileged.
///
/// Only declared services can be controlled.
pub fn control(
    deployment: &Deployment,
    executor: &dyn RemoteExecutor,
    name: &str,
    verb: ServiceVerb,
) -> Result<(), ControlError> {
    let service = deployment
        .service(&ServiceName::from(name))
        .ok_or_else(|| ControlError::UnknownService {
            name: name.to_string(),
        })?;
    let job = service.installed_service_name(deployment.project_filename());
    let command = RemoteCommand::service(&job, verb.as_str());
    executor.run_privileged(&command)?.ensure_success(&command)?;
    tracing::info!(service = %service.name, verb = %verb, "service {verb} done");
    Ok(())
}
