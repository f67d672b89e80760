//! Error types for stagehand-deploy.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use stagehand_core::ServiceName;
use stagehand_remote::RemoteError;
use stagehand_renderer::RenderError;

use crate::report::DeployReport;

/// Which remote step was in flight when the target became unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteStage {
    Fingerprint,
    Upload,
}

impl fmt::Display for RemoteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteStage::Fingerprint => write!(f, "fingerprint"),
            RemoteStage::Upload => write!(f, "upload"),
        }
    }
}

/// Errors that stop a deploy run.
#[derive(Debug, Error)]
pub enum DeployError {
    /// Template unreadable, unresolved placeholder, or staging write failed.
    #[error("rendering {service} failed: {source}")]
    Template {
        service: ServiceName,
        #[source]
        source: RenderError,
    },

    #[error("remote unavailable during {stage} of {service}: {source}")]
    RemoteUnavailable {
        service: ServiceName,
        stage: RemoteStage,
        #[source]
        source: RemoteError,
    },
}

impl DeployError {
    pub fn service(&self) -> &ServiceName {
        match self {
            DeployError::Template { service, .. } => service,
            DeployError::RemoteUnavailable { service, .. } => service,
        }
    }
}

/// A deploy run that stopped part way.
///
/// Services in `completed` were fully processed before the failure and stay
/// deployed; nothing is rolled back.
#[derive(Debug, Error)]
#[error(
    "deploy aborted at {} after {} completed service(s): {error}",
    .error.service(),
    .completed.services.len()
)]
pub struct DeployAborted {
    pub completed: DeployReport,
    #[source]
    pub error: DeployError,
}

/// A post-install action failed after its artifact was uploaded.
///
/// Recorded on the service's report entry; the upload is not rolled back and
/// the run continues.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("post-install action `{command}` for {service} failed: {reason}")]
pub struct PostActionError {
    pub service: ServiceName,
    pub command: String,
    pub reason: String,
}

/// One failed step while nuking a service. Collected, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("cleanup `{command}` for {service} failed: {reason}")]
pub struct CleanupError {
    pub service: ServiceName,
    pub command: String,
    pub reason: String,
}

/// Errors from starting, stopping or restarting a single service.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("service `{name}` is not declared")]
    UnknownService { name: String },

    #[error(transparent)]
    Remote(#[from] RemoteError),
}
