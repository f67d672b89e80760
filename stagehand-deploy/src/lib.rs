//! # stagehand-deploy
//!
//! Fingerprint-gated deployment of rendered service configuration.
//!
//! [`Deployer`] renders each declared service, compares its SHA-256 with the
//! installed copy, uploads only what changed and runs the service's
//! post-install action. [`Nuker`] removes everything again. [`inspect_all`]
//! reports differences without touching the target.

pub mod actions;
pub mod control;
pub mod deployer;
pub mod error;
pub mod fingerprint;
pub mod nuker;
pub mod report;
pub mod status;

pub use control::{control, ServiceVerb};
pub use deployer::Deployer;
pub use error::{
    CleanupError, ControlError, DeployAborted, DeployError, PostActionError, RemoteStage,
};
pub use fingerprint::{local_fingerprint, needs_update, remote_fingerprint, Fingerprint};
pub use nuker::Nuker;
pub use report::{DeployReport, NukeReport, ServiceOutcome, ServiceStatus};
pub use status::{inspect_all, ServiceState};
