pub mod deploy;
pub mod nuke;
pub mod render;
pub mod service;
pub mod status;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use stagehand_core::{config, Deployment};
use stagehand_remote::SshExecutor;
use stagehand_renderer::EnvSecrets;

/// `--target` shared by every command that acts on a deployment target.
#[derive(Args, Debug)]
pub struct TargetArg {
    /// Deployment target declared under `targets:` (e.g. production, staging).
    #[arg(long, short)]
    pub target: String,
}

impl TargetArg {
    pub fn load(&self, config_path: Option<&Path>) -> Result<Deployment> {
        let path = config_path.unwrap_or(Path::new(config::CONFIG_FILE_NAME));
        config::load_deployment_at(path, &self.target)
            .with_context(|| format!("failed to load {} for target '{}'", path.display(), self.target))
    }
}

pub fn secrets_for(deployment: &Deployment) -> EnvSecrets {
    EnvSecrets::new(deployment.project.secrets_prefix())
}

pub fn executor_for(deployment: &Deployment) -> SshExecutor {
    SshExecutor::from_server(&deployment.server)
}
