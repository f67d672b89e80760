//! `stagehand service start|stop|restart <name>`.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use stagehand_deploy::{control, ServiceVerb};

use super::{executor_for, TargetArg};

#[derive(Args, Debug)]
pub struct ServiceArgs {
    /// start, stop or restart.
    pub verb: ServiceVerb,

    /// Declared service name, e.g. `uwsgi`.
    pub name: String,

    #[command(flatten)]
    pub target: TargetArg,
}

impl ServiceArgs {
    pub fn run(self, config: Option<&Path>) -> Result<()> {
        let deployment = self.target.load(config)?;
        let executor = executor_for(&deployment);
        control(&deployment, &executor, &self.name, self.verb)
            .with_context(|| format!("service {} {} failed", self.name, self.verb))?;
        println!(
            "✓ {}.{} {}",
            deployment.project_filename(),
            self.name,
            self.verb
        );
        Ok(())
    }
}
