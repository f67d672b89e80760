//! `stagehand render`: stage every service locally.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use stagehand_renderer::Renderer;

use super::{secrets_for, TargetArg};

#[derive(Args, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub target: TargetArg,
}

impl RenderArgs {
    pub fn run(self, config: Option<&Path>) -> Result<()> {
        let deployment = self.target.load(config)?;
        let secrets = secrets_for(&deployment);
        let artifacts = Renderer::new(&deployment, &secrets)
            .render_all()
            .context("render failed")?;

        println!(
            "✓ rendered {} service(s) for '{}'",
            artifacts.len(),
            deployment.target_name
        );
        for artifact in artifacts {
            println!("  ✎  {:<8} {}", artifact.service, artifact.path.display());
        }
        Ok(())
    }
}
