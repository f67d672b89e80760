//! `stagehand nuke`: remove every service from the target.

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use stagehand_deploy::Nuker;

use super::{executor_for, TargetArg};

#[derive(Args, Debug)]
pub struct NukeArgs {
    #[command(flatten)]
    pub target: TargetArg,

    /// Emit the nuke report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl NukeArgs {
    pub fn run(self, config: Option<&Path>) -> Result<()> {
        let deployment = self.target.load(config)?;
        let executor = executor_for(&deployment);
        let report = Nuker::new(&deployment, &executor).nuke_all();

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize nuke report")?
            );
        } else {
            println!(
                "✓ nuked {} service(s) on '{}'",
                report.services.len(),
                report.target
            );
            for err in &report.errors {
                println!("  {}  {err}", "✗".red().bold());
            }
        }

        if !report.is_clean() {
            bail!("{} cleanup step(s) failed", report.errors.len());
        }
        Ok(())
    }
}
