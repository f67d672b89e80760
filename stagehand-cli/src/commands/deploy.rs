//! `stagehand deploy`: fingerprint-gated upload of every service.

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use stagehand_deploy::{DeployReport, Deployer, ServiceOutcome, ServiceStatus};

use super::{executor_for, secrets_for, TargetArg};

#[derive(Args, Debug)]
pub struct DeployArgs {
    #[command(flatten)]
    pub target: TargetArg,

    /// Compare fingerprints only; upload nothing and run no actions.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the deploy report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl DeployArgs {
    pub fn run(self, config: Option<&Path>) -> Result<()> {
        let deployment = self.target.load(config)?;
        let secrets = secrets_for(&deployment);
        let executor = executor_for(&deployment);

        let report = match Deployer::new(&deployment, &secrets, &executor)
            .dry_run(self.dry_run)
            .deploy_all()
        {
            Ok(report) => report,
            Err(aborted) => {
                // anyhow reports the abort on stderr.
                if self.json {
                    print_json(&aborted.completed)?;
                } else {
                    print_report(&aborted.completed);
                }
                return Err(aborted.into());
            }
        };

        if self.json {
            print_json(&report)?;
        } else {
            print_report(&report);
        }

        let failed = report.post_action_errors().count();
        if failed > 0 {
            bail!("{failed} post-install action(s) failed; uploaded files were kept");
        }
        Ok(())
    }
}

fn print_json(report: &DeployReport) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(report).context("failed to serialize deploy report")?
    );
    Ok(())
}

fn print_report(report: &DeployReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    println!(
        "{prefix}✓ '{}' ({} updated, {} unchanged{})",
        report.target,
        report.count(ServiceStatus::Updated),
        report.count(ServiceStatus::Unchanged),
        if report.dry_run {
            format!(", {} would update", report.count(ServiceStatus::WouldUpdate))
        } else {
            String::new()
        },
    );
    for outcome in &report.services {
        println!("  {}", outcome_line(outcome));
    }
}

fn outcome_line(outcome: &ServiceOutcome) -> String {
    let marker = match (&outcome.status, &outcome.post_action_error) {
        (_, Some(_)) => "!".yellow().bold(),
        (ServiceStatus::Updated, None) => "✎".green().bold(),
        (ServiceStatus::WouldUpdate, None) => "~".cyan().bold(),
        (ServiceStatus::Unchanged, None) => "·".bright_black(),
    };
    let mut line = format!("{marker}  {:<8} {}", outcome.service, outcome.status);
    if let Some(err) = &outcome.post_action_error {
        line.push_str(&format!(" ({})", err.to_string().yellow()));
    }
    line
}
