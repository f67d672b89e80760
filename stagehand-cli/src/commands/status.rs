//! `stagehand status`: local versus installed fingerprints.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use stagehand_deploy::{inspect_all, ServiceState};

use super::{executor_for, secrets_for, TargetArg};

#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub target: TargetArg,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "service")]
    service: String,
    #[tabled(rename = "installed path")]
    installed_path: String,
    #[tabled(rename = "local")]
    local: String,
    #[tabled(rename = "remote")]
    remote: String,
    #[tabled(rename = "status")]
    status: String,
}

impl StatusArgs {
    pub fn run(self, config: Option<&Path>) -> Result<()> {
        let deployment = self.target.load(config)?;
        let secrets = secrets_for(&deployment);
        let executor = executor_for(&deployment);
        let states = inspect_all(&deployment, &secrets, &executor)
            .with_context(|| format!("status check failed for '{}'", deployment.target_name))?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&states).context("failed to serialize status JSON")?
            );
            return Ok(());
        }

        print_table(&deployment.target_name, &states);
        Ok(())
    }
}

fn print_table(target: &str, states: &[ServiceState]) {
    let pending = states.iter().filter(|s| s.needs_update).count();
    println!(
        "Stagehand v{} | target '{}' | {} services | {} pending",
        env!("CARGO_PKG_VERSION"),
        target,
        states.len(),
        pending,
    );
    if states.is_empty() {
        println!("No services declared.");
        return;
    }

    let rows: Vec<StatusTableRow> = states
        .iter()
        .map(|s| StatusTableRow {
            service: s.service.to_string(),
            installed_path: s.installed_path.to_string(),
            local: s.local.short().to_string(),
            remote: s
                .remote
                .as_ref()
                .map(|fp| fp.short().to_string())
                .unwrap_or_else(|| "missing".to_string()),
            status: if s.needs_update {
                "PENDING".to_string()
            } else {
                "CURRENT".to_string()
            },
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    if pending > 0 {
        println!(
            "{}",
            format!("Run 'stagehand deploy --target {target}' to update pending services.")
                .yellow()
        );
    }
}
