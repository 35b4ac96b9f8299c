//! `gas-sync pull <remote>` — materialize remote files locally.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use gas_sync_core::project;
use gas_sync_core::types::RemoteName;
use gas_sync_engine::pipeline;

use super::{drive_gateway, project_dir};

/// Arguments for `gas-sync pull`.
#[derive(Args, Debug)]
pub struct PullArgs {
    /// Name of the remote to pull from.
    pub remote: String,
}

impl PullArgs {
    pub fn run(self) -> Result<()> {
        let dir = project_dir()?;
        project::open(&dir)?;
        let gateway = drive_gateway()?;
        let remote = RemoteName::from(self.remote.as_str());

        let report = pipeline::pull_blocking(&dir, &remote, gateway)
            .with_context(|| format!("pull failed for '{remote}'"))?;

        for failure in &report.failures {
            eprintln!(
                "{} couldn't write {}: {}",
                "✗".red().bold(),
                failure.path.display(),
                failure.message,
            );
        }
        println!(
            "{} pulled '{}' ({} files written{})",
            "✓".green().bold(),
            report.remote,
            report.written.len(),
            if report.failures.is_empty() {
                String::new()
            } else {
                format!(", {} failed", report.failures.len())
            },
        );
        Ok(())
    }
}
