//! `gas-sync push <remote> [-w]` — converge the remote onto local files.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use gas_sync_core::project;
use gas_sync_core::types::RemoteName;
use gas_sync_engine::{pipeline, watch};

use super::{drive_gateway, project_dir};

/// Arguments for `gas-sync push`.
#[derive(Args, Debug)]
pub struct PushArgs {
    /// Name of the remote to push to.
    pub remote: String,

    /// Keep watching for local changes and push on every change.
    #[arg(short = 'w', long)]
    pub watch: bool,
}

impl PushArgs {
    pub fn run(self) -> Result<()> {
        let dir = project_dir()?;
        // Resolve the project first so a missing project beats a missing
        // credential store.
        project::open(&dir)?;
        let gateway = drive_gateway()?;
        let remote = RemoteName::from(self.remote.as_str());

        if self.watch {
            println!(
                "Watching {} for changes to push to '{}' — Ctrl-C to stop.",
                dir.display(),
                remote
            );
            watch::watch_blocking(&dir, &remote, gateway)
                .with_context(|| format!("watch mode failed for '{remote}'"))?;
            return Ok(());
        }

        let report = pipeline::push_blocking(&dir, &remote, gateway)
            .with_context(|| format!("push failed for '{remote}'"))?;
        println!(
            "{} pushed '{}' ({} updated, {} added, {} removed; {} remote files)",
            "✓".green().bold(),
            report.remote,
            report.edits.updated,
            report.edits.inserted,
            report.edits.deleted,
            report.remote_files,
        );
        Ok(())
    }
}
