//! `gas-sync remote-add` / `gas-sync remote-remove` — manage remote bindings.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use gas_sync_core::project;
use gas_sync_core::types::{Alias, FileId, RemoteName};
use gas_sync_engine::pipeline;

use super::{drive_gateway, project_dir};

/// Arguments for `gas-sync remote-add`.
#[derive(Args, Debug)]
pub struct RemoteAddArgs {
    /// Name for the new remote (e.g. "origin").
    pub name: String,

    /// Identifier of the remote script container.
    pub file_id: String,

    /// Credential alias to use for this remote.
    #[arg(short = 'u', long = "user", default_value = "default")]
    pub alias: String,

    /// Replace an existing remote with the same name.
    #[arg(short = 'f', long)]
    pub force: bool,
}

impl RemoteAddArgs {
    pub fn run(self) -> Result<()> {
        let dir = project_dir()?;
        project::open(&dir)?;
        let gateway = drive_gateway()?;

        let descriptor = pipeline::add_remote_blocking(
            &dir,
            gateway,
            Alias::from(self.alias.as_str()),
            FileId::from(self.file_id.as_str()),
            RemoteName::from(self.name.as_str()),
            self.force,
        )
        .with_context(|| format!("failed to add remote '{}'", self.name))?;

        println!(
            "{} added remote '{}' -> {} (alias '{}', last modified {})",
            "✓".green().bold(),
            descriptor.name,
            descriptor.file_id,
            descriptor.alias,
            descriptor.last_modified.to_rfc3339(),
        );
        Ok(())
    }
}

/// Arguments for `gas-sync remote-remove`.
#[derive(Args, Debug)]
pub struct RemoteRemoveArgs {
    /// Name of the remote binding to remove.
    pub name: String,
}

impl RemoteRemoveArgs {
    pub fn run(self) -> Result<()> {
        let dir = project_dir()?;
        let mut project = project::open(&dir)?;
        let removed = project.remove_remote(&RemoteName::from(self.name.as_str()))?;
        project::save(&dir, &project)
            .with_context(|| format!("failed to persist removal of '{}'", removed.name))?;

        println!("{} removed remote '{}'", "✓".green().bold(), removed.name);
        Ok(())
    }
}
