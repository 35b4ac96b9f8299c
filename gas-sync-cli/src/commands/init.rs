//! `gas-sync init` — initialize the current directory as a project.

use anyhow::{Context, Result};
use clap::Args;

use gas_sync_core::project;

use super::project_dir;

/// Arguments for `gas-sync init`.
#[derive(Args, Debug)]
pub struct InitArgs {}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let dir = project_dir()?;
        let existed = project::state_path(&dir).exists();
        project::init(&dir)
            .with_context(|| format!("failed to initialize project in {}", dir.display()))?;

        if existed {
            println!("Already a gas-sync project; nothing to do.");
        } else {
            println!("✓ Initialized gas-sync project in {}", dir.display());
            println!("  Add a remote next: gas-sync remote-add <name> <fileId>");
        }
        Ok(())
    }
}
