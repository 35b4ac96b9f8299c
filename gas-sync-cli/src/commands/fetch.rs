//! `gas-sync fetch` (aliases: `remote`, `status`) — refresh and list remotes.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use gas_sync_core::project;
use gas_sync_engine::{pipeline, FetchOutcome};

use super::{drive_gateway, project_dir};

/// Arguments for `gas-sync fetch`.
#[derive(Args, Debug)]
pub struct FetchArgs {}

#[derive(Tabled)]
struct RemoteRow {
    #[tabled(rename = "")]
    indicator: String,
    #[tabled(rename = "remote")]
    remote: String,
    #[tabled(rename = "alias")]
    alias: String,
    #[tabled(rename = "file id")]
    file_id: String,
    #[tabled(rename = "last modified")]
    last_modified: String,
    #[tabled(rename = "fetched")]
    fetched: String,
}

impl FetchArgs {
    pub fn run(self) -> Result<()> {
        let dir = project_dir()?;
        project::open(&dir)?;
        let gateway = drive_gateway()?;

        println!("Fetching remote metadata...");
        let outcomes =
            pipeline::fetch_blocking(&dir, gateway).context("failed to refresh remotes")?;

        if outcomes.is_empty() {
            println!("No remotes configured. Run `gas-sync remote-add <name> <fileId>`.");
            return Ok(());
        }

        for outcome in &outcomes {
            if let Some(err) = &outcome.error {
                eprintln!(
                    "{} failed to refresh '{}': {err}",
                    "✗".red().bold(),
                    outcome.descriptor.name,
                );
            }
        }

        let rows: Vec<RemoteRow> = outcomes.iter().map(row).collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}

fn row(outcome: &FetchOutcome) -> RemoteRow {
    let indicator = if outcome.error.is_some() {
        "■".red().bold().to_string()
    } else {
        "■".green().bold().to_string()
    };
    RemoteRow {
        indicator,
        remote: outcome.descriptor.name.to_string(),
        alias: outcome.descriptor.alias.to_string(),
        file_id: outcome.descriptor.file_id.to_string(),
        last_modified: outcome.descriptor.last_modified.to_rfc3339(),
        fetched: format_age(outcome.descriptor.last_fetch),
    }
}

fn format_age(timestamp: DateTime<Utc>) -> String {
    let seconds = (Utc::now() - timestamp).num_seconds().max(0) as u64;
    if seconds < 60 {
        return format!("{seconds}s ago");
    }
    if seconds < 60 * 60 {
        return format!("{}m ago", seconds / 60);
    }
    if seconds < 60 * 60 * 24 {
        return format!("{}h ago", seconds / (60 * 60));
    }
    format!("{}d ago", seconds / (60 * 60 * 24))
}
