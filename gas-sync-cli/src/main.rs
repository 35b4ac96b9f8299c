//! gas-sync — keep a local folder of script files in sync with remote
//! script containers on Drive.
//!
//! # Usage
//!
//! ```text
//! gas-sync init
//! gas-sync push <remote> [-w]
//! gas-sync pull <remote>
//! gas-sync fetch            (aliases: remote, status)
//! gas-sync remote-add <name> <fileId> [-u alias] [-f]
//! gas-sync remote-remove <name>
//! gas-sync authorize [-u alias] [-f]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    authorize::AuthorizeArgs, fetch::FetchArgs, init::InitArgs, pull::PullArgs, push::PushArgs,
    remote::{RemoteAddArgs, RemoteRemoveArgs},
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "gas-sync",
    version,
    about = "Sync a local folder of script files with remote script containers",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize the current directory as a gas-sync project.
    Init(InitArgs),

    /// Push local changes to a remote script container.
    Push(PushArgs),

    /// Pull remote files onto the local filesystem (overwrites local edits).
    Pull(PullArgs),

    /// Refresh remote metadata and list the configured remotes.
    #[command(visible_aliases = ["remote", "status"])]
    Fetch(FetchArgs),

    /// Bind a remote script container to this project.
    RemoteAdd(RemoteAddArgs),

    /// Remove a remote binding from this project.
    RemoteRemove(RemoteRemoveArgs),

    /// Generate OAuth tokens for a credential alias.
    #[command(visible_alias = "authorise")]
    Authorize(AuthorizeArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Push(args) => args.run(),
        Commands::Pull(args) => args.run(),
        Commands::Fetch(args) => args.run(),
        Commands::RemoteAdd(args) => args.run(),
        Commands::RemoteRemove(args) => args.run(),
        Commands::Authorize(args) => args.run(),
    }
}
