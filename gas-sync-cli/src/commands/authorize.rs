//! `gas-sync authorize [-u alias] [-f]` — interactive OAuth consent flow.

use std::io::Write;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use gas_sync_core::types::Alias;
use gas_sync_drive::Authenticator;

/// Arguments for `gas-sync authorize`.
#[derive(Args, Debug)]
pub struct AuthorizeArgs {
    /// Alias to store the generated tokens under.
    #[arg(short = 'u', long = "user", default_value = "default")]
    pub alias: String,

    /// Re-authorize even if tokens for this alias already exist.
    #[arg(short = 'f', long)]
    pub force: bool,
}

impl AuthorizeArgs {
    pub fn run(self) -> Result<()> {
        let auth = Authenticator::open().context("credential store unavailable")?;
        let alias = Alias::from(self.alias.as_str());

        if auth.aliases()?.contains(&alias) {
            if !self.force {
                bail!("alias '{alias}' is already authorized (pass --force to redo)");
            }
            auth.forget(&alias)
                .with_context(|| format!("failed to clear tokens for '{alias}'"))?;
        }

        println!("Authorize this app by visiting this url:\n\n  {}\n", auth.consent_url()?);
        print!("Enter the code from that page here: ");
        std::io::stdout().flush().context("cannot flush stdout")?;

        let mut code = String::new();
        std::io::stdin()
            .read_line(&mut code)
            .context("cannot read verification code")?;
        if code.trim().is_empty() {
            bail!("no verification code entered");
        }

        auth.install_code(&alias, &code)
            .with_context(|| format!("token exchange failed for '{alias}'"))?;
        println!("{} stored credentials for alias '{alias}'", "✓".green().bold());
        Ok(())
    }
}
