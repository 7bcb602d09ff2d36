//! `corrl info`: CLI version and installation details.

use anyhow::{Context, Result};
use clap::Args;

use corrl_client::installed_version;
use corrl_core::Outcome;

use super::GlobalArgs;

#[derive(Args, Debug)]
pub struct InfoArgs {}

impl InfoArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let settings = global.settings()?;
        let service_version = installed_version(&settings.home)
            .context("failed to read installed service version")?;
        super::print(&Outcome::InstallInfo {
            cli_version: env!("CARGO_PKG_VERSION").to_string(),
            home: settings.home,
            service_version,
        });
        Ok(())
    }
}
