//! `corrl install`: download a CorrLang distribution into the home directory.

use anyhow::{Context, Result};
use clap::Args;

use corrl_client::install::{self, resolve_version};
use corrl_client::InstallRequest;
use corrl_core::Outcome;

use super::GlobalArgs;

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Release to install [default: latest known release].
    #[arg(long = "version", value_name = "VERSION")]
    pub release: Option<String>,

    /// Fail instead of replacing an existing installation.
    #[arg(long)]
    pub no_overwrite: bool,
}

impl InstallArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let version = resolve_version(self.release.as_deref())?;
        let settings = global.settings()?;
        let request = InstallRequest {
            home: settings.home,
            version,
            overwrite: !self.no_overwrite,
            port: settings.port,
        };
        tracing::debug!(?request, "install");

        let installed = install::install(&request)
            .with_context(|| format!("failed to install CorrLang {}", request.version))?;
        super::print(&Outcome::Installed {
            version: installed.version,
            home: installed.home,
            overwritten: installed.overwritten,
        });
        Ok(())
    }
}
