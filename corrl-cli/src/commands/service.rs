//! `corrl status|up|down`: lifecycle of the CorrLang core service.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;

use corrl_client::{ensure_running, StartupPoll};
use corrl_core::{query, Outcome};

use super::GlobalArgs;

#[derive(Args, Debug)]
pub struct StatusArgs {}

impl StatusArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let (settings, gateway) = global.gateway()?;
        let outcome = query::service_status(&gateway, settings.port, Utc::now())
            .context("failed to query service status")?;
        super::print(&outcome);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct UpArgs {}

impl UpArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let settings = global.settings()?;
        let startup = ensure_running(&settings.home, &settings.java, StartupPoll::default())
            .context("failed to start CorrLang core service")?;
        super::print(&Outcome::ServiceStarted {
            port: startup.port,
            already_running: startup.already_running,
        });
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct DownArgs {}

impl DownArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let (_, gateway) = global.gateway()?;
        let reason = format!("CLI Request: PID={}", std::process::id());
        let outcome =
            query::shutdown(&gateway, &reason).context("failed to stop CorrLang core service")?;
        super::print(&outcome);
        Ok(())
    }
}
