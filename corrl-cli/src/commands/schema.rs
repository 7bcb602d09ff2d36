//! `corrl schema`: export an endpoint's schema through a techspace.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use corrl_core::query;

use super::{project_or_cwd, GlobalArgs};

#[derive(Args, Debug)]
pub struct SchemaArgs {
    #[arg(short, long)]
    pub endpoint: String,

    /// Techspace that serializes the schema.
    #[arg(short, long)]
    pub techspace: String,

    /// Target file; written by the service.
    #[arg(short, long, value_name = "FILE")]
    pub file: PathBuf,

    #[arg(short, long)]
    pub project: Option<String>,
}

impl SchemaArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let project = project_or_cwd(self.project)?;
        let target = std::path::absolute(&self.file)
            .with_context(|| format!("invalid target path {}", self.file.display()))?;
        let (_, gateway) = global.gateway()?;
        let outcome = query::export_schema(
            &gateway,
            &project,
            &self.endpoint,
            Some(&self.techspace),
            &target,
        )?;
        super::print(&outcome);
        Ok(())
    }
}
