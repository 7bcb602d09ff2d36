//! `corrl list`: registered objects of one project, or of all.

use anyhow::Result;
use clap::Args;

use corrl_core::query;

use super::{project_or_cwd, GlobalArgs};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Project to list [default: current directory].
    #[arg(short, long)]
    pub project: Option<String>,

    /// List objects of every project.
    #[arg(short, long, conflicts_with = "project")]
    pub all: bool,
}

impl ListArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let project = if self.all {
            None
        } else {
            Some(project_or_cwd(self.project)?)
        };
        let (_, gateway) = global.gateway()?;
        super::print(&query::list(&gateway, project.as_deref())?);
        Ok(())
    }
}
