//! `corrl get`: details of one techspace, endpoint, correspondence or view.

use anyhow::Result;
use clap::Args;

use corrl_core::query::{self, Selector};

use super::{project_or_cwd, GlobalArgs};

#[derive(Args, Debug)]
pub struct GetArgs {
    #[arg(short, long)]
    pub techspace: Option<String>,

    #[arg(short, long)]
    pub endpoint: Option<String>,

    #[arg(short, long)]
    pub correspondence: Option<String>,

    #[arg(short, long)]
    pub view: Option<String>,

    /// Project the object belongs to [default: current directory].
    #[arg(short, long)]
    pub project: Option<String>,
}

impl GetArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let selector =
            Selector::from_flags(self.techspace, self.endpoint, self.correspondence, self.view)?;
        let project = project_or_cwd(self.project)?;
        let (_, gateway) = global.gateway()?;
        super::print(&query::describe(&gateway, &project, &selector)?);
        Ok(())
    }
}
