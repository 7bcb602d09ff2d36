use anyhow::Result;
use clap::Args;

use corrl_core::query;

use super::GlobalArgs;

#[derive(Args, Debug)]
pub struct PluginsArgs {}

impl PluginsArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let (_, gateway) = global.gateway()?;
        super::print(&query::techspaces(&gateway)?);
        Ok(())
    }
}
