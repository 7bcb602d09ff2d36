//! `corrl apply`: merge a specification file, or attach one schema, dataset
//! or service address to an endpoint (creating it when needed).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use corrl_core::{apply, query, ApplyRequest, CoreError, Directive, EndpointType};

use super::{project_or_cwd, GlobalArgs};

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Specification file to merge into the project.
    #[arg(
        short,
        long,
        value_name = "FILE",
        conflicts_with_all = ["endpoint", "kind", "schema", "data", "service"]
    )]
    pub file: Option<PathBuf>,

    /// Endpoint to configure.
    #[arg(short, long)]
    pub endpoint: Option<String>,

    /// Kind of the endpoint if it has to be created (dataset, service, source, sink).
    #[arg(short, long, value_name = "ENDPOINT-KIND")]
    pub kind: Option<EndpointType>,

    /// Techspace that interprets the schema, dataset or service.
    #[arg(short, long)]
    pub techspace: Option<String>,

    /// Schema file or URL.
    #[arg(long, value_name = "FILE|URL")]
    pub schema: Option<String>,

    /// Dataset file or URL.
    #[arg(long, value_name = "FILE|URL")]
    pub data: Option<String>,

    /// Service URL or host:port.
    #[arg(long, value_name = "URL|HOST:PORT")]
    pub service: Option<String>,

    #[arg(short, long)]
    pub project: Option<String>,
}

impl ApplyArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let project = project_or_cwd(self.project)?;

        if let Some(file) = self.file {
            let path = std::path::absolute(&file)
                .with_context(|| format!("invalid specification path {}", file.display()))?;
            let (_, gateway) = global.gateway()?;
            super::print(&query::merge_spec(&gateway, &project, &path)?);
            return Ok(());
        }

        let Some(endpoint) = self.endpoint else {
            return Err(CoreError::validation(
                "Missing required option! Please specify -f <file> to apply a CorrSpec file \
                 or use direct modification options!",
            )
            .into());
        };
        let request = ApplyRequest {
            directive: Directive::from_flags(self.schema, self.data, self.service)?,
            project,
            endpoint,
            kind: self.kind,
            techspace: self.techspace,
        };

        tracing::debug!(?request, "apply");

        let (_, gateway) = global.gateway()?;
        let outcome = apply(&gateway, &request)
            .with_context(|| format!("failed to apply to endpoint '{}'", request.endpoint))?;
        super::print(&outcome);
        Ok(())
    }
}
