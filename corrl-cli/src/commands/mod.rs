pub mod apply;
pub mod get;
pub mod info;
pub mod install;
pub mod list;
pub mod plugins;
pub mod schema;
pub mod service;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use corrl_client::{Environment, HttpGateway, Overrides, Settings};
use corrl_core::Outcome;

/// Options accepted by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// CorrLang installation directory [default: $CORRLANG_HOME or ~/.corrlang].
    #[arg(short = 'H', long, global = true, value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// Port of the CorrLang core service [default: $CORRLANG_PORT, <home>/PORT or 6969].
    #[arg(short = 'P', long, global = true)]
    pub port: Option<u16>,

    /// Java installation used to launch the service [default: $CORRLANG_JAVA or $JAVA_HOME].
    #[arg(short = 'J', long = "java-home", global = true, value_name = "DIR")]
    pub java_home: Option<PathBuf>,
}

impl GlobalArgs {
    pub fn settings(&self) -> Result<Settings> {
        let overrides = Overrides {
            home: self.home.clone(),
            port: self.port,
            java_home: self.java_home.clone(),
        };
        Settings::resolve(&overrides, &Environment::from_process())
            .context("failed to resolve CorrLang settings")
    }

    pub fn gateway(&self) -> Result<(Settings, HttpGateway)> {
        let settings = self.settings()?;
        let gateway = HttpGateway::localhost(settings.port);
        Ok((settings, gateway))
    }
}

/// `-p` defaults to the current working directory, as a string.
pub fn project_or_cwd(project: Option<String>) -> Result<String> {
    match project {
        Some(project) => Ok(project),
        None => {
            let cwd = std::env::current_dir().context("could not determine working directory")?;
            Ok(cwd.display().to_string())
        }
    }
}

/// Prints an outcome to stdout, highlighting the service state.
pub fn print(outcome: &Outcome) {
    let text = outcome.to_string();
    let text = match outcome {
        Outcome::ServiceStatus(status) if status.running() => {
            text.replacen("RUNNING", &"RUNNING".green().bold().to_string(), 1)
        }
        Outcome::ServiceStatus(_) => {
            text.replacen("OFFLINE", &"OFFLINE".red().bold().to_string(), 1)
        }
        _ => text,
    };
    println!("{text}");
}
