//! corrl: command-line client for the CorrLang object registry.
//!
//! # Usage
//!
//! ```text
//! corrl [-H <home>] [-P <port>] [-J <java-home>] <command>
//! corrl info
//! corrl install [--version <release>] [--no-overwrite]
//! corrl status | up | down
//! corrl plugins
//! corrl list [-p <project> | -a]
//! corrl get -t <techspace> | -e <endpoint> | -c <correspondence> | -v <view> [-p <project>]
//! corrl schema -e <endpoint> -t <techspace> -f <target>
//! corrl apply -f <spec>
//! corrl apply -e <endpoint> [-k <kind>] [-t <techspace>] --schema|--data|--service <value>
//! ```

mod commands;

use std::io::IsTerminal;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    apply::ApplyArgs,
    get::GetArgs,
    info::InfoArgs,
    install::InstallArgs,
    list::ListArgs,
    plugins::PluginsArgs,
    schema::SchemaArgs,
    service::{DownArgs, StatusArgs, UpArgs},
    GlobalArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "corrl",
    version,
    about = "Install, run and talk to the CorrLang core service",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show CLI version and installation details.
    Info(InfoArgs),

    /// Download and unpack a CorrLang distribution into the home directory.
    Install(InstallArgs),

    /// Check whether the core service is running.
    Status(StatusArgs),

    /// Start the core service in the background.
    Up(UpArgs),

    /// Ask the core service to shut down.
    Down(DownArgs),

    /// List the registered techspaces.
    Plugins(PluginsArgs),

    /// List registered objects.
    List(ListArgs),

    /// Show details of one object.
    Get(GetArgs),

    /// Apply a specification file or a single endpoint change.
    Apply(ApplyArgs),

    /// Export an endpoint schema to a file.
    Schema(SchemaArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let cli = Cli::parse();
    let global = &cli.global;
    match cli.command {
        Commands::Info(args) => args.run(global),
        Commands::Install(args) => args.run(global),
        Commands::Status(args) => args.run(global),
        Commands::Up(args) => args.run(global),
        Commands::Down(args) => args.run(global),
        Commands::Plugins(args) => args.run(global),
        Commands::List(args) => args.run(global),
        Commands::Get(args) => args.run(global),
        Commands::Apply(args) => args.run(global),
        Commands::Schema(args) => args.run(global),
    }
}

/// Diagnostics go to stderr; stdout carries only the command's result.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
