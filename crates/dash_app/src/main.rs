//! `laminar-dash`: terminal dashboard for a Laminar CI server.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use engine_logging::LogDestination;
use log::LevelFilter;

mod platform;

use platform::DashboardConfig;

#[derive(Debug, Parser)]
#[command(name = "laminar-dash")]
#[command(about = "Live terminal dashboard for a Laminar CI server")]
#[command(version)]
struct Cli {
    /// Page to open first, e.g. `/jobs/build/12`
    path: Option<String>,

    /// Server base URL (ws, wss, http or https)
    #[arg(long, env = "LAMINAR_DASH_SERVER")]
    server: Option<String>,

    /// RON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also write the log to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(server) = cli.server {
        config.server = server;
    }
    if let Some(path) = cli.path {
        config.initial_path = path;
    }
    let mut settings = config.resolve()?;
    if cli.verbose {
        settings.log_level = LevelFilter::Debug;
    }
    if let Some(log_file) = cli.log_file {
        settings.log_destination = LogDestination::Both(log_file);
    }

    engine_logging::initialize(&settings.log_destination, settings.log_level);

    platform::run_app(settings).context("terminal output failed")
}
