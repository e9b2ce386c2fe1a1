//! Terminal host for the upload/monitor workflow.
mod app;
mod effects;
mod logging;
mod settings;
mod ui;

use std::path::PathBuf;

use clap::Parser;

pub use app::run_app;
use logging::LogDestination;

/// Upload a file for processing and follow its job until every task finishes.
#[derive(Debug, Parser)]
#[command(name = "uplink", version)]
pub struct Cli {
    /// File to upload.
    pub file: PathBuf,
    /// Backend base URL; overrides the settings file.
    #[arg(long)]
    pub server: Option<String>,
    /// RON settings file.
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = LogDestination::File)]
    pub log: LogDestination,
    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,
}
