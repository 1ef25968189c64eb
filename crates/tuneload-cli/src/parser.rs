//! Main CLI parser and top-level argument handling.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for downloading and managing local tracks.
#[derive(Parser, Debug)]
#[command(name = "tuneload")]
#[command(about = "Download audio tracks for offline playback")]
#[command(version)]
pub struct Cli {
    /// Override the data directory (database and downloads)
    #[arg(long = "data-dir", env = "TUNELOAD_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}
