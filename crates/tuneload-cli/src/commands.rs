//! Main commands enum.

use clap::Subcommand;

use tuneload_core::DEFAULT_MAX_CONCURRENT;

use crate::track_spec::TrackSpec;

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download tracks given as ID=URL[=NAME]
    Fetch {
        /// Tracks to download; NAME defaults to the last URL path segment
        #[arg(required = true, value_name = "ID=URL[=NAME]")]
        tracks: Vec<TrackSpec>,
        /// Maximum number of simultaneous downloads
        #[arg(
            short = 'j',
            long,
            env = "TUNELOAD_MAX_CONCURRENT",
            default_value_t = DEFAULT_MAX_CONCURRENT,
            value_parser = clap::value_parser!(u32).range(1..)
        )]
        concurrency: u32,
        /// Download even if the file already exists locally
        #[arg(short, long)]
        force: bool,
    },

    /// List downloaded tracks, newest first
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Forget a downloaded track and delete its file
    Remove {
        /// Track id
        id: String,
        /// Leave the file on disk, only drop the record
        #[arg(long)]
        keep_file: bool,
    },

    /// Show resolved data, downloads and database paths
    Paths,
}
