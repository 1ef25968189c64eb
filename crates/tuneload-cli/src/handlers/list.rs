//! Handler for `tuneload list`.

use anyhow::Result;

use tuneload_core::DownloadedTrack;

use crate::bootstrap::CliContext;
use crate::presentation::{format_optional, format_size, print_separator, truncate_string};

const TABLE_WIDTH: usize = 96;

/// List downloaded tracks, newest first.
pub async fn execute(ctx: &CliContext, json: bool) -> Result<()> {
    let tracks = ctx.tracks.list().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tracks)?);
        return Ok(());
    }

    if tracks.is_empty() {
        println!("No downloaded tracks.");
        println!("Use 'tuneload fetch ID=URL' to download one.");
        return Ok(());
    }

    print_header();
    for track in &tracks {
        println!("{}", format_row(track));
    }
    print_separator(TABLE_WIDTH);
    println!("{} track(s)", tracks.len());

    Ok(())
}

fn print_header() {
    println!(
        "{:<16} {:<28} {:<20} {:>10} {:<18}",
        "ID", "Name", "Author", "Size", "Downloaded"
    );
    print_separator(TABLE_WIDTH);
}

fn format_row(track: &DownloadedTrack) -> String {
    format!(
        "{:<16} {:<28} {:<20} {:>10} {:<18}",
        truncate_string(track.id.as_str(), 16),
        truncate_string(&track.name, 28),
        truncate_string(&format_optional(track.author.as_ref(), "-"), 20),
        format_size(track.size_bytes),
        track.created_at.format("%Y-%m-%d %H:%M"),
    )
}
