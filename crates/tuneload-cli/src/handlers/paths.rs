//! Handler for `tuneload paths`.

use std::path::Path;

use anyhow::Result;

use tuneload_core::ResolvedPaths;

/// Print every resolved path, one `key = value` per line.
pub fn execute(data_dir: Option<&Path>) -> Result<()> {
    let paths = ResolvedPaths::resolve(data_dir)?;
    println!("{paths}");
    Ok(())
}
