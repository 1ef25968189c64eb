//! Path utilities for tuneload data directories.
//!
//! Everything lives under one data root:
//! - `downloads/` holds finished tracks
//! - `tuneload.db` records which tracks were downloaded
//!
//! # Design
//!
//! - Returns `PathBuf` and `PathError` for clear error handling
//! - The root comes from an explicit override, then `TUNELOAD_DATA_DIR`,
//!   then the platform data directory

mod error;
mod platform;
mod resolver;

pub use error::PathError;
pub use platform::{DATA_DIR_ENV, data_root, database_path, downloads_dir};
pub use resolver::ResolvedPaths;
