//! Per-download progress state.

mod table;

pub use table::ProgressTable;
