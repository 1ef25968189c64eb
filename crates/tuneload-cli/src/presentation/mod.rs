//! Presentation helpers for terminal output.

pub mod tables;

pub use tables::{format_optional, format_size, print_separator, truncate_string};
