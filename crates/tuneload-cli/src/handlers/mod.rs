//! Command handlers.
//!
//! Each handler receives the composed `CliContext` (or only what it needs)
//! and performs one subcommand.

pub mod fetch;
pub mod list;
pub mod paths;
pub mod remove;
