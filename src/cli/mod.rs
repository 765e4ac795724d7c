//! Command-line interface for docanalyze.

mod commands;

pub use commands::{is_verbose, run};
