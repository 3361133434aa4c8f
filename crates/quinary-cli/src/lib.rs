//! Command-line front end: argument parsing, logging setup, commands and
//! terminal summaries.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
pub mod types;
