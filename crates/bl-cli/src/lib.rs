//! Block audit log CLI library.
//!
//! This crate provides the command-line interface for the block audit log:
//! argument parsing, configuration loading, and the subcommand
//! implementations that tie the capture service and history queries to
//! stdin/stdout.

mod cli;
pub mod commands;
mod config;
mod signal;

pub use cli::{Cli, Commands, Coordinate, HistoryTarget, IngestSignal};
pub use config::{Config, dirs_data_path};
pub use signal::Signal;
