//! CLI subcommand implementations.

pub mod history;
pub mod ingest;
pub mod status;
