use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bl_cli::commands::{history, ingest, status};
use bl_cli::{Cli, Commands, Config, HistoryTarget, IngestSignal};
use bl_engine::{CaptureService, HistoryQuery};
use bl_provider::{Client, Provider};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(bl_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = bl_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

/// Probes the configured provider once at startup, if one is configured.
///
/// Any probe failure leaves the provider out of play; recording then falls
/// back to the local store.
fn probe_provider(config: &Config) -> Option<Provider> {
    let url = config.provider_url.as_deref()?;
    let client = match Client::new(url, config.provider_timeout()) {
        Ok(client) => client,
        Err(err) => {
            tracing::warn!(error = %err, "provider configuration rejected");
            return None;
        }
    };
    Provider::probe(Box::new(client))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    match &cli.command {
        Some(Commands::Ingest { signal }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let mut service = CaptureService::new(db, probe_provider(&config));
            match signal {
                IngestSignal::Place { at, block, player } => {
                    service.on_block_placed(at.block_pos(), block.as_str(), player.as_str());
                }
                IngestSignal::Break { at, block, player } => {
                    service.on_block_broken(at.block_pos(), block.as_str(), player.as_str());
                }
                IngestSignal::Explosion {
                    world,
                    entity,
                    destroyed,
                } => {
                    service.on_explosion(world, entity.as_deref(), destroyed);
                }
                IngestSignal::Stream => {
                    let stdin = std::io::stdin();
                    ingest::stream(stdin.lock(), &mut std::io::stdout(), &mut service)?;
                }
            }
        }
        Some(Commands::History { target }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let provider = probe_provider(&config);
            let query = HistoryQuery::new(&db, provider.as_ref());
            let mut stdout = std::io::stdout();
            match target {
                HistoryTarget::Block { at, limit, json } => {
                    history::block(&mut stdout, &query, &at.block_pos(), *limit, *json)?;
                }
                HistoryTarget::Container { at, limit, json } => {
                    history::container(&mut stdout, &query, &at.block_pos(), *limit, *json)?;
                }
            }
        }
        Some(Commands::Status) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let provider = probe_provider(&config);
            status::run(
                &mut std::io::stdout(),
                &db,
                provider.as_ref(),
                &config.database_path,
            )?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
