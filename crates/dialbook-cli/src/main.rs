mod commands;
mod error;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use crate::commands::{completions, contacts, ingest, stats, Context};
use crate::error::{exit_code_for, report_error};
use dialbook_config as config;
use dialbook_config::AppConfig;
use dialbook_store::{paths, Store};

#[derive(Debug, Parser)]
#[command(
    name = "dialbook",
    version,
    about = "Ingest phone-directory CSV exports into a deduplicated contact store"
)]
struct Cli {
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Normalize CSV files and upsert their contacts
    Ingest(ingest::IngestArgs),
    /// Count stored contacts
    Count(contacts::CountArgs),
    /// List stored contacts, most recently updated first
    List(contacts::ListArgs),
    /// Show the geography distribution and daily additions
    Stats(stats::StatsArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logging(verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, verbose);
            exit_code_for(&err)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        db_path,
        config: config_path,
        json,
        verbose,
        command,
    } = cli;

    match command {
        Command::Completions(args) => completions::emit(args),
        Command::Ingest(args) => {
            let (app_config, db_path) = prepare(config_path, db_path, verbose)?;
            let settings = ingest::IngestSettings {
                db_path: &db_path,
                json,
                config: &app_config,
            };
            ingest::ingest(&settings, args)
        }
        command => {
            let (app_config, db_path) = prepare(config_path, db_path, verbose)?;
            let store = open_store(&db_path)?;
            let ctx = Context {
                store: &store,
                json,
                config: &app_config,
            };

            match command {
                Command::Count(args) => contacts::count_contacts(&ctx, args),
                Command::List(args) => contacts::list_contacts(&ctx, args),
                Command::Stats(args) => stats::stats(&ctx, args),
                Command::Ingest(_) => unreachable!("ingest command handled before store initialization"),
                Command::Completions(_) => {
                    unreachable!("completions command handled before store initialization")
                }
            }
        }
    }
}

/// Loads configuration and resolves the database path. Either failing stops
/// the run before any input is read.
fn prepare(
    config_path: Option<PathBuf>,
    db_path: Option<PathBuf>,
    verbose: bool,
) -> Result<(AppConfig, PathBuf)> {
    let app_config = config::load(config_path.clone()).with_context(|| "load config")?;
    if verbose {
        match config::resolve_config_path(config_path) {
            Ok(path) => {
                if path.exists() {
                    debug!(path = %path.display(), "config resolved");
                } else {
                    debug!(path = %path.display(), "config missing, using defaults");
                }
            }
            Err(err) => {
                debug!(error = %err, "config unavailable");
            }
        }
    }

    let db_path = paths::resolve_db_path(db_path, app_config.store.path.clone())
        .with_context(|| "resolve database path")?;
    debug!(path = %db_path.display(), "database path resolved");

    Ok((app_config, db_path))
}

pub(crate) fn open_store(db_path: &std::path::Path) -> Result<Store> {
    let store = Store::open(db_path)
        .with_context(|| format!("open database {}", db_path.display()))?;
    store.ensure_schema().with_context(|| "prepare contacts table")?;
    Ok(store)
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}
