//! vestctl - Operator CLI for the vesting engine
//!
//! Wires together:
//! - Ledger loading and validation
//! - Store initialization
//! - The vesting engine (preview, materialize, batch regeneration)
//! - Status projection and audit inspection
//!
//! Machine-readable results go to stdout as JSON; logs go to stderr.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use vesting_config::{load_ledger, ConfigError};
use vesting_core::VestingEngine;
use vesting_store::{SqliteStore, Store};
use vesting_util::{default_db_path, is_mock_date_active, parse_date, today, GrantId, ScheduleId};

/// vestctl - Compute, persist and inspect equity vesting schedules
#[derive(Parser, Debug)]
#[command(name = "vestctl")]
#[command(about = "Compute, persist and inspect equity vesting schedules", long_about = None)]
struct Args {
    /// Database path (or set VESTING_DB env var). Defaults to the ledger's
    /// data_dir on import and the user data directory otherwise
    #[arg(long, env = "VESTING_DB", global = true)]
    db: Option<PathBuf>,

    /// Log level (RUST_LOG takes precedence)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a ledger file without touching the database
    Validate {
        /// Ledger TOML file
        ledger: PathBuf,
    },

    /// Import schedules, plans and grants from a ledger
    Import {
        /// Ledger TOML file
        ledger: PathBuf,
    },

    /// Compute a grant's events without persisting them
    Preview {
        grant: String,

        /// Use this schedule when the grant has none attached
        #[arg(long)]
        schedule: Option<String>,
    },

    /// Compute and persist a grant's events
    Materialize { grant: String },

    /// Materialize every grant, continuing past failures
    RegenerateAll,

    /// Show a grant's persisted events with their display status
    Status {
        grant: String,

        /// Observation date (YYYY-MM-DD, default today)
        #[arg(long, value_parser = parse_date)]
        on: Option<NaiveDate>,
    },

    /// Show a grant's schedule summary
    Summary { grant: String },

    /// Show recent audit events
    Audit {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if args.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn open_store(db: &Path) -> Result<Arc<dyn Store>> {
    if let Some(dir) = db.parent()
        && !dir.as_os_str().is_empty()
    {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create data directory {:?}", dir))?;
    }

    let store = SqliteStore::open(db).with_context(|| format!("Failed to open database {:?}", db))?;
    info!(db_path = %db.display(), "Store initialized");

    Ok(Arc::new(store))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

fn validate(path: &Path) -> Result<()> {
    match load_ledger(path) {
        Ok(ledger) => {
            println!("✓ Ledger is valid");
            println!("  Schedules: {}", ledger.schedules.len());
            println!("  Plans: {}", ledger.plans.len());
            println!("  Grants: {}", ledger.grants.len());
            Ok(())
        }
        Err(ConfigError::ValidationFailed { errors }) => {
            eprintln!("✗ Ledger validation failed:");
            for error in &errors {
                eprintln!("  - {}", error);
            }
            bail!("{} validation error(s) in {:?}", errors.len(), path)
        }
        Err(e) => Err(e).with_context(|| format!("Failed to load ledger {:?}", path)),
    }
}

fn connect(db: &Path) -> Result<VestingEngine> {
    Ok(VestingEngine::new(open_store(db)?))
}

fn run(args: Args) -> Result<()> {
    let db = args.db;
    let engine = || connect(&db.clone().unwrap_or_else(default_db_path));

    match args.command {
        Command::Validate { ledger } => validate(&ledger),

        Command::Import { ledger } => {
            let ledger = load_ledger(&ledger)
                .with_context(|| format!("Failed to load ledger {:?}", ledger))?;
            let db_path = db.clone().unwrap_or_else(|| ledger.service.db_path());
            let report = connect(&db_path)?.import_ledger(&ledger)?;
            print_json(&report)
        }

        Command::Preview { grant, schedule } => {
            let schedule = schedule.map(ScheduleId::new);
            let events = engine()?.preview(&GrantId::new(grant), schedule.as_ref())?;
            print_json(&events)
        }

        Command::Materialize { grant } => {
            let report = engine()?.materialize(&GrantId::new(grant))?;
            print_json(&report)
        }

        Command::RegenerateAll => {
            let report = engine()?.regenerate_all()?;
            print_json(&report)?;
            if !report.is_clean() {
                bail!("{} grant(s) failed to regenerate", report.failed.len());
            }
            Ok(())
        }

        Command::Status { grant, on } => {
            let observation_date = on.unwrap_or_else(today);
            if on.is_none() && is_mock_date_active() {
                warn!(date = %observation_date, "Observing on mock date");
            }
            debug!(grant_id = %grant, date = %observation_date, "Projecting statuses");

            let views = engine()?.project_statuses(&GrantId::new(grant), observation_date)?;
            print_json(&views)
        }

        Command::Summary { grant } => {
            let summary = engine()?.summary(&GrantId::new(grant))?;
            print_json(&summary)
        }

        Command::Audit { limit } => {
            let events = engine()?.store().get_recent_audits(limit)?;
            print_json(&events)
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "vestctl starting"
    );

    run(args)
}
