//! Ledger validation CLI tool
//!
//! Validates a vesting ledger file and reports any errors.

use std::path::PathBuf;
use std::process::ExitCode;
use vesting_util::{default_ledger_path, format_date};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let ledger_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_ledger_path();
            eprintln!("Usage: validate-ledger [ledger-file]");
            eprintln!();
            eprintln!("Validates a vesting ledger file.");
            eprintln!();
            eprintln!("Default ledger location: {}", default_path.display());
            eprintln!();
            eprintln!("Example:");
            eprintln!("  validate-ledger {}", default_path.display());
            eprintln!("  validate-ledger ledger.example.toml");
            return ExitCode::from(2);
        }
    };

    if !ledger_path.exists() {
        eprintln!("Error: Ledger file not found: {}", ledger_path.display());
        return ExitCode::from(1);
    }

    match vesting_config::load_ledger(&ledger_path) {
        Ok(ledger) => {
            println!("✓ Ledger is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", vesting_config::CURRENT_CONFIG_VERSION);
            println!("  Schedules: {}", ledger.schedules.len());
            println!("  Plans: {}", ledger.plans.len());
            println!("  Grants: {}", ledger.grants.len());

            if !ledger.schedules.is_empty() {
                println!();
                println!("Schedules:");
                for s in &ledger.schedules {
                    println!(
                        "  - {}: {} months, {} month cliff, {} ({}, {})",
                        s.id,
                        s.total_duration_months,
                        s.cliff_months,
                        s.frequency,
                        s.distribution_mode,
                        s.schedule_kind
                    );
                }
            }

            if !ledger.grants.is_empty() {
                println!();
                println!("Grants:");
                for g in &ledger.grants {
                    println!(
                        "  - {}: {} shares from {}",
                        g.id,
                        g.total_shares,
                        format_date(g.vesting_start_date)
                    );
                }
            }

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Ledger validation failed");
            eprintln!();
            match &e {
                vesting_config::ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                vesting_config::ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                vesting_config::ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                vesting_config::ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver,
                        vesting_config::CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
