//! Ledger configuration parsing and validation
//!
//! Supports TOML ledgers with:
//! - Versioned schema
//! - Schedule templates, plans (with inline fallback schedules) and grants
//! - Validation that reports every problem at once

mod ledger;
mod schema;
mod validation;

pub use ledger::*;
pub use schema::*;
pub use validation::*;

use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read ledger file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Load and validate a ledger from a TOML file
pub fn load_ledger(path: impl AsRef<Path>) -> ConfigResult<Ledger> {
    let path = path.as_ref();
    debug!(path = %path.display(), "Loading ledger");
    let content = std::fs::read_to_string(path)?;
    parse_ledger(&content)
}

/// Parse and validate a ledger from a TOML string
pub fn parse_ledger(content: &str) -> ConfigResult<Ledger> {
    let raw: RawConfig = toml::from_str(content)?;

    if raw.config_version != CURRENT_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(raw.config_version));
    }

    let errors = validate_config(&raw);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    Ok(Ledger::from_raw(raw))
}

/// Current supported config version
pub const CURRENT_CONFIG_VERSION: u32 = 1;
