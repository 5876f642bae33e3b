//! Default paths for the vesting tools
//!
//! Paths are user-writable by default (no root required):
//! - Data: `$XDG_DATA_HOME/vesting` or `~/.local/share/vesting`
//! - Database: `<data dir>/vesting.db`
//! - Ledger: `$XDG_CONFIG_HOME/vesting/ledger.toml` or `~/.config/vesting/ledger.toml`

use std::path::{Path, PathBuf};

/// Environment variable for overriding the data directory
pub const VESTING_DATA_DIR_ENV: &str = "VESTING_DATA_DIR";

/// Database filename within the data directory
const DB_FILENAME: &str = "vesting.db";

/// Ledger filename within the config directory
const LEDGER_FILENAME: &str = "ledger.toml";

/// Application subdirectory name
const APP_DIR: &str = "vesting";

/// Get the default data directory.
///
/// Order of precedence:
/// 1. `$VESTING_DATA_DIR` environment variable (if set)
/// 2. `$XDG_DATA_HOME/vesting` (if XDG_DATA_HOME is set)
/// 3. `~/.local/share/vesting` (fallback)
pub fn default_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var(VESTING_DATA_DIR_ENV) {
        return PathBuf::from(path);
    }

    data_dir_without_env()
}

/// Get the data directory without checking VESTING_DATA_DIR.
/// Used for default values in configs where the env var is checked separately.
pub fn data_dir_without_env() -> PathBuf {
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR);
    }

    // Last resort
    PathBuf::from("/tmp").join(APP_DIR).join("data")
}

/// Database path inside a data directory
pub fn db_path_in(data_dir: &Path) -> PathBuf {
    data_dir.join(DB_FILENAME)
}

/// Get the default database path
pub fn default_db_path() -> PathBuf {
    db_path_in(&default_data_dir())
}

/// Get the default ledger path.
///
/// 1. `$XDG_CONFIG_HOME/vesting/ledger.toml`
/// 2. `~/.config/vesting/ledger.toml`
pub fn default_ledger_path() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join(LEDGER_FILENAME);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(LEDGER_FILENAME);
    }

    PathBuf::from("/tmp").join(APP_DIR).join(LEDGER_FILENAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_contains_app_dir() {
        let path = data_dir_without_env();
        assert!(path.to_string_lossy().contains("vesting"));
    }

    #[test]
    fn db_path_is_inside_data_dir() {
        let dir = PathBuf::from("/srv/vesting");
        let db = db_path_in(&dir);
        assert_eq!(db.parent().unwrap(), dir);
        assert!(db.to_string_lossy().ends_with("vesting.db"));
    }

    #[test]
    fn ledger_path_is_toml() {
        let path = default_ledger_path();
        assert_eq!(path.extension().unwrap(), "toml");
    }
}
