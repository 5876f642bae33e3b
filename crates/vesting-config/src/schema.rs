//! Raw ledger schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw ledger as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Tool-level settings
    #[serde(default)]
    pub service: RawServiceConfig,

    /// Schedule templates
    #[serde(default)]
    pub schedules: Vec<RawSchedule>,

    /// Equity plans
    #[serde(default)]
    pub plans: Vec<RawPlan>,

    /// Grants
    #[serde(default)]
    pub grants: Vec<RawGrant>,
}

/// Tool-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawServiceConfig {
    /// Data directory for the database (overridden by `--db` / VESTING_DB)
    pub data_dir: Option<PathBuf>,
}

/// Raw schedule template
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawSchedule {
    /// Unique stable ID
    pub id: String,

    pub duration_months: u32,

    #[serde(default)]
    pub cliff_months: u32,

    /// "monthly", "quarterly" or "annually"
    pub frequency: String,

    /// "percentage" (default) or "even"
    pub distribution_mode: Option<String>,

    /// "time_based" (default), "performance_based" or "hybrid"
    pub kind: Option<String>,
}

/// Raw plan definition
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawPlan {
    pub id: String,

    pub name: String,

    /// Linked schedule template ID
    pub schedule: Option<String>,

    /// Plan vesting kind
    pub kind: Option<String>,

    /// Inline schedule used when no template is linked
    pub fallback: Option<RawPlanFallback>,
}

/// Inline plan schedule
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawPlanFallback {
    pub years: u32,

    #[serde(default)]
    pub cliff_months: u32,

    pub frequency: String,
}

/// Raw grant
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawGrant {
    pub id: String,

    /// Plan ID
    pub plan: Option<String>,

    /// Explicitly attached schedule ID
    pub schedule: Option<String>,

    /// Signed so that negative values are reported, not rejected by the parser
    pub total_shares: i64,

    /// YYYY-MM-DD
    pub vesting_start_date: String,

    /// Distribution mode override
    pub distribution_mode: Option<String>,
}
