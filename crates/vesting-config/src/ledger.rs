//! Validated ledger structures

use crate::schema::{RawConfig, RawGrant, RawPlan, RawSchedule, RawServiceConfig};
use crate::validation::{parse_distribution_mode, parse_frequency, parse_kind};
use std::path::PathBuf;
use vesting_api::{Frequency, Grant, Plan, PlanFallback, ScheduleDefinition};
use vesting_util::{db_path_in, default_data_dir, parse_date, GrantId, PlanId, ScheduleId};

/// Validated ledger ready to be imported into a store
#[derive(Debug, Clone)]
pub struct Ledger {
    pub service: ServiceConfig,
    pub schedules: Vec<ScheduleDefinition>,
    pub plans: Vec<Plan>,
    pub grants: Vec<Grant>,
}

impl Ledger {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            service: ServiceConfig::from_raw(raw.service),
            schedules: raw.schedules.into_iter().map(convert_schedule).collect(),
            plans: raw.plans.into_iter().map(convert_plan).collect(),
            grants: raw.grants.into_iter().map(convert_grant).collect(),
        }
    }
}

/// Tool configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub data_dir: PathBuf,
}

impl ServiceConfig {
    /// Database file inside the configured data directory
    pub fn db_path(&self) -> PathBuf {
        db_path_in(&self.data_dir)
    }

    fn from_raw(raw: RawServiceConfig) -> Self {
        Self {
            data_dir: raw.data_dir.unwrap_or_else(default_data_dir),
        }
    }
}

// Conversion helpers. Inputs have already passed validation, so parse
// failures here only fall back to defaults.

fn convert_schedule(raw: RawSchedule) -> ScheduleDefinition {
    ScheduleDefinition {
        id: ScheduleId::new(raw.id),
        total_duration_months: raw.duration_months,
        cliff_months: raw.cliff_months,
        frequency: parse_frequency(&raw.frequency).unwrap_or(Frequency::Annually),
        distribution_mode: raw
            .distribution_mode
            .and_then(|m| parse_distribution_mode(&m).ok())
            .unwrap_or_default(),
        schedule_kind: raw
            .kind
            .and_then(|k| parse_kind(&k).ok())
            .unwrap_or_default(),
    }
}

fn convert_plan(raw: RawPlan) -> Plan {
    Plan {
        id: PlanId::new(raw.id),
        name: raw.name,
        schedule_id: raw.schedule.map(ScheduleId::new),
        schedule_kind: raw.kind.and_then(|k| parse_kind(&k).ok()),
        fallback: raw.fallback.map(|f| PlanFallback {
            years: f.years,
            cliff_months: f.cliff_months,
            frequency: parse_frequency(&f.frequency).unwrap_or(Frequency::Annually),
        }),
    }
}

fn convert_grant(raw: RawGrant) -> Grant {
    Grant {
        id: GrantId::new(raw.id),
        plan_id: raw.plan.map(PlanId::new),
        schedule_id: raw.schedule.map(ScheduleId::new),
        total_shares: u64::try_from(raw.total_shares).unwrap_or(0),
        vesting_start_date: parse_date(&raw.vesting_start_date).unwrap_or_default(),
        distribution_mode: raw
            .distribution_mode
            .and_then(|m| parse_distribution_mode(&m).ok()),
    }
}
