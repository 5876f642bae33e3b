//! Vesting records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use vesting_util::{GrantId, PlanId, ScheduleId};

use crate::{DistributionMode, EventType, Frequency, LifecycleStatus, ScheduleKind};

/// Immutable schedule template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDefinition {
    pub id: ScheduleId,
    pub total_duration_months: u32,
    pub cliff_months: u32,
    pub frequency: Frequency,
    #[serde(default)]
    pub distribution_mode: DistributionMode,
    #[serde(default)]
    pub schedule_kind: ScheduleKind,
}

/// Persisted period descriptor belonging to a schedule template.
///
/// `months_from_start` is optional because stored rows may carry nulls;
/// such rows are treated as stale by the reconciliation guard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub sequence_order: u32,
    pub months_from_start: Option<u32>,
    /// Share of the grant vesting at this milestone (percentage mode only)
    pub vesting_percentage: Option<f64>,
}

/// Inline schedule configuration used when a plan links no template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanFallback {
    pub years: u32,
    pub cliff_months: u32,
    pub frequency: Frequency,
}

/// Equity plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    pub name: String,
    /// Linked template schedule
    pub schedule_id: Option<ScheduleId>,
    /// The plan's own vesting kind; drives event typing
    pub schedule_kind: Option<ScheduleKind>,
    pub fallback: Option<PlanFallback>,
}

/// Equity grant: the sole numeric and temporal input to the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub id: GrantId,
    pub plan_id: Option<PlanId>,
    /// Schedule explicitly attached to this grant
    pub schedule_id: Option<ScheduleId>,
    pub total_shares: u64,
    pub vesting_start_date: NaiveDate,
    /// Distribution mode requested by this grant, overriding the schedule's
    pub distribution_mode: Option<DistributionMode>,
}

/// One dated vesting event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingEvent {
    /// 1-based, contiguous per grant
    pub sequence_number: u32,
    pub event_date: NaiveDate,
    pub shares: u64,
    /// Running total through this event, clamped to the grant total
    pub cumulative_shares: u64,
    pub event_type: EventType,
    /// Set by external processes only
    #[serde(default)]
    pub lifecycle_status: LifecycleStatus,
    /// Date an external process actually vested this event
    #[serde(default)]
    pub actual_vest_date: Option<NaiveDate>,
}

/// Schedule summary for display, independent of the event list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub cliff_months: u32,
    pub frequency: Frequency,
    pub vesting_kind: ScheduleKind,
    pub vesting_years: f64,
    pub cliff_date: Option<NaiveDate>,
}
