//! Results reported by the engine service

use serde::Serialize;
use vesting_api::VestingEvent;
use vesting_util::{GrantId, RunId, ScheduleId};

use crate::StaleReason;

/// What happened to a schedule's milestone template
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MilestoneOutcome {
    /// Persisted set matched the plan
    Reused { count: usize },
    /// No set existed; one was written
    Generated { count: usize },
    /// A stale set was replaced in full
    Regenerated {
        previous_count: usize,
        count: usize,
        reasons: Vec<StaleReason>,
    },
}

/// Result of materializing one grant
#[derive(Debug, Clone, Serialize)]
pub struct MaterializeReport {
    pub grant_id: GrantId,
    /// Resolver tier the schedule came from
    pub source: &'static str,
    pub schedule_id: Option<ScheduleId>,
    /// `None` when the schedule came from a fallback or the defaults
    pub milestones: Option<MilestoneOutcome>,
    /// `false` when the stored events already matched and nothing was written
    pub written: bool,
    pub events: Vec<VestingEvent>,
}

/// One grant a batch run could not regenerate
#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    pub grant_id: GrantId,
    pub reason: String,
}

/// Aggregate result of a batch regeneration
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub run_id: RunId,
    pub succeeded: Vec<GrantId>,
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Counts written by a ledger import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub schedules: usize,
    pub plans: usize,
    pub grants: usize,
}
