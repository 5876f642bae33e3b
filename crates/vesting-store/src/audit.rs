//! Audit event types

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use vesting_util::{GrantId, RunId, ScheduleId};

/// Types of audit events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEventType {
    /// Ledger imported into the store
    LedgerImported {
        schedules: usize,
        plans: usize,
        grants: usize,
    },

    /// First milestone set written for a schedule
    MilestonesGenerated {
        schedule_id: ScheduleId,
        count: usize,
    },

    /// Stale milestone set replaced
    MilestonesRegenerated {
        schedule_id: ScheduleId,
        previous_count: usize,
        count: usize,
        reasons: Vec<String>,
    },

    /// Grant events written
    EventsMaterialized {
        grant_id: GrantId,
        event_count: usize,
        total_shares: u64,
    },

    /// Grant materialization failed
    MaterializeFailed {
        grant_id: GrantId,
        error: String,
    },

    /// Batch regeneration finished
    BatchRegenerated {
        run_id: RunId,
        succeeded: usize,
        failed: usize,
    },
}

/// Full audit event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID
    pub id: i64,

    /// Event timestamp
    pub timestamp: DateTime<Local>,

    /// Event type and details
    pub event: AuditEventType,
}

impl AuditEvent {
    pub fn new(event: AuditEventType) -> Self {
        Self {
            id: 0, // Will be set by store
            timestamp: Local::now(),
            event,
        }
    }
}
