//! Store trait definitions

use chrono::NaiveDate;
use vesting_api::{Grant, LifecycleStatus, Milestone, Plan, ScheduleDefinition, VestingEvent};
use vesting_util::{GrantId, PlanId, ScheduleId};

use crate::{AuditEvent, StoreResult};

/// Main store trait
///
/// Every `replace_*` operation is atomic: readers see either the old set or
/// the new one, never an empty or mixed set.
pub trait Store: Send + Sync {
    // Schedules

    fn upsert_schedule(&self, schedule: &ScheduleDefinition) -> StoreResult<()>;

    fn get_schedule(&self, id: &ScheduleId) -> StoreResult<Option<ScheduleDefinition>>;

    fn list_schedules(&self) -> StoreResult<Vec<ScheduleDefinition>>;

    // Plans

    fn upsert_plan(&self, plan: &Plan) -> StoreResult<()>;

    fn get_plan(&self, id: &PlanId) -> StoreResult<Option<Plan>>;

    // Grants

    /// Insert or update a grant.
    ///
    /// Rejected if `total_shares` or `vesting_start_date` would change while
    /// any of the grant's events has left the pending state.
    fn upsert_grant(&self, grant: &Grant) -> StoreResult<()>;

    fn get_grant(&self, id: &GrantId) -> StoreResult<Option<Grant>>;

    fn list_grants(&self) -> StoreResult<Vec<Grant>>;

    // Milestone templates

    /// Milestones of a schedule, ordered by `sequence_order`
    fn get_milestones(&self, schedule_id: &ScheduleId) -> StoreResult<Vec<Milestone>>;

    /// Delete every milestone of the schedule and insert `milestones`
    fn replace_milestones(
        &self,
        schedule_id: &ScheduleId,
        milestones: &[Milestone],
    ) -> StoreResult<()>;

    // Vesting events

    /// Events of a grant, ordered by `sequence_number`
    fn get_events(&self, grant_id: &GrantId) -> StoreResult<Vec<VestingEvent>>;

    /// Delete every event of the grant and insert `events`.
    ///
    /// Rejected if any persisted event has left the pending state.
    fn replace_events(&self, grant_id: &GrantId, events: &[VestingEvent]) -> StoreResult<()>;

    /// Record a lifecycle change made by an external business process
    fn set_event_status(
        &self,
        grant_id: &GrantId,
        sequence_number: u32,
        status: LifecycleStatus,
        actual_vest_date: Option<NaiveDate>,
    ) -> StoreResult<()>;

    // Audit log

    fn append_audit(&self, event: AuditEvent) -> StoreResult<()>;

    fn get_recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>>;

    // Health

    fn is_healthy(&self) -> bool;
}
