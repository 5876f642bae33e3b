//! Vesting engine service
//!
//! Wires the pure pipeline to a [`Store`]: looks records up, keeps
//! milestone templates reconciled, persists events and writes the audit log.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info, warn};
use vesting_api::{
    DistributionMode, EventView, Grant, Plan, ScheduleDefinition, ScheduleSummary, VestingEvent,
};
use vesting_config::Ledger;
use vesting_store::{AuditEvent, AuditEventType, Store};
use vesting_util::{GrantId, GrantLocks, PlanId, Result, RunId, ScheduleId, Stage, VestingError};

use crate::{
    build_milestones, check_milestones, project_all, resolve, schedule_events, summarize,
    BatchFailure, BatchReport, ImportReport, MaterializeReport, MilestoneCheck, MilestoneOutcome,
    PeriodPlan, ResolvedSchedule, ScheduleContext,
};

/// Compute a grant's events from an already-assembled context.
///
/// Pure: this is the path both [`VestingEngine::preview`] and
/// [`VestingEngine::materialize`] go through.
pub fn preview_grant(ctx: &ScheduleContext<'_>) -> Result<Vec<VestingEvent>> {
    let grant = ctx
        .grant
        .ok_or_else(|| VestingError::not_found("Grant", "none"))?;
    let resolved = resolve(ctx).map_err(|e| e.in_grant(&grant.id, Stage::Resolve))?;
    schedule_events(grant, &resolved)
}

/// The vesting engine
pub struct VestingEngine {
    store: Arc<dyn Store>,
    locks: GrantLocks,
}

impl VestingEngine {
    pub fn new(store: Arc<dyn Store>) -> Self {
        info!(healthy = store.is_healthy(), "Vesting engine initialized");

        Self {
            store,
            locks: GrantLocks::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Write every record of a validated ledger to the store
    pub fn import_ledger(&self, ledger: &Ledger) -> Result<ImportReport> {
        for schedule in &ledger.schedules {
            self.store.upsert_schedule(schedule)?;
        }
        for plan in &ledger.plans {
            self.store.upsert_plan(plan)?;
        }
        for grant in &ledger.grants {
            self.store
                .upsert_grant(grant)
                .map_err(|e| VestingError::from(e).in_grant(&grant.id, Stage::Persist))?;
        }

        let report = ImportReport {
            schedules: ledger.schedules.len(),
            plans: ledger.plans.len(),
            grants: ledger.grants.len(),
        };

        self.audit(AuditEventType::LedgerImported {
            schedules: report.schedules,
            plans: report.plans,
            grants: report.grants,
        });

        info!(
            schedules = report.schedules,
            plans = report.plans,
            grants = report.grants,
            "Ledger imported"
        );

        Ok(report)
    }

    fn load_grant(&self, id: &GrantId) -> Result<Grant> {
        self.store
            .get_grant(id)?
            .ok_or_else(|| VestingError::not_found("Grant", id))
    }

    fn load_plan(&self, id: &PlanId) -> Result<Plan> {
        self.store
            .get_plan(id)?
            .ok_or_else(|| VestingError::not_found("Plan", id))
    }

    fn load_schedule(&self, id: &ScheduleId) -> Result<ScheduleDefinition> {
        self.store
            .get_schedule(id)?
            .ok_or_else(|| VestingError::not_found("Schedule", id))
    }

    /// Look up every record the resolver may draw from and resolve.
    ///
    /// A dangling reference is `NotFound`; only a schedule that is absent
    /// at every tier falls through to the defaults.
    pub fn resolve_grant(
        &self,
        grant: &Grant,
        explicit: Option<&ScheduleId>,
    ) -> Result<ResolvedSchedule> {
        let grant_schedule = grant
            .schedule_id
            .as_ref()
            .map(|id| self.load_schedule(id))
            .transpose()?;
        let explicit_schedule = explicit.map(|id| self.load_schedule(id)).transpose()?;
        let plan = grant
            .plan_id
            .as_ref()
            .map(|id| self.load_plan(id))
            .transpose()?;
        let plan_template = plan
            .as_ref()
            .and_then(|p| p.schedule_id.as_ref())
            .map(|id| self.load_schedule(id))
            .transpose()?;

        let ctx = ScheduleContext::for_grant(grant)
            .with_plan(plan.as_ref())
            .with_grant_schedule(grant_schedule.as_ref())
            .with_explicit_schedule(explicit_schedule.as_ref())
            .with_plan_template(plan_template.as_ref());

        let resolved = resolve(&ctx)?;
        debug!(
            grant_id = %grant.id,
            source = resolved.source.name(),
            duration_months = resolved.total_duration_months,
            cliff_months = resolved.cliff_months,
            frequency = %resolved.frequency,
            mode = %resolved.distribution_mode,
            "Schedule resolved"
        );
        Ok(resolved)
    }

    /// Compute a grant's events without writing anything
    pub fn preview(
        &self,
        grant_id: &GrantId,
        explicit: Option<&ScheduleId>,
    ) -> Result<Vec<VestingEvent>> {
        let grant = self
            .load_grant(grant_id)
            .map_err(|e| e.in_grant(grant_id, Stage::Resolve))?;
        let resolved = self
            .resolve_grant(&grant, explicit)
            .map_err(|e| e.in_grant(grant_id, Stage::Resolve))?;

        schedule_events(&grant, &resolved)
    }

    /// Reuse the schedule's persisted milestones if they match the plan
    /// for `mode`, otherwise replace them in full.
    ///
    /// A failed replacement is a consistency error: the schedule may be
    /// left without a usable template.
    pub fn ensure_milestones(
        &self,
        schedule: &ScheduleDefinition,
        mode: DistributionMode,
    ) -> Result<MilestoneOutcome> {
        let plan = PeriodPlan::for_schedule(schedule, mode)?;
        let expected = build_milestones(&plan)?;
        let persisted = self.store.get_milestones(&schedule.id)?;

        let reasons = match check_milestones(&persisted, &expected) {
            MilestoneCheck::Valid => {
                debug!(schedule_id = %schedule.id, count = persisted.len(), "Milestones reused");
                return Ok(MilestoneOutcome::Reused {
                    count: persisted.len(),
                });
            }
            MilestoneCheck::Stale(reasons) => reasons,
        };

        self.store
            .replace_milestones(&schedule.id, &expected)
            .map_err(|e| {
                VestingError::consistency(
                    format!("regenerating milestones for schedule {} failed", schedule.id),
                    Some(e.into()),
                )
            })?;

        if persisted.is_empty() {
            self.audit(AuditEventType::MilestonesGenerated {
                schedule_id: schedule.id.clone(),
                count: expected.len(),
            });
            info!(schedule_id = %schedule.id, count = expected.len(), "Milestones generated");

            return Ok(MilestoneOutcome::Generated {
                count: expected.len(),
            });
        }

        self.audit(AuditEventType::MilestonesRegenerated {
            schedule_id: schedule.id.clone(),
            previous_count: persisted.len(),
            count: expected.len(),
            reasons: reasons.iter().map(ToString::to_string).collect(),
        });
        warn!(
            schedule_id = %schedule.id,
            previous_count = persisted.len(),
            count = expected.len(),
            reason = %reasons[0],
            "Stale milestones regenerated"
        );

        Ok(MilestoneOutcome::Regenerated {
            previous_count: persisted.len(),
            count: expected.len(),
            reasons,
        })
    }

    /// Recompute a grant's events and replace the persisted set.
    ///
    /// Holds the grant's lock for the whole run, so two materializations
    /// of one grant never interleave.
    pub fn materialize(&self, grant_id: &GrantId) -> Result<MaterializeReport> {
        let _guard = self.locks.acquire(grant_id);

        let result = self.materialize_locked(grant_id);
        if let Err(e) = &result {
            warn!(grant_id = %grant_id, error = %e, "Materialization failed");
            self.audit(AuditEventType::MaterializeFailed {
                grant_id: grant_id.clone(),
                error: e.to_string(),
            });
        }
        result
    }

    fn materialize_locked(&self, grant_id: &GrantId) -> Result<MaterializeReport> {
        let grant = self
            .load_grant(grant_id)
            .map_err(|e| e.in_grant(grant_id, Stage::Resolve))?;
        let resolved = self
            .resolve_grant(&grant, None)
            .map_err(|e| e.in_grant(grant_id, Stage::Resolve))?;

        let milestones = resolved
            .source
            .schedule()
            .map(|schedule| self.ensure_milestones(schedule, resolved.distribution_mode))
            .transpose()
            .map_err(|e| e.in_grant(grant_id, Stage::Reconcile))?;

        let events = schedule_events(&grant, &resolved)?;

        let stored = self
            .store
            .get_events(grant_id)
            .map_err(|e| VestingError::from(e).in_grant(grant_id, Stage::Persist))?;

        let written = !same_schedule(&stored, &events);
        if written {
            self.store
                .replace_events(grant_id, &events)
                .map_err(|e| VestingError::from(e).in_grant(grant_id, Stage::Persist))?;

            self.audit(AuditEventType::EventsMaterialized {
                grant_id: grant_id.clone(),
                event_count: events.len(),
                total_shares: grant.total_shares,
            });

            info!(
                grant_id = %grant_id,
                source = resolved.source.name(),
                event_count = events.len(),
                total_shares = grant.total_shares,
                "Events materialized"
            );
        } else {
            debug!(grant_id = %grant_id, event_count = events.len(), "Stored events up to date");
        }

        // Report what is stored, lifecycle statuses included
        let events = if written { events } else { stored };

        Ok(MaterializeReport {
            grant_id: grant_id.clone(),
            source: resolved.source.name(),
            schedule_id: resolved.source.schedule_id().cloned(),
            milestones,
            written,
            events,
        })
    }

    /// Materialize every grant in the store.
    ///
    /// A failing grant is recorded and skipped; it never undoes the
    /// grants already written.
    pub fn regenerate_all(&self) -> Result<BatchReport> {
        let run_id = RunId::new();
        let grants = self.store.list_grants()?;

        info!(run_id = %run_id, grant_count = grants.len(), "Batch regeneration started");

        let mut report = BatchReport {
            run_id,
            succeeded: Vec::new(),
            failed: Vec::new(),
        };

        for grant in grants {
            match self.materialize(&grant.id) {
                Ok(_) => report.succeeded.push(grant.id),
                Err(e) => report.failed.push(BatchFailure {
                    grant_id: grant.id,
                    reason: e.to_string(),
                }),
            }
        }

        self.audit(AuditEventType::BatchRegenerated {
            run_id: report.run_id.clone(),
            succeeded: report.succeeded.len(),
            failed: report.failed.len(),
        });

        info!(
            run_id = %report.run_id,
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "Batch regeneration finished"
        );

        Ok(report)
    }

    /// Persisted events of a grant with their status as of `observation_date`
    pub fn project_statuses(
        &self,
        grant_id: &GrantId,
        observation_date: NaiveDate,
    ) -> Result<Vec<EventView>> {
        self.load_grant(grant_id)
            .map_err(|e| e.in_grant(grant_id, Stage::Project))?;
        let events = self
            .store
            .get_events(grant_id)
            .map_err(|e| VestingError::from(e).in_grant(grant_id, Stage::Project))?;

        Ok(project_all(&events, observation_date))
    }

    /// Display summary of a grant's effective schedule
    pub fn summary(&self, grant_id: &GrantId) -> Result<ScheduleSummary> {
        let grant = self
            .load_grant(grant_id)
            .map_err(|e| e.in_grant(grant_id, Stage::Resolve))?;
        let resolved = self
            .resolve_grant(&grant, None)
            .map_err(|e| e.in_grant(grant_id, Stage::Resolve))?;

        summarize(&resolved, grant.vesting_start_date).map_err(|e| e.in_grant(grant_id, Stage::Plan))
    }

    fn audit(&self, event: AuditEventType) {
        if let Err(e) = self.store.append_audit(AuditEvent::new(event)) {
            warn!(error = %e, "Failed to append audit event");
        }
    }
}

/// Whether two event sets describe the same schedule, ignoring the
/// lifecycle fields owned by external processes
fn same_schedule(stored: &[VestingEvent], computed: &[VestingEvent]) -> bool {
    stored.len() == computed.len()
        && stored.iter().zip(computed).all(|(a, b)| {
            a.sequence_number == b.sequence_number
                && a.event_date == b.event_date
                && a.shares == b.shares
                && a.cumulative_shares == b.cumulative_shares
                && a.event_type == b.event_type
        })
}
