//! Event materialization
//!
//! [`schedule_events`] is the one pipeline behind both preview and
//! materialize: plan periods, allocate shares, then date and sequence
//! the events.

use chrono::NaiveDate;
use tracing::trace;
use vesting_api::{EventType, Grant, LifecycleStatus, ScheduleKind, VestingEvent};
use vesting_util::{add_months, format_date, Result, Stage, VestingError};

use crate::{allocate, Allocation, PeriodPlan, ResolvedSchedule};

/// Compute a grant's full event list from its resolved schedule
pub fn schedule_events(grant: &Grant, resolved: &ResolvedSchedule) -> Result<Vec<VestingEvent>> {
    let plan = PeriodPlan::from_resolved(resolved).map_err(|e| e.in_grant(&grant.id, Stage::Plan))?;

    let allocation = allocate(
        grant.total_shares,
        plan.cliff_months,
        plan.period_count,
        plan.distribution_mode,
    )
    .map_err(|e| e.in_grant(&grant.id, Stage::Allocate))?;

    materialize_events(
        grant.vesting_start_date,
        &plan,
        &allocation,
        resolved.event_kind,
    )
    .map_err(|e| e.in_grant(&grant.id, Stage::Materialize))
}

/// Expand a plan and its allocation into dated events
pub fn materialize_events(
    start_date: NaiveDate,
    plan: &PeriodPlan,
    allocation: &Allocation,
    event_kind: ScheduleKind,
) -> Result<Vec<VestingEvent>> {
    let shares = allocation.event_shares();
    let period_type = event_kind.period_event_type();

    // No cliff and no periods: one full-amount event at the start date
    let dated: Vec<(NaiveDate, EventType)> = if plan.expected_count() == 0 {
        vec![(start_date, period_type)]
    } else {
        plan.offsets()?
            .into_iter()
            .enumerate()
            .map(|(i, months)| {
                let event_type = if i == 0 && plan.has_cliff() {
                    EventType::Cliff
                } else {
                    period_type
                };
                event_date(start_date, months).map(|date| (date, event_type))
            })
            .collect::<Result<_>>()?
    };

    if dated.len() != shares.len() {
        return Err(VestingError::internal(format!(
            "{} event dates but {} share amounts",
            dated.len(),
            shares.len()
        )));
    }

    let total = allocation.total_shares;
    let mut cumulative: u64 = 0;
    let events = dated
        .into_iter()
        .zip(shares)
        .enumerate()
        .map(|(i, ((event_date, event_type), shares))| {
            cumulative = cumulative.saturating_add(shares).min(total);
            VestingEvent {
                sequence_number: i as u32 + 1,
                event_date,
                shares,
                cumulative_shares: cumulative,
                event_type,
                lifecycle_status: LifecycleStatus::Pending,
                actual_vest_date: None,
            }
        })
        .collect::<Vec<_>>();

    trace!(
        start_date = %format_date(start_date),
        event_count = events.len(),
        "Events materialized"
    );

    Ok(events)
}

fn event_date(start_date: NaiveDate, months: u32) -> Result<NaiveDate> {
    add_months(start_date, months).ok_or_else(|| {
        VestingError::validation(format!(
            "{} + {} months is out of the supported date range",
            format_date(start_date),
            months
        ))
    })
}
