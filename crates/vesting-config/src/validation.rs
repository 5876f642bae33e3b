//! Ledger validation

use crate::schema::{RawConfig, RawGrant, RawPlan, RawSchedule};
use std::collections::HashSet;
use thiserror::Error;
use vesting_api::{DistributionMode, Frequency, ScheduleKind};
use vesting_util::parse_date;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Schedule '{schedule_id}': {message}")]
    ScheduleError { schedule_id: String, message: String },

    #[error("Plan '{plan_id}': {message}")]
    PlanError { plan_id: String, message: String },

    #[error("Grant '{grant_id}': {message}")]
    GrantError { grant_id: String, message: String },

    #[error("Duplicate {kind} ID: {id}")]
    DuplicateId { kind: &'static str, id: String },

    #[error("{owner} references unknown {kind} '{id}'")]
    UnknownReference {
        owner: String,
        kind: &'static str,
        id: String,
    },
}

/// Validate a raw ledger, collecting every problem found
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let schedule_ids = collect_ids(
        config.schedules.iter().map(|s| s.id.as_str()),
        "schedule",
        &mut errors,
    );
    let plan_ids = collect_ids(config.plans.iter().map(|p| p.id.as_str()), "plan", &mut errors);
    collect_ids(config.grants.iter().map(|g| g.id.as_str()), "grant", &mut errors);

    for schedule in &config.schedules {
        errors.extend(validate_schedule(schedule));
    }

    for plan in &config.plans {
        errors.extend(validate_plan(plan, &schedule_ids));
    }

    for grant in &config.grants {
        errors.extend(validate_grant(grant, &schedule_ids, &plan_ids));
    }

    errors
}

fn collect_ids<'a>(
    ids: impl Iterator<Item = &'a str>,
    kind: &'static str,
    errors: &mut Vec<ValidationError>,
) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            errors.push(ValidationError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    seen
}

fn validate_schedule(schedule: &RawSchedule) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut fail = |message: String| {
        errors.push(ValidationError::ScheduleError {
            schedule_id: schedule.id.clone(),
            message,
        })
    };

    if let Err(e) = check_months(schedule.duration_months, schedule.cliff_months) {
        fail(e);
    }
    if let Err(e) = parse_frequency(&schedule.frequency) {
        fail(e);
    }
    if let Some(mode) = &schedule.distribution_mode
        && let Err(e) = parse_distribution_mode(mode)
    {
        fail(e);
    }
    if let Some(kind) = &schedule.kind
        && let Err(e) = parse_kind(kind)
    {
        fail(e);
    }

    errors
}

fn validate_plan(plan: &RawPlan, schedule_ids: &HashSet<&str>) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(schedule) = &plan.schedule
        && !schedule_ids.contains(schedule.as_str())
    {
        errors.push(ValidationError::UnknownReference {
            owner: format!("Plan '{}'", plan.id),
            kind: "schedule",
            id: schedule.clone(),
        });
    }

    let mut fail = |message: String| {
        errors.push(ValidationError::PlanError {
            plan_id: plan.id.clone(),
            message,
        })
    };

    if let Some(kind) = &plan.kind
        && let Err(e) = parse_kind(kind)
    {
        fail(e);
    }

    if let Some(fallback) = &plan.fallback {
        match fallback.years.checked_mul(12) {
            Some(months) => {
                if let Err(e) = check_months(months, fallback.cliff_months) {
                    fail(format!("fallback: {}", e));
                }
            }
            None => fail("fallback: years is too large".into()),
        }
        if let Err(e) = parse_frequency(&fallback.frequency) {
            fail(format!("fallback: {}", e));
        }
    }

    errors
}

fn validate_grant(
    grant: &RawGrant,
    schedule_ids: &HashSet<&str>,
    plan_ids: &HashSet<&str>,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let owner = || format!("Grant '{}'", grant.id);

    if let Some(schedule) = &grant.schedule
        && !schedule_ids.contains(schedule.as_str())
    {
        errors.push(ValidationError::UnknownReference {
            owner: owner(),
            kind: "schedule",
            id: schedule.clone(),
        });
    }
    if let Some(plan) = &grant.plan
        && !plan_ids.contains(plan.as_str())
    {
        errors.push(ValidationError::UnknownReference {
            owner: owner(),
            kind: "plan",
            id: plan.clone(),
        });
    }

    let mut fail = |message: String| {
        errors.push(ValidationError::GrantError {
            grant_id: grant.id.clone(),
            message,
        })
    };

    if grant.plan.is_none() && grant.schedule.is_none() {
        fail("grant needs a plan or a schedule".into());
    }
    if grant.total_shares <= 0 {
        fail(format!("total_shares must be positive, got {}", grant.total_shares));
    }
    if let Err(e) = parse_date(&grant.vesting_start_date) {
        fail(format!("vesting_start_date: {}", e));
    }
    if let Some(mode) = &grant.distribution_mode
        && let Err(e) = parse_distribution_mode(mode)
    {
        fail(e);
    }

    errors
}

/// Check duration and cliff bounds
pub fn check_months(duration_months: u32, cliff_months: u32) -> Result<(), String> {
    if duration_months == 0 {
        return Err("duration must be at least one month".into());
    }
    if cliff_months > duration_months {
        return Err(format!(
            "cliff_months ({}) exceeds duration ({} months)",
            cliff_months, duration_months
        ));
    }
    Ok(())
}

/// Parse a frequency name
pub fn parse_frequency(s: &str) -> Result<Frequency, String> {
    Frequency::parse(s).ok_or_else(|| format!("Unknown frequency: {}", s))
}

/// Parse a distribution mode name
pub fn parse_distribution_mode(s: &str) -> Result<DistributionMode, String> {
    DistributionMode::parse(s).ok_or_else(|| format!("Unknown distribution mode: {}", s))
}

/// Parse a schedule kind name
pub fn parse_kind(s: &str) -> Result<ScheduleKind, String> {
    ScheduleKind::parse(s).ok_or_else(|| format!("Unknown schedule kind: {}", s))
}
