//! Schedule summary for display

use chrono::NaiveDate;
use vesting_api::ScheduleSummary;
use vesting_util::{add_months, format_date, Result, VestingError};

use crate::ResolvedSchedule;

/// Summarize a resolved schedule, independent of the event list
pub fn summarize(resolved: &ResolvedSchedule, start_date: NaiveDate) -> Result<ScheduleSummary> {
    let cliff_date = if resolved.cliff_months > 0 {
        let date = add_months(start_date, resolved.cliff_months).ok_or_else(|| {
            VestingError::validation(format!(
                "cliff date of {} + {} months is out of range",
                format_date(start_date),
                resolved.cliff_months
            ))
        })?;
        Some(date)
    } else {
        None
    };

    Ok(ScheduleSummary {
        cliff_months: resolved.cliff_months,
        frequency: resolved.frequency,
        vesting_kind: resolved.event_kind,
        vesting_years: f64::from(resolved.total_duration_months) / 12.0,
        cliff_date,
    })
}
