//! Period planning
//!
//! Turns schedule parameters into a period count and the month offset of
//! every milestone. Both the event materializer and milestone generation
//! read offsets from here, so they cannot drift apart.

use serde::Serialize;
use vesting_api::{DistributionMode, Frequency, Milestone, ScheduleDefinition};
use vesting_util::{Result, VestingError};

use crate::ResolvedSchedule;

/// Number of post-cliff periods.
///
/// Percentage mode floors so no short trailing period exists; even mode
/// ceils so the tail is populated too. A cliff at or past the duration
/// leaves no periods.
pub fn plan_periods(
    total_duration_months: u32,
    cliff_months: u32,
    frequency_months: u32,
    mode: DistributionMode,
) -> u32 {
    if frequency_months == 0 {
        return 0;
    }

    let remaining = total_duration_months.saturating_sub(cliff_months);
    match mode {
        DistributionMode::Percentage => remaining / frequency_months,
        DistributionMode::Even => remaining.div_ceil(frequency_months),
    }
}

/// Reject parameters no schedule can be built from
pub fn validate_schedule_params(total_duration_months: u32, cliff_months: u32) -> Result<()> {
    if total_duration_months == 0 {
        return Err(VestingError::validation(
            "total_duration_months must be positive",
        ));
    }
    if cliff_months > total_duration_months {
        return Err(VestingError::validation(format!(
            "cliff_months ({}) exceeds total_duration_months ({})",
            cliff_months, total_duration_months
        )));
    }
    Ok(())
}

/// Planned shape of a schedule under one distribution mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodPlan {
    pub cliff_months: u32,
    pub frequency_months: u32,
    pub period_count: u32,
    pub distribution_mode: DistributionMode,
}

impl PeriodPlan {
    pub fn new(
        total_duration_months: u32,
        cliff_months: u32,
        frequency: Frequency,
        mode: DistributionMode,
    ) -> Result<Self> {
        validate_schedule_params(total_duration_months, cliff_months)?;

        let frequency_months = frequency.months();
        Ok(Self {
            cliff_months,
            frequency_months,
            period_count: plan_periods(total_duration_months, cliff_months, frequency_months, mode),
            distribution_mode: mode,
        })
    }

    pub fn from_resolved(resolved: &ResolvedSchedule) -> Result<Self> {
        Self::new(
            resolved.total_duration_months,
            resolved.cliff_months,
            resolved.frequency,
            resolved.distribution_mode,
        )
    }

    /// Plan a template schedule for the mode a grant actually requests
    pub fn for_schedule(schedule: &ScheduleDefinition, mode: DistributionMode) -> Result<Self> {
        Self::new(
            schedule.total_duration_months,
            schedule.cliff_months,
            schedule.frequency,
            mode,
        )
    }

    pub fn has_cliff(&self) -> bool {
        self.cliff_months > 0
    }

    /// Number of milestones (and non-degenerate events) the plan produces
    pub fn expected_count(&self) -> usize {
        usize::from(self.has_cliff()) + self.period_count as usize
    }

    /// Month offset of post-cliff period `i` (1-based)
    pub fn period_offset(&self, i: u32) -> Option<u32> {
        i.checked_mul(self.frequency_months)?
            .checked_add(self.cliff_months)
    }

    /// Month offsets of every milestone in order, cliff first
    pub fn offsets(&self) -> Result<Vec<u32>> {
        let mut offsets = Vec::with_capacity(self.expected_count());
        if self.has_cliff() {
            offsets.push(self.cliff_months);
        }
        for i in 1..=self.period_count {
            let offset = self.period_offset(i).ok_or_else(|| {
                VestingError::validation(format!("period {} offset overflows", i))
            })?;
            offsets.push(offset);
        }
        Ok(offsets)
    }
}

/// Milestone template for a plan.
///
/// Percentage mode records 25% at the cliff (100% when there are no
/// periods) and splits the rest evenly; even mode records no percentages.
pub fn build_milestones(plan: &PeriodPlan) -> Result<Vec<Milestone>> {
    let percentages = milestone_percentages(plan);

    Ok(plan
        .offsets()?
        .into_iter()
        .zip(percentages)
        .enumerate()
        .map(|(order, (months, vesting_percentage))| Milestone {
            sequence_order: order as u32,
            months_from_start: Some(months),
            vesting_percentage,
        })
        .collect())
}

fn milestone_percentages(plan: &PeriodPlan) -> Vec<Option<f64>> {
    let count = plan.expected_count();
    if plan.distribution_mode == DistributionMode::Even {
        return vec![None; count];
    }

    let periods = plan.period_count as usize;
    let mut percentages = Vec::with_capacity(count);
    if plan.has_cliff() {
        percentages.push(Some(if periods == 0 { 100.0 } else { 25.0 }));
        percentages.extend(std::iter::repeat_n(Some(75.0 / periods as f64), periods));
    } else if periods > 0 {
        percentages.extend(std::iter::repeat_n(Some(100.0 / periods as f64), periods));
    }
    percentages
}
