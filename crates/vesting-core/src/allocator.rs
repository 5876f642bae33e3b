//! Share allocation

use serde::Serialize;
use vesting_api::DistributionMode;
use vesting_util::{Result, VestingError};

/// Integer share amounts for a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Allocation {
    pub total_shares: u64,
    pub has_cliff: bool,
    pub cliff_shares: u64,
    pub per_period_shares: u64,
    pub period_count: u32,
}

/// Split `total_shares` between the cliff and the periods.
///
/// `cliff_shares + period_count * per_period_shares` never exceeds the
/// total; [`Allocation::event_shares`] hands the remainder to the last event.
pub fn allocate(
    total_shares: u64,
    cliff_months: u32,
    period_count: u32,
    mode: DistributionMode,
) -> Result<Allocation> {
    if total_shares == 0 {
        return Err(VestingError::validation("total_shares must be positive"));
    }

    let has_cliff = cliff_months > 0;
    let periods = u64::from(period_count);

    let cliff_shares = match (has_cliff, mode) {
        (false, _) => 0,
        // Nothing left to spread over, so the cliff carries it all
        (true, _) if periods == 0 => total_shares,
        (true, DistributionMode::Percentage) => total_shares / 4,
        (true, DistributionMode::Even) => total_shares / (periods + 1),
    };

    let per_period_shares = if periods == 0 {
        0
    } else {
        (total_shares - cliff_shares) / periods
    };

    Ok(Allocation {
        total_shares,
        has_cliff,
        cliff_shares,
        per_period_shares,
        period_count,
    })
}

impl Allocation {
    /// Shares of every event in order, cliff first.
    ///
    /// The final event takes whatever the earlier ones left, so the
    /// amounts always sum to the total. With neither a cliff nor periods
    /// a single event carries the full amount.
    pub fn event_shares(&self) -> Vec<u64> {
        let count = usize::from(self.has_cliff) + self.period_count as usize;
        if count == 0 {
            return vec![self.total_shares];
        }

        let mut shares = Vec::with_capacity(count);
        if self.has_cliff {
            shares.push(self.cliff_shares);
        }
        shares.extend(std::iter::repeat_n(
            self.per_period_shares,
            self.period_count as usize,
        ));

        let prior: u64 = shares[..count - 1].iter().sum();
        shares[count - 1] = self.total_shares - prior;
        shares
    }
}
