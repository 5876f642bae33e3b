//! Milestone reconciliation
//!
//! Decides whether a persisted milestone set can be reused. This module
//! only judges; replacing a stale set is the engine's job.

use serde::Serialize;
use std::fmt;
use vesting_api::Milestone;

const PERCENTAGE_TOLERANCE: f64 = 1e-6;

/// Why a persisted milestone set was judged stale
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StaleReason {
    CountMismatch { expected: usize, found: usize },
    MissingOffset { sequence_order: u32 },
    ZeroOffset { sequence_order: u32 },
    IdenticalOffsets { months: u32 },
    NotIncreasing { sequence_order: u32 },
    SpacingMismatch {
        sequence_order: u32,
        expected: u32,
        found: u32,
    },
    PercentageMismatch { sequence_order: u32 },
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaleReason::CountMismatch { expected, found } => {
                write!(f, "expected {} milestones, found {}", expected, found)
            }
            StaleReason::MissingOffset { sequence_order } => {
                write!(f, "milestone {} has no months_from_start", sequence_order)
            }
            StaleReason::ZeroOffset { sequence_order } => {
                write!(f, "milestone {} is at month 0", sequence_order)
            }
            StaleReason::IdenticalOffsets { months } => {
                write!(f, "every milestone is at month {}", months)
            }
            StaleReason::NotIncreasing { sequence_order } => {
                write!(f, "milestone {} does not advance past its predecessor", sequence_order)
            }
            StaleReason::SpacingMismatch {
                sequence_order,
                expected,
                found,
            } => write!(
                f,
                "milestone {} is at month {}, expected {}",
                sequence_order, found, expected
            ),
            StaleReason::PercentageMismatch { sequence_order } => {
                write!(f, "milestone {} has the wrong vesting percentage", sequence_order)
            }
        }
    }
}

/// Outcome of checking a persisted milestone set
#[derive(Debug, Clone, PartialEq)]
pub enum MilestoneCheck {
    Valid,
    Stale(Vec<StaleReason>),
}

impl MilestoneCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, MilestoneCheck::Valid)
    }
}

/// Compare persisted milestones against the freshly planned set.
///
/// `expected` must be built for the distribution mode the grant actually
/// requests, since the two modes plan different counts and percentages.
pub fn check_milestones(persisted: &[Milestone], expected: &[Milestone]) -> MilestoneCheck {
    let mut reasons = Vec::new();

    if persisted.len() != expected.len() {
        reasons.push(StaleReason::CountMismatch {
            expected: expected.len(),
            found: persisted.len(),
        });
    }

    let mut offsets = Vec::with_capacity(persisted.len());
    for m in persisted {
        match m.months_from_start {
            None => reasons.push(StaleReason::MissingOffset {
                sequence_order: m.sequence_order,
            }),
            Some(0) => reasons.push(StaleReason::ZeroOffset {
                sequence_order: m.sequence_order,
            }),
            Some(months) => offsets.push((m.sequence_order, months)),
        }
    }

    if offsets.len() > 1 && offsets.iter().all(|&(_, months)| months == offsets[0].1) {
        reasons.push(StaleReason::IdenticalOffsets {
            months: offsets[0].1,
        });
    } else {
        for pair in offsets.windows(2) {
            if pair[1].1 <= pair[0].1 {
                reasons.push(StaleReason::NotIncreasing {
                    sequence_order: pair[1].0,
                });
            }
        }
    }

    // Position-by-position comparison only means something once the
    // shape is intact
    if reasons.is_empty() {
        for (found, want) in persisted.iter().zip(expected) {
            if let (Some(found_months), Some(want_months)) =
                (found.months_from_start, want.months_from_start)
                && found_months != want_months
            {
                reasons.push(StaleReason::SpacingMismatch {
                    sequence_order: found.sequence_order,
                    expected: want_months,
                    found: found_months,
                });
            }

            if !same_percentage(found.vesting_percentage, want.vesting_percentage) {
                reasons.push(StaleReason::PercentageMismatch {
                    sequence_order: found.sequence_order,
                });
            }
        }
    }

    if reasons.is_empty() {
        MilestoneCheck::Valid
    } else {
        MilestoneCheck::Stale(reasons)
    }
}

fn same_percentage(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => (a - b).abs() < PERCENTAGE_TOLERANCE,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_milestones, PeriodPlan};
    use vesting_api::{DistributionMode, Frequency};

    fn expected(mode: DistributionMode) -> Vec<Milestone> {
        let plan = PeriodPlan::new(48, 12, Frequency::Annually, mode).unwrap();
        build_milestones(&plan).unwrap()
    }

    fn milestone(order: u32, months: Option<u32>) -> Milestone {
        Milestone {
            sequence_order: order,
            months_from_start: months,
            vesting_percentage: None,
        }
    }

    #[test]
    fn test_matching_set_is_valid() {
        let want = expected(DistributionMode::Percentage);
        assert!(check_milestones(&want, &want).is_valid());
    }

    #[test]
    fn test_count_mismatch_is_stale() {
        let want = expected(DistributionMode::Percentage);
        let persisted: Vec<_> = (0..5).map(|i| milestone(i, Some(12 * (i + 1)))).collect();

        match check_milestones(&persisted, &want) {
            MilestoneCheck::Stale(reasons) => assert!(reasons.contains(&StaleReason::CountMismatch {
                expected: 4,
                found: 5
            })),
            MilestoneCheck::Valid => panic!("five milestones must not match four"),
        }
    }

    #[test]
    fn test_empty_set_is_stale_when_milestones_expected() {
        let want = expected(DistributionMode::Even);
        assert!(!check_milestones(&[], &want).is_valid());
        assert!(check_milestones(&[], &[]).is_valid());
    }

    #[test]
    fn test_missing_and_zero_offsets() {
        let want = expected(DistributionMode::Even);
        let persisted = vec![
            milestone(0, Some(0)),
            milestone(1, None),
            milestone(2, Some(36)),
            milestone(3, Some(48)),
        ];

        let MilestoneCheck::Stale(reasons) = check_milestones(&persisted, &want) else {
            panic!("expected stale");
        };
        assert!(reasons.contains(&StaleReason::ZeroOffset { sequence_order: 0 }));
        assert!(reasons.contains(&StaleReason::MissingOffset { sequence_order: 1 }));
    }

    #[test]
    fn test_identical_offsets() {
        let want = expected(DistributionMode::Even);
        let persisted: Vec<_> = (0..4).map(|i| milestone(i, Some(12))).collect();

        let MilestoneCheck::Stale(reasons) = check_milestones(&persisted, &want) else {
            panic!("expected stale");
        };
        assert_eq!(reasons, vec![StaleReason::IdenticalOffsets { months: 12 }]);
    }

    #[test]
    fn test_spacing_mismatch() {
        let want = expected(DistributionMode::Even);
        // Right count, increasing, but monthly instead of annual spacing
        let persisted: Vec<_> = (0..4).map(|i| milestone(i, Some(12 + i))).collect();

        let MilestoneCheck::Stale(reasons) = check_milestones(&persisted, &want) else {
            panic!("expected stale");
        };
        assert_eq!(reasons.len(), 3);
        assert!(matches!(
            reasons[0],
            StaleReason::SpacingMismatch {
                sequence_order: 1,
                expected: 24,
                found: 13
            }
        ));
    }

    #[test]
    fn test_set_built_for_other_mode_is_stale() {
        let pct = expected(DistributionMode::Percentage);
        let even = expected(DistributionMode::Even);
        assert_eq!(pct.len(), even.len());

        assert!(!check_milestones(&pct, &even).is_valid());
        assert!(!check_milestones(&even, &pct).is_valid());
    }

    #[test]
    fn test_reason_display() {
        let reason = StaleReason::CountMismatch {
            expected: 4,
            found: 5,
        };
        assert_eq!(reason.to_string(), "expected 4 milestones, found 5");
    }
}
