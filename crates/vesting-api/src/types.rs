//! Schedule enums shared across the vesting engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Calendar interval between post-cliff vesting events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Monthly,
    Quarterly,
    #[serde(alias = "annual", alias = "yearly")]
    Annually,
}

impl Frequency {
    /// Number of calendar months in one period
    pub fn months(self) -> u32 {
        match self {
            Frequency::Monthly => 1,
            Frequency::Quarterly => 3,
            Frequency::Annually => 12,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Annually => "annually",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "monthly" => Some(Frequency::Monthly),
            "quarterly" => Some(Frequency::Quarterly),
            "annually" | "annual" | "yearly" => Some(Frequency::Annually),
            _ => None,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How shares are split across the cliff and the periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionMode {
    /// Fixed 25% at the cliff, 75% spread over whole periods
    #[default]
    Percentage,
    /// Cliff is one more equal slice; trailing partial period included
    Even,
}

impl DistributionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DistributionMode::Percentage => "percentage",
            DistributionMode::Even => "even",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "percentage" | "percent" => Some(DistributionMode::Percentage),
            "even" => Some(DistributionMode::Even),
            _ => None,
        }
    }
}

impl fmt::Display for DistributionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a schedule's periods vest on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleKind {
    #[default]
    TimeBased,
    PerformanceBased,
    Hybrid,
}

impl ScheduleKind {
    /// Event type assigned to non-cliff periods.
    ///
    /// There is no hybrid event type downstream; hybrid periods are time-based.
    pub fn period_event_type(self) -> EventType {
        match self {
            ScheduleKind::PerformanceBased => EventType::Performance,
            ScheduleKind::TimeBased | ScheduleKind::Hybrid => EventType::TimeBased,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScheduleKind::TimeBased => "time_based",
            ScheduleKind::PerformanceBased => "performance_based",
            ScheduleKind::Hybrid => "hybrid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "time_based" | "time" => Some(ScheduleKind::TimeBased),
            "performance_based" | "performance" => Some(ScheduleKind::PerformanceBased),
            "hybrid" => Some(ScheduleKind::Hybrid),
            _ => None,
        }
    }
}

impl fmt::Display for ScheduleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a single vesting event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Cliff,
    TimeBased,
    Performance,
    Acceleration,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Cliff => "cliff",
            EventType::TimeBased => "time_based",
            EventType::Performance => "performance",
            EventType::Acceleration => "acceleration",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cliff" => Some(EventType::Cliff),
            "time_based" => Some(EventType::TimeBased),
            "performance" => Some(EventType::Performance),
            "acceleration" => Some(EventType::Acceleration),
            _ => None,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
