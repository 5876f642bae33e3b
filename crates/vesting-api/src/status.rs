//! Lifecycle and display statuses

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::VestingEvent;

/// Persisted lifecycle status, owned by external business processes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStatus {
    #[default]
    Pending,
    Vested,
    Transferred,
    Exercised,
    Forfeited,
    Cancelled,
}

impl LifecycleStatus {
    /// Display status for statuses set by a terminal business process.
    /// These are never overridden by date-based projection.
    pub fn terminal_display(self) -> Option<DisplayStatus> {
        match self {
            LifecycleStatus::Transferred => Some(DisplayStatus::Transferred),
            LifecycleStatus::Exercised => Some(DisplayStatus::Exercised),
            LifecycleStatus::Forfeited => Some(DisplayStatus::Forfeited),
            LifecycleStatus::Cancelled => Some(DisplayStatus::Cancelled),
            LifecycleStatus::Pending | LifecycleStatus::Vested => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleStatus::Pending => "pending",
            LifecycleStatus::Vested => "vested",
            LifecycleStatus::Transferred => "transferred",
            LifecycleStatus::Exercised => "exercised",
            LifecycleStatus::Forfeited => "forfeited",
            LifecycleStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(LifecycleStatus::Pending),
            "vested" => Some(LifecycleStatus::Vested),
            "transferred" => Some(LifecycleStatus::Transferred),
            "exercised" => Some(LifecycleStatus::Exercised),
            "forfeited" => Some(LifecycleStatus::Forfeited),
            "cancelled" => Some(LifecycleStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation-facing status, recomputed on every read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStatus {
    Vested,
    Transferred,
    Exercised,
    /// Scheduled date has passed but the vesting run hasn't processed it
    PendingDue,
    Upcoming,
    Forfeited,
    Cancelled,
}

impl fmt::Display for DisplayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DisplayStatus::Vested => "vested",
            DisplayStatus::Transferred => "transferred",
            DisplayStatus::Exercised => "exercised",
            DisplayStatus::PendingDue => "pending_due",
            DisplayStatus::Upcoming => "upcoming",
            DisplayStatus::Forfeited => "forfeited",
            DisplayStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// An event paired with its projected display status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventView {
    #[serde(flatten)]
    pub event: VestingEvent,
    pub display_status: DisplayStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        use LifecycleStatus::*;
        for status in [Transferred, Exercised, Forfeited, Cancelled] {
            assert!(status.terminal_display().is_some(), "{status}");
        }
        assert_eq!(Forfeited.terminal_display(), Some(DisplayStatus::Forfeited));
        assert_eq!(Pending.terminal_display(), None);
        assert_eq!(Vested.terminal_display(), None);
    }

    #[test]
    fn display_status_serialization() {
        let json = serde_json::to_string(&DisplayStatus::PendingDue).unwrap();
        assert_eq!(json, "\"pending_due\"");
        assert_eq!(DisplayStatus::PendingDue.to_string(), "pending_due");
    }
}
