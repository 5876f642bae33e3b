//! Display status projection
//!
//! The only place an event is compared against a date. Callers pass the
//! observation date in; nothing here reads the clock or writes back.

use chrono::NaiveDate;
use vesting_api::{DisplayStatus, EventView, LifecycleStatus, VestingEvent};

/// Project the display status of one event as of `observation_date`
pub fn project(event: &VestingEvent, observation_date: NaiveDate) -> DisplayStatus {
    if let Some(status) = event.lifecycle_status.terminal_display() {
        return status;
    }

    let vested_on_record = event
        .actual_vest_date
        .is_some_and(|date| date <= observation_date);

    if event.lifecycle_status == LifecycleStatus::Vested || vested_on_record {
        DisplayStatus::Vested
    } else if event.event_date <= observation_date {
        DisplayStatus::PendingDue
    } else {
        DisplayStatus::Upcoming
    }
}

/// Pair every event with its projected status
pub fn project_all(events: &[VestingEvent], observation_date: NaiveDate) -> Vec<EventView> {
    events
        .iter()
        .map(|event| EventView {
            event: event.clone(),
            display_status: project(event, observation_date),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vesting_api::EventType;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(status: LifecycleStatus) -> VestingEvent {
        VestingEvent {
            sequence_number: 1,
            event_date: date(2025, 1, 1),
            shares: 2500,
            cumulative_shares: 2500,
            event_type: EventType::Cliff,
            lifecycle_status: status,
            actual_vest_date: None,
        }
    }

    #[test]
    fn test_past_pending_event_is_due_until_vested() {
        let observed = date(2025, 6, 1);
        let mut e = event(LifecycleStatus::Pending);
        assert_eq!(project(&e, observed), DisplayStatus::PendingDue);

        // An external process marks it vested; amounts and dates untouched
        e.lifecycle_status = LifecycleStatus::Vested;
        assert_eq!(project(&e, observed), DisplayStatus::Vested);
        assert_eq!(e.shares, 2500);
        assert_eq!(e.event_date, date(2025, 1, 1));
    }

    #[test]
    fn test_event_on_observation_date_is_due() {
        let e = event(LifecycleStatus::Pending);
        assert_eq!(project(&e, date(2025, 1, 1)), DisplayStatus::PendingDue);
        assert_eq!(project(&e, date(2024, 12, 31)), DisplayStatus::Upcoming);
    }

    #[test]
    fn test_terminal_statuses_win() {
        let observed = date(2030, 1, 1);
        let cases = [
            (LifecycleStatus::Transferred, DisplayStatus::Transferred),
            (LifecycleStatus::Exercised, DisplayStatus::Exercised),
            (LifecycleStatus::Cancelled, DisplayStatus::Cancelled),
            (LifecycleStatus::Forfeited, DisplayStatus::Forfeited),
        ];
        for (status, expected) in cases {
            let mut e = event(status);
            e.actual_vest_date = Some(date(2025, 1, 2));
            assert_eq!(project(&e, observed), expected);
        }
    }

    #[test]
    fn test_actual_vest_date_counts_once_reached() {
        let mut e = event(LifecycleStatus::Pending);
        e.event_date = date(2026, 1, 1);
        e.actual_vest_date = Some(date(2025, 12, 15));

        assert_eq!(project(&e, date(2025, 12, 1)), DisplayStatus::Upcoming);
        assert_eq!(project(&e, date(2025, 12, 15)), DisplayStatus::Vested);
    }

    #[test]
    fn test_project_all_keeps_order() {
        let mut later = event(LifecycleStatus::Pending);
        later.sequence_number = 2;
        later.event_date = date(2026, 1, 1);

        let views = project_all(&[event(LifecycleStatus::Vested), later], date(2025, 6, 1));
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].display_status, DisplayStatus::Vested);
        assert_eq!(views[1].display_status, DisplayStatus::Upcoming);
        assert_eq!(views[1].event.sequence_number, 2);
    }
}
