//! Calendar utilities for the vesting engine
//!
//! All schedule arithmetic is done in whole calendar months on `NaiveDate`.
//! Adding months preserves the day of month where the target month has it
//! and clamps to the last day otherwise (Jan 31 + 1 month = Feb 28/29).
//!
//! # Mock Date for Development
//!
//! In debug builds, the `VESTING_MOCK_DATE` environment variable overrides
//! the date returned by [`today`]. This is useful for checking how event
//! statuses project on a given day.
//!
//! Format: `YYYY-MM-DD` (e.g., `2026-03-31`)
//!
//! Example:
//! ```bash
//! VESTING_MOCK_DATE="2026-03-31" vestctl status g-001
//! ```

use chrono::{Local, Months, NaiveDate};
use std::sync::OnceLock;

/// Environment variable name for the mock date (debug builds only)
pub const MOCK_DATE_ENV_VAR: &str = "VESTING_MOCK_DATE";

/// Date format used in ledgers, the database and CLI output
pub const DATE_FORMAT: &str = "%Y-%m-%d";

static MOCK_DATE: OnceLock<Option<NaiveDate>> = OnceLock::new();

fn get_mock_date() -> Option<NaiveDate> {
    *MOCK_DATE.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            if let Ok(mock_date_str) = std::env::var(MOCK_DATE_ENV_VAR) {
                match NaiveDate::parse_from_str(&mock_date_str, DATE_FORMAT) {
                    Ok(date) => {
                        tracing::info!(mock_date = %date, "Mock date enabled");
                        return Some(date);
                    }
                    Err(_) => {
                        tracing::warn!(
                            mock_date = %mock_date_str,
                            expected_format = DATE_FORMAT,
                            "Invalid mock date format"
                        );
                    }
                }
            }
            None
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Returns whether the mock date is currently active.
pub fn is_mock_date_active() -> bool {
    get_mock_date().is_some()
}

/// Get the current local date, respecting `VESTING_MOCK_DATE` in debug builds.
///
/// Status projection never calls this itself; callers read the date once
/// and pass it down as the observation date.
pub fn today() -> NaiveDate {
    get_mock_date().unwrap_or_else(|| Local::now().date_naive())
}

/// Add whole calendar months to a date.
///
/// Returns `None` if the result falls outside chrono's supported range.
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|e| format!("expected YYYY-MM-DD, got '{}': {}", s, e))
}

/// Format a date as `YYYY-MM-DD`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_add_months_preserves_day() {
        assert_eq!(add_months(date(2024, 1, 15), 1), Some(date(2024, 2, 15)));
        assert_eq!(add_months(date(2024, 1, 1), 12), Some(date(2025, 1, 1)));
        assert_eq!(add_months(date(2024, 1, 1), 0), Some(date(2024, 1, 1)));
    }

    #[test]
    fn test_add_months_clamps_to_month_end() {
        // Leap year
        assert_eq!(add_months(date(2024, 1, 31), 1), Some(date(2024, 2, 29)));
        // Non-leap year
        assert_eq!(add_months(date(2023, 1, 31), 1), Some(date(2023, 2, 28)));
        assert_eq!(add_months(date(2024, 3, 31), 1), Some(date(2024, 4, 30)));
        // Feb 29 + 12 months lands on Feb 28
        assert_eq!(add_months(date(2024, 2, 29), 12), Some(date(2025, 2, 28)));
    }

    #[test]
    fn test_add_months_is_not_chained() {
        // Jan 31 + 2 months is Mar 31, not (Jan 31 + 1) + 1 = Mar 29
        assert_eq!(add_months(date(2024, 1, 31), 2), Some(date(2024, 3, 31)));
    }

    #[test]
    fn test_add_months_overflow() {
        assert_eq!(add_months(NaiveDate::MAX, 1), None);
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-01-01").unwrap(), date(2024, 1, 1));
        assert_eq!(parse_date(" 2024-02-29 ").unwrap(), date(2024, 2, 29));

        let invalid = [
            "2023-02-29", // Not a leap year
            "2024/01/01", // Wrong separator
            "01-01-2024", // Wrong order
            "2024-13-01", // Bad month
            "",
            "not a date",
        ];
        for s in &invalid {
            assert!(parse_date(s).is_err(), "Expected '{}' to fail parsing", s);
        }
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(date(2025, 12, 25)), "2025-12-25");
    }

    #[test]
    fn test_today_returns_reasonable_date() {
        let t = today();
        assert!(t.year() >= 2020);
        assert!(t.year() <= 2100);
    }

    #[test]
    fn test_mock_date_env_var_name() {
        assert_eq!(MOCK_DATE_ENV_VAR, "VESTING_MOCK_DATE");
        // Can't control the env var within a single run due to OnceLock
        let _ = is_mock_date_active();
    }
}
