//! Fiscal period lifecycle and calendar helpers.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tally_shared::types::FiscalPeriodId;

use super::error::FiscalError;

/// Lifecycle state of a fiscal period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodState {
    /// Accepts postings.
    Open,
    /// Temporarily rejects postings; can be unlocked.
    Locked,
    /// Terminal; entries are immutable.
    Closed,
}

impl PeriodState {
    /// Derives the state from the stored flags. The close flag wins.
    #[must_use]
    pub const fn from_flags(is_locked: bool, is_closed: bool) -> Self {
        if is_closed {
            Self::Closed
        } else if is_locked {
            Self::Locked
        } else {
            Self::Open
        }
    }

    /// # Errors
    ///
    /// Returns `AlreadyClosed` or `AlreadyLocked`.
    pub fn validate_lock(self, period: FiscalPeriodId) -> Result<(), FiscalError> {
        match self {
            Self::Open => Ok(()),
            Self::Locked => Err(FiscalError::AlreadyLocked(period)),
            Self::Closed => Err(FiscalError::AlreadyClosed(period)),
        }
    }

    /// # Errors
    ///
    /// Returns `AlreadyClosed` (closed periods never unlock) or `NotLocked`.
    pub fn validate_unlock(self, period: FiscalPeriodId) -> Result<(), FiscalError> {
        match self {
            Self::Locked => Ok(()),
            Self::Open => Err(FiscalError::NotLocked(period)),
            Self::Closed => Err(FiscalError::AlreadyClosed(period)),
        }
    }

    /// # Errors
    ///
    /// Returns `AlreadyClosed`, or `LockRequiredBeforeClose` for an open
    /// period when `require_lock` is set.
    pub fn validate_close(self, period: FiscalPeriodId, require_lock: bool) -> Result<(), FiscalError> {
        match self {
            Self::Closed => Err(FiscalError::AlreadyClosed(period)),
            Self::Open if require_lock => Err(FiscalError::LockRequiredBeforeClose(period)),
            Self::Open | Self::Locked => Ok(()),
        }
    }
}

/// A period not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodDraft {
    /// Display name (e.g. "January 2026").
    pub name: String,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day.
    pub end_date: NaiveDate,
}

/// # Errors
///
/// Returns `InvalidDateRange` if the period ends before it starts.
pub fn validate_date_range(start_date: NaiveDate, end_date: NaiveDate) -> Result<(), FiscalError> {
    if end_date < start_date {
        return Err(FiscalError::InvalidDateRange {
            start: start_date,
            end: end_date,
        });
    }
    Ok(())
}

/// Inclusive date ranges overlap when each starts before the other ends.
#[must_use]
pub fn date_ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && a_end >= b_start
}

/// Twelve calendar-month periods for `year`.
///
/// # Errors
///
/// Returns `InvalidYear` if chrono cannot represent the year.
pub fn monthly_periods(year: i32) -> Result<Vec<PeriodDraft>, FiscalError> {
    (1..=12)
        .map(|month| {
            let start_date =
                NaiveDate::from_ymd_opt(year, month, 1).ok_or(FiscalError::InvalidYear(year))?;
            let end_date = last_day_of_month(start_date).ok_or(FiscalError::InvalidYear(year))?;
            Ok(PeriodDraft {
                name: format!("{} {year}", month_name(start_date.month())),
                start_date,
                end_date,
            })
        })
        .collect()
}

fn last_day_of_month(first: NaiveDate) -> Option<NaiveDate> {
    let next_month = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    next_month?.pred_opt()
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_state_from_flags() {
        assert_eq!(PeriodState::from_flags(false, false), PeriodState::Open);
        assert_eq!(PeriodState::from_flags(true, false), PeriodState::Locked);
        assert_eq!(PeriodState::from_flags(true, true), PeriodState::Closed);
        assert_eq!(PeriodState::from_flags(false, true), PeriodState::Closed);
    }

    #[test]
    fn test_lock_transitions() {
        let id = FiscalPeriodId::new();
        assert!(PeriodState::Open.validate_lock(id).is_ok());
        assert!(matches!(
            PeriodState::Locked.validate_lock(id),
            Err(FiscalError::AlreadyLocked(_))
        ));
        assert!(matches!(
            PeriodState::Closed.validate_lock(id),
            Err(FiscalError::AlreadyClosed(_))
        ));
    }

    #[test]
    fn test_unlock_transitions() {
        let id = FiscalPeriodId::new();
        assert!(PeriodState::Locked.validate_unlock(id).is_ok());
        assert!(matches!(
            PeriodState::Open.validate_unlock(id),
            Err(FiscalError::NotLocked(_))
        ));
        assert!(matches!(
            PeriodState::Closed.validate_unlock(id),
            Err(FiscalError::AlreadyClosed(_))
        ));
    }

    #[test]
    fn test_close_transitions() {
        let id = FiscalPeriodId::new();
        assert!(PeriodState::Open.validate_close(id, false).is_ok());
        assert!(PeriodState::Locked.validate_close(id, true).is_ok());
        assert!(matches!(
            PeriodState::Open.validate_close(id, true),
            Err(FiscalError::LockRequiredBeforeClose(_))
        ));
        assert!(matches!(
            PeriodState::Closed.validate_close(id, false),
            Err(FiscalError::AlreadyClosed(_))
        ));
    }

    #[test]
    fn test_monthly_periods_full_year() {
        let periods = monthly_periods(2028).unwrap();
        assert_eq!(periods.len(), 12);
        assert_eq!(periods[0].name, "January 2028");
        assert_eq!(periods[0].start_date, ymd(2028, 1, 1));
        assert_eq!(periods[1].end_date, ymd(2028, 2, 29));
        assert_eq!(periods[11].end_date, ymd(2028, 12, 31));

        for pair in periods.windows(2) {
            assert_eq!(pair[0].end_date.succ_opt(), Some(pair[1].start_date));
        }
    }

    #[test]
    fn test_date_range() {
        assert!(validate_date_range(ymd(2026, 1, 1), ymd(2026, 1, 1)).is_ok());
        assert!(matches!(
            validate_date_range(ymd(2026, 1, 2), ymd(2026, 1, 1)),
            Err(FiscalError::InvalidDateRange { .. })
        ));
    }

    fn date_strategy() -> impl Strategy<Value = NaiveDate> {
        (2000i32..2100, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| ymd(y, m, d))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_overlap_is_symmetric(
            a in date_strategy(),
            b in date_strategy(),
            c in date_strategy(),
            d in date_strategy(),
        ) {
            let (a_start, a_end) = if a <= b { (a, b) } else { (b, a) };
            let (b_start, b_end) = if c <= d { (c, d) } else { (d, c) };
            prop_assert_eq!(
                date_ranges_overlap(a_start, a_end, b_start, b_end),
                date_ranges_overlap(b_start, b_end, a_start, a_end)
            );
        }

        #[test]
        fn prop_adjacent_ranges_do_not_overlap(start in date_strategy(), days in 0i64..400) {
            let end = start + chrono::Duration::days(days);
            let next_start = end.succ_opt().unwrap();
            let next_end = next_start + chrono::Duration::days(days);
            prop_assert!(!date_ranges_overlap(start, end, next_start, next_end));
        }
    }
}
