//! Monthly pay period model.
//!
//! This module contains the [`PayPeriod`] type and the proleptic Gregorian
//! calendar helpers used to enumerate the days of a payroll month.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Returns true when `year` is a Gregorian leap year.
///
/// # Example
///
/// ```
/// use payroll_engine::models::is_leap_year;
///
/// assert!(is_leap_year(2024));
/// assert!(!is_leap_year(1900));
/// assert!(is_leap_year(2000));
/// ```
pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Returns the number of days in `month` of `year`.
///
/// Returns `InvalidPeriod` when the month is outside 1-12.
///
/// # Example
///
/// ```
/// use payroll_engine::models::days_in_month;
///
/// assert_eq!(days_in_month(2024, 2).unwrap(), 29);
/// assert_eq!(days_in_month(2025, 2).unwrap(), 28);
/// assert_eq!(days_in_month(2025, 4).unwrap(), 30);
/// assert!(days_in_month(2025, 13).is_err());
/// ```
pub fn days_in_month(year: i32, month: u32) -> EngineResult<u32> {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => Ok(31),
        4 | 6 | 9 | 11 => Ok(30),
        2 if is_leap_year(year) => Ok(29),
        2 => Ok(28),
        _ => Err(EngineError::InvalidPeriod { month, year }),
    }
}

/// A calendar month for which payroll is computed.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayPeriod;
/// use chrono::NaiveDate;
///
/// let period = PayPeriod::new(2024, 2).unwrap();
/// assert_eq!(period.day_count(), 29);
/// assert!(period.contains_date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
/// assert!(!period.contains_date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PayPeriod {
    /// The year.
    pub year: i32,
    /// The month (1-12).
    pub month: u32,
}

impl PayPeriod {
    /// Creates a validated pay period.
    pub fn new(year: i32, month: u32) -> EngineResult<Self> {
        let period = Self { year, month };
        period.validate()?;
        Ok(period)
    }

    /// Checks that the month is valid and that the whole month is representable.
    pub fn validate(&self) -> EngineResult<()> {
        let days = days_in_month(self.year, self.month)?;
        NaiveDate::from_ymd_opt(self.year, self.month, days).ok_or(EngineError::InvalidPeriod {
            month: self.month,
            year: self.year,
        })?;
        Ok(())
    }

    /// Number of days in the period.
    ///
    /// Returns zero for an unvalidated period with an out-of-range month.
    pub fn day_count(&self) -> u32 {
        days_in_month(self.year, self.month).unwrap_or(0)
    }

    /// First day of the period.
    pub fn first_day(&self) -> EngineResult<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).ok_or(EngineError::InvalidPeriod {
            month: self.month,
            year: self.year,
        })
    }

    /// Last day of the period.
    pub fn last_day(&self) -> EngineResult<NaiveDate> {
        let days = days_in_month(self.year, self.month)?;
        NaiveDate::from_ymd_opt(self.year, self.month, days).ok_or(EngineError::InvalidPeriod {
            month: self.month,
            year: self.year,
        })
    }

    /// Every date of the period, in order.
    pub fn dates(&self) -> EngineResult<Vec<NaiveDate>> {
        let first = self.first_day()?;
        Ok(first
            .iter_days()
            .take(self.day_count() as usize)
            .collect())
    }

    /// Checks if a given date falls within this period.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}
