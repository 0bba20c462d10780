//! Overtime submission and computed overtime entry models.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The kind of day an overtime entry was worked on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OvertimeDayType {
    /// A regular working day.
    #[default]
    Ordinary,
    /// A Sunday.
    Sunday,
    /// A public holiday.
    Holiday,
}

impl OvertimeDayType {
    /// True for days paid at the Sunday/holiday multiplier.
    pub fn is_premium(self) -> bool {
        matches!(self, OvertimeDayType::Sunday | OvertimeDayType::Holiday)
    }
}

/// Uniqueness key of an overtime entry: (employee, date, start time).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OvertimeKey {
    /// The employee.
    pub employee_id: String,
    /// The date worked.
    pub date: NaiveDate,
    /// The start time.
    pub start_time: NaiveTime,
}

/// Overtime as submitted by a supervisor, before computation.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{OvertimeDayType, OvertimeSubmission};
///
/// let submission: OvertimeSubmission = serde_json::from_value(serde_json::json!({
///     "employee_id": "emp_001",
///     "date": "2025-03-09",
///     "start_time": "08:00:00",
///     "end_time": "12:30:00",
///     "approved_by": "Chef de site",
///     "day_type": "sunday"
/// })).unwrap();
/// assert_eq!(submission.day_type, OvertimeDayType::Sunday);
/// assert_eq!(submission.hourly_rate, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeSubmission {
    /// The employee who worked the overtime.
    pub employee_id: String,
    /// The date worked.
    pub date: NaiveDate,
    /// Start time on `date`.
    pub start_time: NaiveTime,
    /// End time on the same date.
    pub end_time: NaiveTime,
    /// Name of the approver.
    #[serde(default)]
    pub approved_by: Option<String>,
    /// Ordinary day or Sunday/holiday.
    #[serde(default)]
    pub day_type: OvertimeDayType,
    /// Explicit hourly rate overriding the employee's rate.
    #[serde(default)]
    pub hourly_rate: Option<Decimal>,
}

impl OvertimeSubmission {
    /// Returns the uniqueness key of this submission.
    pub fn key(&self) -> OvertimeKey {
        OvertimeKey {
            employee_id: self.employee_id.clone(),
            date: self.date,
            start_time: self.start_time,
        }
    }
}

/// A validated overtime entry with its computed duration and amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeEntry {
    /// The employee who worked the overtime.
    pub employee_id: String,
    /// The date worked.
    pub date: NaiveDate,
    /// Start time on `date`.
    pub start_time: NaiveTime,
    /// End time on the same date.
    pub end_time: NaiveTime,
    /// Name of the approver.
    pub approved_by: Option<String>,
    /// Ordinary day or Sunday/holiday.
    pub day_type: OvertimeDayType,
    /// Duration in hours, rounded to hundredths.
    pub duration_hours: Decimal,
    /// Hourly rate applied before the multiplier.
    pub hourly_rate: Decimal,
    /// Multiplier selected by `day_type`.
    pub multiplier: Decimal,
    /// duration × hourly rate × multiplier.
    pub amount: Decimal,
    /// False when no hourly rate could be resolved and the amount degraded to zero.
    pub rate_configured: bool,
}

impl OvertimeEntry {
    /// Returns the uniqueness key of this entry.
    pub fn key(&self) -> OvertimeKey {
        OvertimeKey {
            employee_id: self.employee_id.clone(),
            date: self.date,
            start_time: self.start_time,
        }
    }
}
