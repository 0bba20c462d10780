//! Attendance status codes and daily attendance records.
//!
//! Status codes form a closed set. Each status serializes to a snake_case name
//! and also accepts the short codes used on paper timesheets (`P(Am)`, `A`,
//! `M(Payer)`, `OFF`, ...).

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Daily attendance classification.
///
/// The declaration order is the order used for every per-status listing in
/// payroll output.
///
/// # Example
///
/// ```
/// use payroll_engine::models::AttendanceStatus;
///
/// let status: AttendanceStatus = "P(dim_Am)".parse().unwrap();
/// assert_eq!(status, AttendanceStatus::SundayMorning);
/// assert!(status.is_sunday_presence());
/// assert_eq!(status.code(), "P(dim_Am)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Present in the morning only.
    #[serde(alias = "P(Am)")]
    PresentMorning,
    /// Present in the afternoon only.
    #[serde(alias = "P(Pm)")]
    PresentAfternoon,
    /// Present morning and afternoon.
    #[serde(alias = "P(Am_&_Pm)")]
    PresentFullDay,
    /// Present Sunday morning.
    #[serde(alias = "P(dim_Am)")]
    SundayMorning,
    /// Present Sunday afternoon.
    #[serde(alias = "P(dim_Pm)")]
    SundayAfternoon,
    /// Present Sunday morning and afternoon.
    #[serde(alias = "P(dim_Am_&_Pm)")]
    SundayFullDay,
    /// Absent.
    #[serde(alias = "A")]
    Absent,
    /// Sick, unpaid.
    #[serde(alias = "M")]
    Sick,
    /// Sick, paid.
    #[serde(alias = "M(Payer)")]
    PaidSick,
    /// Public holiday.
    #[serde(alias = "JF")]
    PublicHoliday,
    /// Training.
    #[serde(alias = "F")]
    Training,
    /// Leave.
    #[serde(alias = "C")]
    Leave,
    /// Authorised day off.
    #[serde(alias = "OFF")]
    DayOff,
}

impl AttendanceStatus {
    /// Every status, in listing order.
    pub const ALL: [AttendanceStatus; 13] = [
        AttendanceStatus::PresentMorning,
        AttendanceStatus::PresentAfternoon,
        AttendanceStatus::PresentFullDay,
        AttendanceStatus::SundayMorning,
        AttendanceStatus::SundayAfternoon,
        AttendanceStatus::SundayFullDay,
        AttendanceStatus::Absent,
        AttendanceStatus::Sick,
        AttendanceStatus::PaidSick,
        AttendanceStatus::PublicHoliday,
        AttendanceStatus::Training,
        AttendanceStatus::Leave,
        AttendanceStatus::DayOff,
    ];

    /// Returns the short timesheet code.
    pub fn code(self) -> &'static str {
        match self {
            AttendanceStatus::PresentMorning => "P(Am)",
            AttendanceStatus::PresentAfternoon => "P(Pm)",
            AttendanceStatus::PresentFullDay => "P(Am_&_Pm)",
            AttendanceStatus::SundayMorning => "P(dim_Am)",
            AttendanceStatus::SundayAfternoon => "P(dim_Pm)",
            AttendanceStatus::SundayFullDay => "P(dim_Am_&_Pm)",
            AttendanceStatus::Absent => "A",
            AttendanceStatus::Sick => "M",
            AttendanceStatus::PaidSick => "M(Payer)",
            AttendanceStatus::PublicHoliday => "JF",
            AttendanceStatus::Training => "F",
            AttendanceStatus::Leave => "C",
            AttendanceStatus::DayOff => "OFF",
        }
    }

    /// Returns the snake_case name used in configuration files and JSON.
    pub fn name(self) -> &'static str {
        match self {
            AttendanceStatus::PresentMorning => "present_morning",
            AttendanceStatus::PresentAfternoon => "present_afternoon",
            AttendanceStatus::PresentFullDay => "present_full_day",
            AttendanceStatus::SundayMorning => "sunday_morning",
            AttendanceStatus::SundayAfternoon => "sunday_afternoon",
            AttendanceStatus::SundayFullDay => "sunday_full_day",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Sick => "sick",
            AttendanceStatus::PaidSick => "paid_sick",
            AttendanceStatus::PublicHoliday => "public_holiday",
            AttendanceStatus::Training => "training",
            AttendanceStatus::Leave => "leave",
            AttendanceStatus::DayOff => "day_off",
        }
    }

    /// True for the three weekday presence codes.
    pub fn is_weekday_presence(self) -> bool {
        matches!(
            self,
            AttendanceStatus::PresentMorning
                | AttendanceStatus::PresentAfternoon
                | AttendanceStatus::PresentFullDay
        )
    }

    /// True for the three Sunday presence codes.
    pub fn is_sunday_presence(self) -> bool {
        matches!(
            self,
            AttendanceStatus::SundayMorning
                | AttendanceStatus::SundayAfternoon
                | AttendanceStatus::SundayFullDay
        )
    }

    /// Statuses whose amount is zero unless a tenant configures otherwise.
    pub fn defaults_to_zero(self) -> bool {
        matches!(
            self,
            AttendanceStatus::Absent | AttendanceStatus::Sick | AttendanceStatus::DayOff
        )
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for AttendanceStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> EngineResult<Self> {
        let trimmed = s.trim();
        AttendanceStatus::ALL
            .into_iter()
            .find(|status| status.code() == trimmed || status.name() == trimmed)
            .ok_or_else(|| EngineError::CalculationError {
                message: format!("Unknown attendance status: {}", trimmed),
            })
    }
}

/// One employee's attendance on one calendar date.
///
/// At most one record exists per (employee, date).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// The employee this record belongs to.
    pub employee_id: String,
    /// The calendar date.
    pub date: NaiveDate,
    /// The attendance classification for the day.
    pub status: AttendanceStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_legacy_codes() {
        assert_eq!(
            "P(Am_&_Pm)".parse::<AttendanceStatus>().unwrap(),
            AttendanceStatus::PresentFullDay
        );
        assert_eq!(
            "M(Payer)".parse::<AttendanceStatus>().unwrap(),
            AttendanceStatus::PaidSick
        );
        assert_eq!(
            "OFF".parse::<AttendanceStatus>().unwrap(),
            AttendanceStatus::DayOff
        );
    }

    #[test]
    fn test_parse_snake_case_names() {
        assert_eq!(
            "public_holiday".parse::<AttendanceStatus>().unwrap(),
            AttendanceStatus::PublicHoliday
        );
    }

    #[test]
    fn test_parse_unknown_status_fails() {
        assert!("X".parse::<AttendanceStatus>().is_err());
    }

    #[test]
    fn test_code_and_name_are_consistent_for_every_status() {
        for status in AttendanceStatus::ALL {
            assert_eq!(status.code().parse::<AttendanceStatus>().unwrap(), status);
            assert_eq!(status.name().parse::<AttendanceStatus>().unwrap(), status);
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.name()));
        }
    }

    #[test]
    fn test_deserialize_accepts_legacy_alias() {
        let status: AttendanceStatus = serde_json::from_str("\"P(dim_Am_&_Pm)\"").unwrap();
        assert_eq!(status, AttendanceStatus::SundayFullDay);
    }

    #[test]
    fn test_presence_groups_are_disjoint() {
        for status in AttendanceStatus::ALL {
            assert!(!(status.is_weekday_presence() && status.is_sunday_presence()));
        }
        assert_eq!(
            AttendanceStatus::ALL
                .iter()
                .filter(|s| s.is_weekday_presence())
                .count(),
            3
        );
        assert_eq!(
            AttendanceStatus::ALL
                .iter()
                .filter(|s| s.is_sunday_presence())
                .count(),
            3
        );
    }

    #[test]
    fn test_zero_default_statuses() {
        assert!(AttendanceStatus::Absent.defaults_to_zero());
        assert!(AttendanceStatus::Sick.defaults_to_zero());
        assert!(AttendanceStatus::DayOff.defaults_to_zero());
        assert!(!AttendanceStatus::PaidSick.defaults_to_zero());
    }

    #[test]
    fn test_attendance_record_deserialization() {
        let json = r#"{"employee_id": "emp_001", "date": "2025-02-03", "status": "P(Am)"}"#;
        let record: AttendanceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.status, AttendanceStatus::PresentMorning);
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2025, 2, 3).unwrap());
    }
}
