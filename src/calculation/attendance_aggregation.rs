//! Monthly attendance aggregation.
//!
//! This module enumerates every calendar day of a pay period, matches it
//! against the employee's attendance records, and counts occurrences per
//! status. A day without a record stays unset; it is never assumed absent
//! or present.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceRecord, AttendanceStatus, AttendanceSummary, AuditStep, DayAttendance, PayPeriod,
};

/// The result of aggregating one employee's attendance for a month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyAttendance {
    /// The aggregated period.
    pub period: PayPeriod,
    /// One entry per calendar day, in date order.
    pub daily_statuses: Vec<DayAttendance>,
    /// Occurrences per status; statuses that never occur are absent.
    pub status_counts: BTreeMap<AttendanceStatus, u32>,
    /// Grouped counts for payslip display.
    pub summary: AttendanceSummary,
    /// Records that belonged to another employee or fell outside the period.
    pub ignored_records: u32,
    /// The audit step recording this aggregation.
    pub audit_step: AuditStep,
}

/// Aggregates an employee's attendance records over a pay period.
///
/// Records for other employees or for dates outside the period are ignored
/// and counted in `ignored_records`.
///
/// # Errors
///
/// - `InvalidPeriod` if the month is outside 1-12
/// - `DuplicateAttendance` if two records exist for the same date
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::aggregate_month;
/// use payroll_engine::models::{AttendanceRecord, AttendanceStatus, PayPeriod};
/// use chrono::NaiveDate;
///
/// let records = vec![AttendanceRecord {
///     employee_id: "emp_001".to_string(),
///     date: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
///     status: AttendanceStatus::PresentFullDay,
/// }];
/// let period = PayPeriod { year: 2024, month: 2 };
/// let result = aggregate_month("emp_001", period, &records, 1).unwrap();
///
/// assert_eq!(result.daily_statuses.len(), 29);
/// assert_eq!(result.status_counts[&AttendanceStatus::PresentFullDay], 1);
/// assert_eq!(result.summary.unset_days, 28);
/// ```
pub fn aggregate_month(
    employee_id: &str,
    period: PayPeriod,
    records: &[AttendanceRecord],
    step_number: u32,
) -> EngineResult<MonthlyAttendance> {
    period.validate()?;

    let mut by_date: BTreeMap<NaiveDate, AttendanceStatus> = BTreeMap::new();
    let mut ignored_records = 0u32;
    for record in records {
        if record.employee_id != employee_id || !period.contains_date(record.date) {
            ignored_records += 1;
            continue;
        }
        if by_date.insert(record.date, record.status).is_some() {
            return Err(EngineError::DuplicateAttendance {
                employee_id: employee_id.to_string(),
                date: record.date,
            });
        }
    }

    let daily_statuses: Vec<DayAttendance> = period
        .dates()?
        .into_iter()
        .map(|date| DayAttendance {
            date,
            status: by_date.get(&date).copied(),
        })
        .collect();

    let mut status_counts: BTreeMap<AttendanceStatus, u32> = BTreeMap::new();
    for status in daily_statuses.iter().filter_map(|day| day.status) {
        *status_counts.entry(status).or_insert(0) += 1;
    }

    let unset_days = daily_statuses.iter().filter(|d| d.status.is_none()).count() as u32;
    let summary = summarize(&status_counts, unset_days);

    let audit_step = AuditStep {
        step_number,
        rule_id: "attendance_aggregation".to_string(),
        rule_name: "Monthly Attendance Aggregation".to_string(),
        input: serde_json::json!({
            "employee_id": employee_id,
            "month": period.month,
            "year": period.year,
            "records": records.len(),
        }),
        output: serde_json::json!({
            "days_in_month": period.day_count(),
            "status_counts": status_counts
                .iter()
                .map(|(status, count)| (status.code().to_string(), *count))
                .collect::<BTreeMap<_, _>>(),
            "unset_days": unset_days,
            "ignored_records": ignored_records,
        }),
        reasoning: format!(
            "{} days in {:02}/{}: {} with a recorded status, {} unset",
            period.day_count(),
            period.month,
            period.year,
            period.day_count() - unset_days,
            unset_days
        ),
    };

    Ok(MonthlyAttendance {
        period,
        daily_statuses,
        status_counts,
        summary,
        ignored_records,
        audit_step,
    })
}

/// Groups per-status counts into payslip categories.
pub fn summarize(
    status_counts: &BTreeMap<AttendanceStatus, u32>,
    unset_days: u32,
) -> AttendanceSummary {
    let mut summary = AttendanceSummary {
        unset_days,
        ..AttendanceSummary::default()
    };
    for (status, count) in status_counts {
        match status {
            s if s.is_weekday_presence() => summary.days_present += count,
            s if s.is_sunday_presence() => summary.sundays_worked += count,
            AttendanceStatus::Absent => summary.absences += count,
            AttendanceStatus::Sick => summary.sick += count,
            AttendanceStatus::PaidSick => summary.paid_sick += count,
            AttendanceStatus::DayOff => summary.rest_days += count,
            _ => {}
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn record(employee_id: &str, date: &str, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            employee_id: employee_id.to_string(),
            date: make_date(date),
            status,
        }
    }

    #[test]
    fn test_empty_month_is_all_unset() {
        let period = PayPeriod { year: 2025, month: 4 };
        let result = aggregate_month("emp_001", period, &[], 1).unwrap();

        assert_eq!(result.daily_statuses.len(), 30);
        assert!(result.daily_statuses.iter().all(|d| d.status.is_none()));
        assert!(result.status_counts.is_empty());
        assert_eq!(result.summary.unset_days, 30);
        assert_eq!(result.summary.absences, 0);
        assert_eq!(result.summary.days_present, 0);
    }

    #[test]
    fn test_counts_per_status() {
        let period = PayPeriod { year: 2025, month: 3 };
        let records = vec![
            record("emp_001", "2025-03-03", AttendanceStatus::PresentFullDay),
            record("emp_001", "2025-03-04", AttendanceStatus::PresentFullDay),
            record("emp_001", "2025-03-05", AttendanceStatus::PresentMorning),
            record("emp_001", "2025-03-09", AttendanceStatus::SundayFullDay),
            record("emp_001", "2025-03-10", AttendanceStatus::Absent),
            record("emp_001", "2025-03-11", AttendanceStatus::PaidSick),
            record("emp_001", "2025-03-12", AttendanceStatus::DayOff),
        ];
        let result = aggregate_month("emp_001", period, &records, 1).unwrap();

        assert_eq!(result.status_counts[&AttendanceStatus::PresentFullDay], 2);
        assert_eq!(result.status_counts[&AttendanceStatus::PresentMorning], 1);
        assert_eq!(result.status_counts.get(&AttendanceStatus::Sick), None);
        assert_eq!(result.summary.days_present, 3);
        assert_eq!(result.summary.sundays_worked, 1);
        assert_eq!(result.summary.absences, 1);
        assert_eq!(result.summary.paid_sick, 1);
        assert_eq!(result.summary.rest_days, 1);
        assert_eq!(result.summary.unset_days, 24);
    }

    #[test]
    fn test_daily_statuses_follow_calendar_order() {
        let period = PayPeriod { year: 2025, month: 3 };
        let records = vec![
            record("emp_001", "2025-03-31", AttendanceStatus::Leave),
            record("emp_001", "2025-03-01", AttendanceStatus::Training),
        ];
        let result = aggregate_month("emp_001", period, &records, 1).unwrap();

        assert_eq!(result.daily_statuses[0].date, make_date("2025-03-01"));
        assert_eq!(
            result.daily_statuses[0].status,
            Some(AttendanceStatus::Training)
        );
        assert_eq!(result.daily_statuses[30].status, Some(AttendanceStatus::Leave));
        assert_eq!(result.daily_statuses[15].status, None);
    }

    #[test]
    fn test_leap_february_includes_29th() {
        let period = PayPeriod { year: 2024, month: 2 };
        let records = vec![record("emp_001", "2024-02-29", AttendanceStatus::Absent)];
        let result = aggregate_month("emp_001", period, &records, 1).unwrap();

        assert_eq!(result.daily_statuses.len(), 29);
        assert_eq!(result.summary.absences, 1);
        assert_eq!(result.ignored_records, 0);
    }

    #[test]
    fn test_records_outside_period_or_employee_are_ignored() {
        let period = PayPeriod { year: 2025, month: 3 };
        let records = vec![
            record("emp_001", "2025-02-28", AttendanceStatus::PresentFullDay),
            record("emp_002", "2025-03-03", AttendanceStatus::PresentFullDay),
            record("emp_001", "2025-03-03", AttendanceStatus::PresentAfternoon),
        ];
        let result = aggregate_month("emp_001", period, &records, 1).unwrap();

        assert_eq!(result.ignored_records, 2);
        assert_eq!(result.status_counts.len(), 1);
        assert_eq!(result.status_counts[&AttendanceStatus::PresentAfternoon], 1);
    }

    #[test]
    fn test_duplicate_date_is_rejected() {
        let period = PayPeriod { year: 2025, month: 3 };
        let records = vec![
            record("emp_001", "2025-03-03", AttendanceStatus::PresentFullDay),
            record("emp_001", "2025-03-03", AttendanceStatus::Absent),
        ];

        match aggregate_month("emp_001", period, &records, 1) {
            Err(EngineError::DuplicateAttendance { employee_id, date }) => {
                assert_eq!(employee_id, "emp_001");
                assert_eq!(date, make_date("2025-03-03"));
            }
            other => panic!("Expected DuplicateAttendance, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_month_is_rejected() {
        let period = PayPeriod { year: 2025, month: 13 };
        assert!(matches!(
            aggregate_month("emp_001", period, &[], 1),
            Err(EngineError::InvalidPeriod { month: 13, .. })
        ));
    }

    #[test]
    fn test_audit_step_uses_status_codes() {
        let period = PayPeriod { year: 2025, month: 3 };
        let records = vec![record("emp_001", "2025-03-03", AttendanceStatus::PaidSick)];
        let result = aggregate_month("emp_001", period, &records, 4).unwrap();

        assert_eq!(result.audit_step.step_number, 4);
        assert_eq!(result.audit_step.rule_id, "attendance_aggregation");
        assert_eq!(result.audit_step.output["status_counts"]["M(Payer)"], 1);
        assert_eq!(result.audit_step.output["unset_days"], 30);
    }
}
