//! Overtime calculation functionality.
//!
//! This module computes the duration and payable amount of single overtime
//! entries and totals an employee's overtime for a month.
//!
//! ## Rate Structure
//!
//! - Hourly rate: the entry's explicit rate, else the employee's custom
//!   hourly rate, else daily rate ÷ standard workday hours
//! - Ordinary days are paid at the ordinary multiplier (normally 1.0)
//! - Sundays and public holidays are paid at the Sunday/holiday multiplier

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::config::OvertimeConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditWarning, Employee, OvertimeEntry, OvertimeSubmission, OvertimeSummary,
};

const SECONDS_PER_HOUR: i64 = 3600;

/// Where an overtime hourly rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HourlyRateSource {
    /// The rate submitted with the entry.
    EntryOverride,
    /// The employee's custom hourly rate.
    EmployeeHourlyRate,
    /// Derived from the employee's daily rate.
    DerivedFromDailyRate,
}

/// A resolved overtime hourly rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourlyRate {
    /// The rate, rounded to hundredths.
    pub rate: Decimal,
    /// Where it came from.
    pub source: HourlyRateSource,
}

/// The result of computing one overtime entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OvertimeCalculation {
    /// The computed entry.
    pub entry: OvertimeEntry,
    /// Raised when no positive hourly rate could be resolved.
    pub warning: Option<AuditWarning>,
    /// The audit step recording the calculation.
    pub audit_step: AuditStep,
}

/// Computes the duration in hours between two times on the same date.
///
/// The result is rounded half-up to hundredths of an hour. There is no
/// wrap past midnight: an end time at or before the start time fails.
///
/// # Errors
///
/// Returns `InvalidInterval` if `end_time <= start_time`.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::overtime_duration;
/// use chrono::{NaiveDate, NaiveTime};
/// use rust_decimal::Decimal;
///
/// let date = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
/// let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
/// let five = NaiveTime::from_hms_opt(17, 0, 0).unwrap();
///
/// assert_eq!(overtime_duration("emp_001", date, nine, five).unwrap(), Decimal::new(8, 0));
/// assert!(overtime_duration("emp_001", date, five, nine).is_err());
/// ```
pub fn overtime_duration(
    employee_id: &str,
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
) -> EngineResult<Decimal> {
    if end_time <= start_time {
        return Err(EngineError::InvalidInterval {
            employee_id: employee_id.to_string(),
            date,
            start_time,
            end_time,
        });
    }

    let seconds = (end_time - start_time).num_seconds();
    Ok((Decimal::from(seconds) / Decimal::from(SECONDS_PER_HOUR))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// Resolves the hourly rate for an overtime entry.
///
/// Precedence is the entry override, then the employee's custom hourly
/// rate, then the daily rate divided by the standard workday length.
pub fn resolve_hourly_rate(
    entry_override: Option<Decimal>,
    employee: &Employee,
    config: &OvertimeConfig,
) -> HourlyRate {
    let (rate, source) = match (entry_override, employee.hourly_rate) {
        (Some(rate), _) => (rate, HourlyRateSource::EntryOverride),
        (None, Some(rate)) => (rate, HourlyRateSource::EmployeeHourlyRate),
        (None, None) if config.standard_workday_hours > Decimal::ZERO => (
            employee.daily_rate / config.standard_workday_hours,
            HourlyRateSource::DerivedFromDailyRate,
        ),
        (None, None) => (Decimal::ZERO, HourlyRateSource::DerivedFromDailyRate),
    };

    HourlyRate {
        rate: rate.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        source,
    }
}

/// Calculates the payable amount of one overtime submission.
///
/// Amount = duration × hourly rate × multiplier, where the multiplier is
/// selected by the entry's day type. A zero hourly rate is not an error: the
/// amount degrades to zero and a `MISSING_RATE_CONFIGURATION` warning is
/// returned.
///
/// # Errors
///
/// - `InvalidInterval` if the end time is not after the start time
/// - `CalculationError` if the submission belongs to another employee or
///   the amount overflows
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::calculate_overtime;
/// use payroll_engine::config::OvertimeConfig;
/// use payroll_engine::models::{Employee, OvertimeSubmission};
/// use rust_decimal::Decimal;
///
/// let employee: Employee = serde_json::from_value(serde_json::json!({
///     "id": "emp_001", "tenant_id": "acme_mining", "matricule": "ACM-001",
///     "first_name": "Aissatou", "last_name": "Bah", "daily_rate": "80000"
/// })).unwrap();
/// let submission: OvertimeSubmission = serde_json::from_value(serde_json::json!({
///     "employee_id": "emp_001", "date": "2025-03-09",
///     "start_time": "08:00:00", "end_time": "12:00:00", "day_type": "sunday"
/// })).unwrap();
///
/// let result = calculate_overtime(&submission, &employee, &OvertimeConfig::default(), 1).unwrap();
/// // 4h × (80000 / 8) × 2.0
/// assert_eq!(result.entry.amount, Decimal::new(80000, 0));
/// assert!(result.warning.is_none());
/// ```
pub fn calculate_overtime(
    submission: &OvertimeSubmission,
    employee: &Employee,
    config: &OvertimeConfig,
    step_number: u32,
) -> EngineResult<OvertimeCalculation> {
    if submission.employee_id != employee.id {
        return Err(EngineError::CalculationError {
            message: format!(
                "Overtime entry for '{}' cannot be computed with employee '{}'",
                submission.employee_id, employee.id
            ),
        });
    }

    let duration_hours = overtime_duration(
        &submission.employee_id,
        submission.date,
        submission.start_time,
        submission.end_time,
    )?;
    let hourly_rate = resolve_hourly_rate(submission.hourly_rate, employee, config);
    let multiplier = if submission.day_type.is_premium() {
        config.sunday_holiday_multiplier
    } else {
        config.ordinary_multiplier
    };
    let amount = duration_hours
        .checked_mul(hourly_rate.rate)
        .and_then(|value| value.checked_mul(multiplier))
        .ok_or_else(|| EngineError::CalculationError {
            message: format!(
                "Overtime amount for employee {} on {} overflows: {} × {} × {}",
                employee.id, submission.date, duration_hours, hourly_rate.rate, multiplier
            ),
        })?;
    let rate_configured = hourly_rate.rate > Decimal::ZERO;

    let warning = if rate_configured {
        None
    } else {
        Some(AuditWarning::missing_rate(&format!(
            "overtime of employee {} on {}",
            employee.id, submission.date
        )))
    };

    let reasoning = format!(
        "{} hours ({} to {}) × {} hourly rate × {} {} multiplier = {}",
        duration_hours.normalize(),
        submission.start_time.format("%H:%M"),
        submission.end_time.format("%H:%M"),
        hourly_rate.rate.normalize(),
        multiplier.normalize(),
        if submission.day_type.is_premium() {
            "Sunday/holiday"
        } else {
            "ordinary"
        },
        amount.normalize()
    );

    let audit_step = AuditStep {
        step_number,
        rule_id: "overtime_calculation".to_string(),
        rule_name: "Overtime Calculation".to_string(),
        input: serde_json::json!({
            "date": submission.date.to_string(),
            "start_time": submission.start_time.to_string(),
            "end_time": submission.end_time.to_string(),
            "day_type": submission.day_type,
            "hourly_rate": hourly_rate.rate.normalize().to_string(),
            "rate_source": hourly_rate.source,
            "multiplier": multiplier.normalize().to_string(),
        }),
        output: serde_json::json!({
            "duration_hours": duration_hours.normalize().to_string(),
            "amount": amount.normalize().to_string(),
        }),
        reasoning,
    };

    let entry = OvertimeEntry {
        employee_id: submission.employee_id.clone(),
        date: submission.date,
        start_time: submission.start_time,
        end_time: submission.end_time,
        approved_by: submission.approved_by.clone(),
        day_type: submission.day_type,
        duration_hours,
        hourly_rate: hourly_rate.rate,
        multiplier,
        amount,
        rate_configured,
    };

    Ok(OvertimeCalculation {
        entry,
        warning,
        audit_step,
    })
}

/// Totals a month's overtime entries, ordered by date then start time.
pub fn summarize_overtime(mut entries: Vec<OvertimeEntry>) -> OvertimeSummary {
    entries.sort_by(|a, b| (a.date, a.start_time).cmp(&(b.date, b.start_time)));

    let mut summary = OvertimeSummary::default();
    for entry in &entries {
        if entry.day_type.is_premium() {
            summary.premium_hours += entry.duration_hours;
            summary.premium_amount += entry.amount;
        } else {
            summary.ordinary_hours += entry.duration_hours;
            summary.ordinary_amount += entry.amount;
        }
    }
    summary.total_amount = summary.ordinary_amount + summary.premium_amount;
    summary.entries = entries;
    summary
}
