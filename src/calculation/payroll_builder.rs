//! Payroll record assembly.
//!
//! Runs aggregation, valuation, overtime and deductions in sequence for one
//! employee and month and assembles the resulting [`PayrollRecord`]. The
//! record is a pure function of its inputs, so rebuilding it from the same
//! attendance, overtime and configuration reproduces it exactly.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::config::TenantConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceRecord, AuditStep, AuditWarning, EarningLine, Employee, OvertimeSubmission,
    PayPeriod, PayrollRecord, Severity, WarningCode,
};

use super::attendance_aggregation::aggregate_month;
use super::deductions::apply_deductions;
use super::overtime::{calculate_overtime, summarize_overtime};
use super::valuation::value_statuses;

/// Builds the monthly payroll record of one employee.
///
/// `attendance` and `overtime` may contain entries outside the period or for
/// other employees; those are ignored and reported with an
/// `IGNORED_ATTENDANCE` warning.
///
/// # Errors
///
/// - `TenantMismatch` if the employee does not belong to `config`'s tenant
/// - `InvalidPeriod` if the month is outside 1-12
/// - `DuplicateAttendance` if two attendance records share a date
/// - `DuplicateEntry` if two overtime entries share a date and start time
/// - `InvalidInterval` if an overtime entry ends at or before its start
///
/// # Example
///
/// ```no_run
/// use payroll_engine::calculation::build_payroll_record;
/// use payroll_engine::config::ConfigLoader;
/// use payroll_engine::models::{Employee, PayPeriod};
///
/// let config = ConfigLoader::load("./config/tenants").unwrap();
/// let tenant = config.tenant("acme_mining").unwrap();
/// let employee: Employee = serde_json::from_value(serde_json::json!({
///     "id": "emp_001", "tenant_id": "acme_mining", "matricule": "ACM-001",
///     "first_name": "Aissatou", "last_name": "Bah", "daily_rate": "80000"
/// })).unwrap();
///
/// let record = build_payroll_record(&employee, PayPeriod::new(2025, 3).unwrap(), &[], &[], tenant).unwrap();
/// assert_eq!(record.days_in_month, 31);
/// ```
pub fn build_payroll_record(
    employee: &Employee,
    period: PayPeriod,
    attendance: &[AttendanceRecord],
    overtime: &[OvertimeSubmission],
    config: &TenantConfig,
) -> EngineResult<PayrollRecord> {
    if employee.tenant_id != config.tenant_id() {
        return Err(EngineError::TenantMismatch {
            employee_id: employee.id.clone(),
            tenant_id: config.tenant_id().to_string(),
        });
    }

    let currency = config.currency();
    let mut warnings: Vec<AuditWarning> = Vec::new();
    let mut audit_trace: Vec<AuditStep> = Vec::new();
    let mut step_number: u32 = 1;

    // Step 1: count statuses over the month
    let attendance_result = aggregate_month(&employee.id, period, attendance, step_number)?;
    audit_trace.push(attendance_result.audit_step.clone());
    step_number += 1;

    // Step 2: value the counts
    let valuation = value_statuses(&attendance_result.status_counts, &config.rates, step_number)?;
    audit_trace.push(valuation.audit_step.clone());
    step_number += 1;
    for status in &valuation.unconfigured {
        warn!(
            tenant_id = %config.tenant_id(),
            employee_id = %employee.id,
            status = %status,
            "No amount configured for attendance status"
        );
        warnings.push(AuditWarning::missing_rate(&format!("status {}", status)));
    }

    // Step 3: overtime entries of the period
    let mut seen = BTreeSet::new();
    let mut entries = Vec::new();
    let mut ignored_overtime = 0u32;
    for submission in overtime {
        if submission.employee_id != employee.id || !period.contains_date(submission.date) {
            ignored_overtime += 1;
            continue;
        }
        if !seen.insert(submission.key()) {
            return Err(EngineError::DuplicateEntry {
                employee_id: employee.id.clone(),
                date: submission.date,
                start_time: submission.start_time,
            });
        }
        let calculation = calculate_overtime(submission, employee, &config.overtime, step_number)?;
        audit_trace.push(calculation.audit_step);
        step_number += 1;
        if let Some(warning) = calculation.warning {
            warn!(
                tenant_id = %config.tenant_id(),
                employee_id = %employee.id,
                date = %submission.date,
                "No hourly rate resolved for overtime entry"
            );
            warnings.push(warning);
        }
        entries.push(calculation.entry);
    }
    let overtime_summary = summarize_overtime(entries);

    let ignored = attendance_result.ignored_records + ignored_overtime;
    if ignored > 0 {
        debug!(
            employee_id = %employee.id,
            ignored,
            "Ignored records outside the period or for another employee"
        );
        warnings.push(AuditWarning {
            code: WarningCode::IgnoredAttendance,
            message: format!(
                "{} attendance and {} overtime records outside {:02}/{} or for another employee were ignored",
                attendance_result.ignored_records, ignored_overtime, period.month, period.year
            ),
            severity: Severity::Low,
        });
    }

    // Step 4: gross salary
    let mut earnings = vec![EarningLine {
        earning_type: "attendance".to_string(),
        description: format!(
            "Attendance for {} days with a recorded status",
            period.day_count() - attendance_result.summary.unset_days
        ),
        amount: valuation.total,
    }];
    if overtime_summary.ordinary_amount != Decimal::ZERO {
        earnings.push(EarningLine {
            earning_type: "overtime_ordinary".to_string(),
            description: format!(
                "Overtime on ordinary days ({} hours)",
                overtime_summary.ordinary_hours.normalize()
            ),
            amount: overtime_summary.ordinary_amount,
        });
    }
    if overtime_summary.premium_amount != Decimal::ZERO {
        earnings.push(EarningLine {
            earning_type: "overtime_sunday_holiday".to_string(),
            description: format!(
                "Overtime on Sundays and holidays ({} hours)",
                overtime_summary.premium_hours.normalize()
            ),
            amount: overtime_summary.premium_amount,
        });
    }
    for (name, amount) in employee.allowances.entries() {
        if amount != Decimal::ZERO {
            earnings.push(EarningLine {
                earning_type: name.to_string(),
                description: format!("Monthly {} allowance", name.replace('_', " ")),
                amount,
            });
        }
    }
    let mileage = employee.mileage_allowance();
    if mileage != Decimal::ZERO {
        earnings.push(EarningLine {
            earning_type: "mileage".to_string(),
            description: format!(
                "Mileage allowance ({} km × {})",
                employee.kilometres.normalize(),
                employee.value_per_km.normalize()
            ),
            amount: mileage,
        });
    }

    let earnings_total: Decimal = earnings.iter().map(|line| line.amount).sum();
    let gross_salary = currency.round(earnings_total);
    audit_trace.push(AuditStep {
        step_number,
        rule_id: "gross_salary".to_string(),
        rule_name: "Gross Salary".to_string(),
        input: serde_json::json!(earnings
            .iter()
            .map(|line| serde_json::json!({
                "type": line.earning_type,
                "amount": line.amount.normalize().to_string(),
            }))
            .collect::<Vec<_>>()),
        output: serde_json::json!({
            "gross_salary": gross_salary.normalize().to_string(),
        }),
        reasoning: format!(
            "Sum of {} earning lines {} rounded to {} decimal places",
            earnings.len(),
            earnings_total.normalize(),
            currency.minor_units
        ),
    });
    step_number += 1;

    // Step 5: deductions
    let deductions = apply_deductions(
        gross_salary,
        employee,
        &config.deductions,
        currency,
        step_number,
    );
    step_number += deductions.audit_steps.len() as u32;
    audit_trace.extend(deductions.audit_steps);
    for warning in &deductions.warnings {
        warn!(
            tenant_id = %config.tenant_id(),
            employee_id = %employee.id,
            message = %warning.message,
            "Deduction rate missing"
        );
    }
    warnings.extend(deductions.warnings);

    // Step 6: net payable
    let net_payable = gross_salary - deductions.breakdown.total;
    let employer_cost = gross_salary + deductions.employer_social_security;
    let net_payable_reference = currency.to_reference(net_payable);
    if net_payable < Decimal::ZERO {
        warnings.push(AuditWarning {
            code: WarningCode::NegativeNetPay,
            message: format!(
                "Deductions of {} exceed gross salary of {}",
                deductions.breakdown.total, gross_salary
            ),
            severity: Severity::High,
        });
    }
    audit_trace.push(AuditStep {
        step_number,
        rule_id: "net_payable".to_string(),
        rule_name: "Net Payable".to_string(),
        input: serde_json::json!({
            "gross_salary": gross_salary.normalize().to_string(),
            "deductions": deductions.breakdown.total.normalize().to_string(),
        }),
        output: serde_json::json!({
            "net_payable": net_payable.normalize().to_string(),
            "employer_cost": employer_cost.normalize().to_string(),
            "net_payable_reference": net_payable_reference.map(|n| n.normalize().to_string()),
        }),
        reasoning: format!(
            "{} gross − {} deductions = {} {}",
            gross_salary.normalize(),
            deductions.breakdown.total.normalize(),
            net_payable.normalize(),
            currency.code
        ),
    });

    Ok(PayrollRecord {
        tenant_id: config.tenant_id().to_string(),
        employee_id: employee.id.clone(),
        matricule: employee.matricule.clone(),
        employee_name: employee.full_name(),
        period,
        days_in_month: period.day_count(),
        daily_statuses: attendance_result.daily_statuses,
        status_counts: attendance_result.status_counts,
        attendance_summary: attendance_result.summary,
        status_lines: valuation.lines,
        attendance_total: valuation.total,
        overtime: overtime_summary,
        earnings,
        gross_salary,
        deductions: deductions.breakdown,
        employer_social_security: deductions.employer_social_security,
        employer_cost,
        net_payable,
        net_payable_reference,
        warnings,
        audit_trace,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use crate::models::{AttendanceStatus, DeductionKind, OvertimeDayType};
    use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn tenant(id: &str) -> TenantConfig {
        ConfigLoader::load("./config/tenants")
            .unwrap()
            .tenant(id)
            .unwrap()
            .clone()
    }

    fn create_test_employee(tenant_id: &str) -> Employee {
        serde_json::from_value(serde_json::json!({
            "id": "emp_001",
            "tenant_id": tenant_id,
            "matricule": "ACM-001",
            "first_name": "Aissatou",
            "last_name": "Bah",
            "daily_rate": "80000"
        }))
        .unwrap()
    }

    /// Full-day presence on every weekday of March 2025, Sunday presence on Sundays.
    fn march_attendance() -> Vec<AttendanceRecord> {
        PayPeriod::new(2025, 3)
            .unwrap()
            .dates()
            .unwrap()
            .into_iter()
            .filter(|d| d.weekday() != Weekday::Sat)
            .map(|date| AttendanceRecord {
                employee_id: "emp_001".to_string(),
                date,
                status: if date.weekday() == Weekday::Sun {
                    AttendanceStatus::SundayFullDay
                } else {
                    AttendanceStatus::PresentFullDay
                },
            })
            .collect()
    }

    fn overtime_entry(date: &str, start: (u32, u32), end: (u32, u32)) -> OvertimeSubmission {
        OvertimeSubmission {
            employee_id: "emp_001".to_string(),
            date: make_date(date),
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
            approved_by: None,
            day_type: OvertimeDayType::Ordinary,
            hourly_rate: None,
        }
    }

    #[test]
    fn test_full_month_record() {
        let config = tenant("acme_mining");
        let employee = create_test_employee("acme_mining");
        let period = PayPeriod::new(2025, 3).unwrap();
        let overtime = vec![overtime_entry("2025-03-04", (17, 0), (19, 0))];

        let record =
            build_payroll_record(&employee, period, &march_attendance(), &overtime, &config)
                .unwrap();

        // March 2025: 21 weekdays, 5 Sundays, 5 Saturdays
        assert_eq!(record.status_counts[&AttendanceStatus::PresentFullDay], 21);
        assert_eq!(record.status_counts[&AttendanceStatus::SundayFullDay], 5);
        assert_eq!(record.attendance_summary.unset_days, 5);
        assert_eq!(record.attendance_total, dec("2280000"));
        assert_eq!(record.overtime.total_amount, dec("20000"));
        assert_eq!(record.gross_salary, dec("2300000"));

        // CNSS 5% = 115000; RTS: 10% × 1300000 = 130000; VF inactive
        assert_eq!(record.deductions.amount(DeductionKind::SocialSecurity), dec("115000"));
        assert_eq!(record.deductions.amount(DeductionKind::IncomeLevy), dec("130000"));
        assert_eq!(record.deductions.amount(DeductionKind::AlternateLevy), Decimal::ZERO);
        assert_eq!(record.net_payable, dec("2055000"));
        assert_eq!(record.employer_social_security, dec("414000"));
        assert_eq!(record.employer_cost, dec("2714000"));
        assert_eq!(record.net_payable_reference, Some(dec("178.70")));
        assert!(record.warnings.is_empty());
    }

    #[test]
    fn test_audit_steps_are_numbered_sequentially() {
        let config = tenant("acme_mining");
        let employee = create_test_employee("acme_mining");
        let overtime = vec![
            overtime_entry("2025-03-04", (17, 0), (19, 0)),
            overtime_entry("2025-03-05", (17, 0), (18, 0)),
        ];
        let record = build_payroll_record(
            &employee,
            PayPeriod::new(2025, 3).unwrap(),
            &march_attendance(),
            &overtime,
            &config,
        )
        .unwrap();

        for (index, step) in record.audit_trace.iter().enumerate() {
            assert_eq!(step.step_number, index as u32 + 1);
        }
        assert_eq!(record.audit_trace.first().unwrap().rule_id, "attendance_aggregation");
        assert_eq!(record.audit_trace.last().unwrap().rule_id, "net_payable");
    }

    #[test]
    fn test_tenant_mismatch_is_rejected() {
        let config = tenant("acme_mining");
        let employee = create_test_employee("sahel_transport");

        match build_payroll_record(&employee, PayPeriod::new(2025, 3).unwrap(), &[], &[], &config)
        {
            Err(EngineError::TenantMismatch {
                employee_id,
                tenant_id,
            }) => {
                assert_eq!(employee_id, "emp_001");
                assert_eq!(tenant_id, "acme_mining");
            }
            other => panic!("Expected TenantMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_status_rate_is_flagged_not_failed() {
        let config = tenant("sahel_transport");
        let employee = create_test_employee("sahel_transport");
        let attendance = vec![
            AttendanceRecord {
                employee_id: "emp_001".to_string(),
                date: make_date("2025-03-03"),
                status: AttendanceStatus::Training,
            },
            AttendanceRecord {
                employee_id: "emp_001".to_string(),
                date: make_date("2025-03-04"),
                status: AttendanceStatus::PresentFullDay,
            },
        ];

        let record = build_payroll_record(
            &employee,
            PayPeriod::new(2025, 3).unwrap(),
            &attendance,
            &[],
            &config,
        )
        .unwrap();

        assert!(record.has_warning(WarningCode::MissingRateConfiguration));
        assert_eq!(record.unconfigured_statuses(), vec![AttendanceStatus::Training]);
        assert_eq!(record.attendance_total, dec("70000"));
    }

    #[test]
    fn test_duplicate_overtime_key_is_rejected() {
        let config = tenant("acme_mining");
        let employee = create_test_employee("acme_mining");
        let overtime = vec![
            overtime_entry("2025-03-04", (17, 0), (19, 0)),
            overtime_entry("2025-03-04", (17, 0), (20, 0)),
        ];

        assert!(matches!(
            build_payroll_record(
                &employee,
                PayPeriod::new(2025, 3).unwrap(),
                &[],
                &overtime,
                &config
            ),
            Err(EngineError::DuplicateEntry { .. })
        ));
    }

    #[test]
    fn test_invalid_overtime_interval_fails_the_record() {
        let config = tenant("acme_mining");
        let employee = create_test_employee("acme_mining");
        let overtime = vec![overtime_entry("2025-03-04", (17, 0), (9, 0))];

        assert!(matches!(
            build_payroll_record(
                &employee,
                PayPeriod::new(2025, 3).unwrap(),
                &[],
                &overtime,
                &config
            ),
            Err(EngineError::InvalidInterval { .. })
        ));
    }

    #[test]
    fn test_overtime_outside_period_is_ignored_with_warning() {
        let config = tenant("acme_mining");
        let employee = create_test_employee("acme_mining");
        let overtime = vec![overtime_entry("2025-04-01", (17, 0), (19, 0))];

        let record = build_payroll_record(
            &employee,
            PayPeriod::new(2025, 3).unwrap(),
            &[],
            &overtime,
            &config,
        )
        .unwrap();

        assert!(record.overtime.entries.is_empty());
        assert!(record.has_warning(WarningCode::IgnoredAttendance));
    }

    #[test]
    fn test_allowances_and_mileage_add_to_gross() {
        let config = tenant("acme_mining");
        let mut employee = create_test_employee("acme_mining");
        employee.allowances.transport = dec("150000");
        employee.allowances.housing = dec("200000");
        employee.kilometres = dec("100");
        employee.value_per_km = dec("1500");

        let record = build_payroll_record(
            &employee,
            PayPeriod::new(2025, 3).unwrap(),
            &[],
            &[],
            &config,
        )
        .unwrap();

        let types: Vec<&str> = record
            .earnings
            .iter()
            .map(|e| e.earning_type.as_str())
            .collect();
        assert_eq!(types, vec!["attendance", "transport", "housing", "mileage"]);
        assert_eq!(record.gross_salary, dec("500000"));
    }

    #[test]
    fn test_negative_net_is_flagged() {
        let config = tenant("acme_mining");
        let mut employee = create_test_employee("acme_mining");
        employee.advances = dec("500000");

        let record = build_payroll_record(
            &employee,
            PayPeriod::new(2025, 3).unwrap(),
            &[],
            &[],
            &config,
        )
        .unwrap();

        assert_eq!(record.net_payable, dec("-500000"));
        assert!(record.has_warning(WarningCode::NegativeNetPay));
    }

    #[test]
    fn test_rebuild_is_identical() {
        let config = tenant("acme_mining");
        let employee = create_test_employee("acme_mining");
        let period = PayPeriod::new(2025, 3).unwrap();
        let overtime = vec![overtime_entry("2025-03-04", (17, 0), (19, 0))];

        let first =
            build_payroll_record(&employee, period, &march_attendance(), &overtime, &config)
                .unwrap();
        let second =
            build_payroll_record(&employee, period, &march_attendance(), &overtime, &config)
                .unwrap();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }
}
