//! Payroll record models for the Payroll Computation Engine.
//!
//! This module contains the [`PayrollRecord`] type and its associated structures
//! that capture every output of one employee's monthly computation: per-day
//! statuses, per-status valuation, overtime, earnings, deductions, warnings and
//! the audit trace. It also defines the [`PayrollRunReport`] envelope produced
//! by batch runs.
//!
//! A `PayrollRecord` carries no timestamps or generated identifiers so that
//! recomputing it from identical inputs yields an identical value.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AttendanceStatus, OvertimeEntry, PayPeriod};

/// One calendar day of the period and its recorded status, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAttendance {
    /// The date.
    pub date: NaiveDate,
    /// The recorded status, `None` when no record exists for the day.
    pub status: Option<AttendanceStatus>,
}

/// Grouped attendance counts shown on payslips.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    /// Weekday presence codes (morning, afternoon, full day).
    pub days_present: u32,
    /// Sunday presence codes.
    pub sundays_worked: u32,
    /// Absences.
    pub absences: u32,
    /// Unpaid sick days.
    pub sick: u32,
    /// Paid sick days.
    pub paid_sick: u32,
    /// Authorised days off.
    pub rest_days: u32,
    /// Days with no attendance record.
    pub unset_days: u32,
}

/// Valuation of one attendance status for the month.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{AttendanceStatus, StatusLine};
/// use rust_decimal::Decimal;
///
/// let line = StatusLine {
///     status: AttendanceStatus::PresentFullDay,
///     count: 20,
///     unit_amount: Decimal::new(80000, 0),
///     amount: Decimal::new(1_600_000, 0),
///     configured: true,
/// };
/// assert_eq!(line.amount, line.unit_amount * Decimal::from(line.count));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusLine {
    /// The status being valued.
    pub status: AttendanceStatus,
    /// Occurrences during the month.
    pub count: u32,
    /// Amount per occurrence from the tenant's rate table (zero when missing).
    pub unit_amount: Decimal,
    /// count × unit amount.
    pub amount: Decimal,
    /// False when the tenant has no rate configured for this status.
    pub configured: bool,
}

/// Overtime entries of the month and their totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeSummary {
    /// The computed entries, ordered by date then start time.
    pub entries: Vec<OvertimeEntry>,
    /// Hours worked on ordinary days.
    pub ordinary_hours: Decimal,
    /// Amount for ordinary-day overtime.
    pub ordinary_amount: Decimal,
    /// Hours worked on Sundays and holidays.
    pub premium_hours: Decimal,
    /// Amount for Sunday and holiday overtime.
    pub premium_amount: Decimal,
    /// Total overtime amount.
    pub total_amount: Decimal,
}

/// One component of gross salary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarningLine {
    /// The kind of earning (e.g. "attendance", "overtime_ordinary", "transport").
    #[serde(rename = "type")]
    pub earning_type: String,
    /// A description of the earning.
    pub description: String,
    /// The amount.
    pub amount: Decimal,
}

/// The kinds of amounts withheld from gross salary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionKind {
    /// Employee share of social security (CNSS).
    SocialSecurity,
    /// Progressive or flat income levy (RTS).
    IncomeLevy,
    /// Alternate flat levy (VF).
    AlternateLevy,
    /// Salary advances.
    Advances,
    /// Sanctions.
    Sanctions,
}

/// One deduction, always present even when inactive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionLine {
    /// The deduction kind.
    pub kind: DeductionKind,
    /// Whether the deduction is active for this employee.
    pub active: bool,
    /// The amount the rate was applied to.
    pub base: Decimal,
    /// The percentage applied, when the deduction is rate-based.
    pub rate: Option<Decimal>,
    /// The amount withheld (zero when inactive).
    pub amount: Decimal,
}

/// One bracket slice of a progressive income levy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevyBracketLine {
    /// Lower bound of the bracket (exclusive of the previous bracket).
    pub lower_bound: Decimal,
    /// Upper bound of the bracket, `None` for the open top bracket.
    pub upper_bound: Option<Decimal>,
    /// Bracket rate in percent.
    pub rate: Decimal,
    /// The part of the taxable base falling in this bracket.
    pub taxable_slice: Decimal,
    /// slice × rate.
    pub amount: Decimal,
}

/// All deductions applied to one payroll record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionBreakdown {
    /// One line per [`DeductionKind`], in declaration order.
    pub lines: Vec<DeductionLine>,
    /// Bracket detail when the income levy is progressive.
    pub income_levy_brackets: Vec<LevyBracketLine>,
    /// Sum of all deduction amounts.
    pub total: Decimal,
}

impl DeductionBreakdown {
    /// Returns the amount withheld for `kind`, zero when absent.
    pub fn amount(&self, kind: DeductionKind) -> Decimal {
        self.lines
            .iter()
            .find(|line| line.kind == kind)
            .map(|line| line.amount)
            .unwrap_or(Decimal::ZERO)
    }
}

/// Codes identifying the kind of anomaly an [`AuditWarning`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningCode {
    /// A status, overtime or deduction rate is not configured for the tenant.
    MissingRateConfiguration,
    /// Deductions exceed gross salary.
    NegativeNetPay,
    /// Attendance or overtime records outside the period or for another employee were ignored.
    IgnoredAttendance,
}

/// How much attention a warning needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational.
    Low,
    /// Should be reviewed before payment.
    Medium,
    /// Must be resolved before payment.
    High,
}

/// A warning generated during calculation.
///
/// Warnings indicate anomalies that don't prevent calculation
/// but must be visible to whoever reviews the payroll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: WarningCode,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level.
    pub severity: Severity,
}

impl AuditWarning {
    /// Builds a `MISSING_RATE_CONFIGURATION` warning for `subject`.
    pub fn missing_rate(subject: &str) -> Self {
        Self {
            code: WarningCode::MissingRateConfiguration,
            message: format!("No rate configured for {}; contribution set to zero", subject),
            severity: Severity::Medium,
        }
    }
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// The complete monthly payroll record of one employee.
///
/// Unique per (employee, month, year). It is a derived aggregate: it is
/// always rebuilt from attendance, overtime and tenant configuration, never
/// patched in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRecord {
    /// The tenant the record belongs to.
    pub tenant_id: String,
    /// The employee identifier.
    pub employee_id: String,
    /// The employee code.
    pub matricule: String,
    /// The employee's full name.
    pub employee_name: String,
    /// The pay period.
    pub period: PayPeriod,
    /// Number of days in the period.
    pub days_in_month: u32,
    /// Every day of the period with its status.
    pub daily_statuses: Vec<DayAttendance>,
    /// Occurrences per status (statuses with no occurrence are omitted).
    pub status_counts: BTreeMap<AttendanceStatus, u32>,
    /// Grouped counts for payslip display.
    pub attendance_summary: AttendanceSummary,
    /// Valuation per status.
    pub status_lines: Vec<StatusLine>,
    /// Sum of the status lines.
    pub attendance_total: Decimal,
    /// Overtime detail.
    pub overtime: OvertimeSummary,
    /// Components of gross salary.
    pub earnings: Vec<EarningLine>,
    /// Gross salary.
    pub gross_salary: Decimal,
    /// Statutory and other deductions.
    pub deductions: DeductionBreakdown,
    /// Employer share of social security (not withheld from the employee).
    pub employer_social_security: Decimal,
    /// Gross salary plus employer social security.
    pub employer_cost: Decimal,
    /// Gross salary minus all deductions.
    pub net_payable: Decimal,
    /// Net payable converted to the tenant's reference currency, when configured.
    pub net_payable_reference: Option<Decimal>,
    /// Anomalies needing attention.
    pub warnings: Vec<AuditWarning>,
    /// The sequence of calculation steps.
    pub audit_trace: Vec<AuditStep>,
}

impl PayrollRecord {
    /// True when any warning of `code` was raised.
    pub fn has_warning(&self, code: WarningCode) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }

    /// Statuses that were counted but have no configured rate.
    pub fn unconfigured_statuses(&self) -> Vec<AttendanceStatus> {
        self.status_lines
            .iter()
            .filter(|line| !line.configured)
            .map(|line| line.status)
            .collect()
    }
}

/// An employee whose record could not be built during a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeFailure {
    /// The employee identifier.
    pub employee_id: String,
    /// Why the computation failed.
    pub message: String,
}

/// The outcome of a payroll run over many employees.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{PayPeriod, PayrollRunReport};
/// use chrono::Utc;
/// use uuid::Uuid;
///
/// let report = PayrollRunReport {
///     run_id: Uuid::new_v4(),
///     timestamp: Utc::now(),
///     engine_version: "0.1.0".to_string(),
///     tenant_id: "acme_mining".to_string(),
///     period: PayPeriod::new(2025, 3).unwrap(),
///     records: vec![],
///     failures: vec![],
///     skipped: vec![],
///     duration_us: 0,
/// };
/// assert!(report.is_complete());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRunReport {
    /// Unique identifier for this run.
    pub run_id: Uuid,
    /// When the run was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the run.
    pub engine_version: String,
    /// The tenant the run was performed for.
    pub tenant_id: String,
    /// The pay period.
    pub period: PayPeriod,
    /// Records built successfully.
    pub records: Vec<PayrollRecord>,
    /// Employees whose computation failed.
    pub failures: Vec<EmployeeFailure>,
    /// Archived employees left out of the run.
    pub skipped: Vec<String>,
    /// The total run duration in microseconds.
    pub duration_us: u64,
}

impl PayrollRunReport {
    /// True when no employee failed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Returns the record for `employee_id`, if it was built.
    pub fn record(&self, employee_id: &str) -> Option<&PayrollRecord> {
        self.records.iter().find(|r| r.employee_id == employee_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_warning_code_serialization() {
        let json = serde_json::to_string(&WarningCode::MissingRateConfiguration).unwrap();
        assert_eq!(json, "\"MISSING_RATE_CONFIGURATION\"");

        let json = serde_json::to_string(&WarningCode::NegativeNetPay).unwrap();
        assert_eq!(json, "\"NEGATIVE_NET_PAY\"");
    }

    #[test]
    fn test_missing_rate_warning() {
        let warning = AuditWarning::missing_rate("status P(dim_Pm)");
        assert_eq!(warning.code, WarningCode::MissingRateConfiguration);
        assert_eq!(warning.severity, Severity::Medium);
        assert!(warning.message.contains("P(dim_Pm)"));
    }

    #[test]
    fn test_deduction_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&DeductionKind::SocialSecurity).unwrap(),
            "\"social_security\""
        );
        assert_eq!(
            serde_json::to_string(&DeductionKind::AlternateLevy).unwrap(),
            "\"alternate_levy\""
        );
    }

    #[test]
    fn test_deduction_breakdown_amount_lookup() {
        let breakdown = DeductionBreakdown {
            lines: vec![
                DeductionLine {
                    kind: DeductionKind::SocialSecurity,
                    active: true,
                    base: dec("1000000"),
                    rate: Some(dec("5")),
                    amount: dec("50000"),
                },
                DeductionLine {
                    kind: DeductionKind::AlternateLevy,
                    active: false,
                    base: dec("1000000"),
                    rate: Some(dec("7")),
                    amount: Decimal::ZERO,
                },
            ],
            income_levy_brackets: vec![],
            total: dec("50000"),
        };
        assert_eq!(breakdown.amount(DeductionKind::SocialSecurity), dec("50000"));
        assert_eq!(breakdown.amount(DeductionKind::AlternateLevy), Decimal::ZERO);
        assert_eq!(breakdown.amount(DeductionKind::Sanctions), Decimal::ZERO);
    }

    #[test]
    fn test_status_counts_serialize_in_status_order() {
        let mut counts = BTreeMap::new();
        counts.insert(AttendanceStatus::DayOff, 2u32);
        counts.insert(AttendanceStatus::PresentMorning, 3u32);
        let json = serde_json::to_string(&counts).unwrap();
        assert_eq!(json, r#"{"present_morning":3,"day_off":2}"#);
    }

    #[test]
    fn test_earning_line_renames_type() {
        let line = EarningLine {
            earning_type: "transport".to_string(),
            description: "Transport allowance".to_string(),
            amount: dec("150000"),
        };
        let json = serde_json::to_string(&line).unwrap();
        assert!(json.contains("\"type\":\"transport\""));
        assert!(json.contains("\"amount\":\"150000\""));
    }
}
