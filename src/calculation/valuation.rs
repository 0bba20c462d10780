//! Status-to-amount valuation.
//!
//! Converts per-status occurrence counts into amounts using a tenant's rate
//! table. Valuation is a pure function of its inputs: the same counts and
//! table always produce the same lines and total.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::config::RateTable;
use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceStatus, AuditStep, StatusLine};

/// The valued attendance of one month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Valuation {
    /// One line per status with at least one occurrence, in status order.
    pub lines: Vec<StatusLine>,
    /// Exact sum of the line amounts.
    pub total: Decimal,
    /// Statuses that occurred but have no rate in the table.
    pub unconfigured: Vec<AttendanceStatus>,
    /// The audit step recording this valuation.
    pub audit_step: AuditStep,
}

/// Values occurrence counts against a rate table.
///
/// A status missing from the table contributes zero and is listed in
/// [`Valuation::unconfigured`]; it never fails. Line amounts are not rounded,
/// so the total is exactly the sum of the lines.
///
/// # Errors
///
/// Returns `CalculationError` if a line amount or the total overflows.
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use payroll_engine::calculation::value_statuses;
/// use payroll_engine::config::RateTable;
/// use payroll_engine::models::AttendanceStatus;
/// use rust_decimal::Decimal;
///
/// let mut amounts = BTreeMap::new();
/// amounts.insert(AttendanceStatus::PresentFullDay, Decimal::new(80000, 0));
/// let rates = RateTable::new(amounts);
///
/// let mut counts = BTreeMap::new();
/// counts.insert(AttendanceStatus::PresentFullDay, 20);
/// counts.insert(AttendanceStatus::Training, 2);
///
/// let valuation = value_statuses(&counts, &rates, 1).unwrap();
/// assert_eq!(valuation.total, Decimal::new(1_600_000, 0));
/// assert_eq!(valuation.unconfigured, vec![AttendanceStatus::Training]);
/// ```
pub fn value_statuses(
    counts: &BTreeMap<AttendanceStatus, u32>,
    rates: &RateTable,
    step_number: u32,
) -> EngineResult<Valuation> {
    let mut lines = Vec::with_capacity(counts.len());
    let mut unconfigured = Vec::new();

    for (&status, &count) in counts {
        if count == 0 {
            continue;
        }
        let configured_amount = rates.amount(status);
        if configured_amount.is_none() {
            unconfigured.push(status);
        }
        let unit_amount = configured_amount.unwrap_or(Decimal::ZERO);
        let amount = unit_amount
            .checked_mul(Decimal::from(count))
            .ok_or_else(|| EngineError::CalculationError {
                message: format!(
                    "Amount for {} overflows: {} × {}",
                    status.code(),
                    unit_amount,
                    count
                ),
            })?;
        lines.push(StatusLine {
            status,
            count,
            unit_amount,
            amount,
            configured: configured_amount.is_some(),
        });
    }

    let total = lines
        .iter()
        .try_fold(Decimal::ZERO, |acc, line| acc.checked_add(line.amount))
        .ok_or_else(|| EngineError::CalculationError {
            message: "Attendance total overflows".to_string(),
        })?;

    let reasoning = if unconfigured.is_empty() {
        format!(
            "{} statuses valued against the tenant rate table, total {}",
            lines.len(),
            total.normalize()
        )
    } else {
        format!(
            "{} statuses valued, total {}; no rate configured for {}, valued at zero",
            lines.len(),
            total.normalize(),
            unconfigured
                .iter()
                .map(|s| s.code())
                .collect::<Vec<_>>()
                .join(", ")
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "status_valuation".to_string(),
        rule_name: "Status-to-Amount Valuation".to_string(),
        input: serde_json::json!({
            "counts": lines
                .iter()
                .map(|line| (line.status.code().to_string(), line.count))
                .collect::<BTreeMap<_, _>>(),
        }),
        output: serde_json::json!({
            "amounts": lines
                .iter()
                .map(|line| (line.status.code().to_string(), line.amount.normalize().to_string()))
                .collect::<BTreeMap<_, _>>(),
            "total": total.normalize().to_string(),
            "unconfigured": unconfigured.iter().map(|s| s.code()).collect::<Vec<_>>(),
        }),
        reasoning,
    };

    Ok(Valuation {
        lines,
        total,
        unconfigured,
        audit_step,
    })
}
