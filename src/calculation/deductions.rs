//! Statutory deduction calculation.
//!
//! This module applies the social-security contribution (CNSS), the income
//! levy (RTS, flat or progressive) and the alternate levy (VF) to gross
//! salary, then withholds advances and sanctions.
//!
//! ## Rules
//!
//! - Rates are percentages; employee overrides replace tenant defaults
//! - Each statutory deduction can be switched off per tenant or per employee
//! - An inactive deduction still produces a line with a zero amount
//! - Progressive brackets are marginal: each rate applies only to the slice
//!   of the base inside its bracket
//! - Every withheld amount is rounded half-up to the currency unit

use rust_decimal::Decimal;

use crate::config::{
    AlternateLevyConfig, CurrencyConfig, DeductionConfig, IncomeLevyConfig, LevyBase, LevyBracket,
    LevyMode, SocialSecurityConfig,
};
use crate::models::{
    AuditStep, AuditWarning, DeductionBreakdown, DeductionKind, DeductionLine, Employee,
    LevyBracketLine,
};

/// The result of the social-security calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialSecurityResult {
    /// The employee contribution, withheld from gross.
    pub line: DeductionLine,
    /// The employer contribution, paid on top of gross.
    pub employer_amount: Decimal,
    /// The audit step recording the calculation.
    pub audit_step: AuditStep,
}

/// The result of a levy calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevyResult {
    /// The deduction line.
    pub line: DeductionLine,
    /// Bracket detail; empty unless the levy is progressive.
    pub brackets: Vec<LevyBracketLine>,
    /// Raised when the levy is active but has no usable rate.
    pub warning: Option<AuditWarning>,
    /// The audit step recording the calculation.
    pub audit_step: AuditStep,
}

/// All deductions of one payroll record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeductionsResult {
    /// The deduction lines and total.
    pub breakdown: DeductionBreakdown,
    /// The employer social-security contribution.
    pub employer_social_security: Decimal,
    /// Warnings raised by missing rates.
    pub warnings: Vec<AuditWarning>,
    /// One audit step per statutory deduction plus one for the total.
    pub audit_steps: Vec<AuditStep>,
}

fn percent_of(base: Decimal, rate: Decimal) -> Decimal {
    base * rate / Decimal::ONE_HUNDRED
}

/// Calculates the employee and employer social-security contributions.
///
/// The employee rate defaults to the tenant's and is replaced by the
/// employee's override when present; the same holds for the employer rate.
/// A negative gross is treated as a zero base.
pub fn calculate_social_security(
    gross: Decimal,
    employee: &Employee,
    config: &SocialSecurityConfig,
    currency: &CurrencyConfig,
    step_number: u32,
) -> SocialSecurityResult {
    let active = employee
        .deduction_switches
        .social_security
        .unwrap_or(config.active);
    let employee_rate = employee
        .statutory_overrides
        .social_security_employee_rate
        .unwrap_or(config.employee_rate);
    let employer_rate = employee
        .statutory_overrides
        .social_security_employer_rate
        .unwrap_or(config.employer_rate);
    let base = gross.max(Decimal::ZERO);

    let (amount, employer_amount) = if active {
        (
            currency.round(percent_of(base, employee_rate)),
            currency.round(percent_of(base, employer_rate)),
        )
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    };

    let reasoning = if active {
        format!(
            "Employee {}% and employer {}% of {} gross",
            employee_rate.normalize(),
            employer_rate.normalize(),
            base.normalize()
        )
    } else {
        "Social security inactive for this employee, contributes zero".to_string()
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "social_security".to_string(),
        rule_name: "Social Security Contribution".to_string(),
        input: serde_json::json!({
            "gross": base.normalize().to_string(),
            "active": active,
            "employee_rate": employee_rate.normalize().to_string(),
            "employer_rate": employer_rate.normalize().to_string(),
        }),
        output: serde_json::json!({
            "employee_amount": amount.normalize().to_string(),
            "employer_amount": employer_amount.normalize().to_string(),
        }),
        reasoning,
    };

    SocialSecurityResult {
        line: DeductionLine {
            kind: DeductionKind::SocialSecurity,
            active,
            base,
            rate: Some(employee_rate),
            amount,
        },
        employer_amount,
        audit_step,
    }
}

/// Applies a bracketed schedule marginally to `base`.
///
/// Each bracket spans from the previous bracket's upper bound (zero for the
/// first) to its own upper bound; only the part of `base` inside that span is
/// taxed at the bracket rate. Returns the unrounded levy and one line per
/// bracket.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::progressive_levy;
/// use payroll_engine::config::LevyBracket;
/// use rust_decimal::Decimal;
///
/// let brackets = vec![
///     LevyBracket { upper_bound: Some(Decimal::new(1_000_000, 0)), rate: Decimal::ZERO },
///     LevyBracket { upper_bound: Some(Decimal::new(3_000_000, 0)), rate: Decimal::new(10, 0) },
///     LevyBracket { upper_bound: None, rate: Decimal::new(15, 0) },
/// ];
/// let (levy, lines) = progressive_levy(Decimal::new(4_000_000, 0), &brackets);
///
/// assert_eq!(levy, Decimal::new(350_000, 0));
/// assert_eq!(lines[1].taxable_slice, Decimal::new(2_000_000, 0));
/// ```
pub fn progressive_levy(base: Decimal, brackets: &[LevyBracket]) -> (Decimal, Vec<LevyBracketLine>) {
    let base = base.max(Decimal::ZERO);
    let mut lower_bound = Decimal::ZERO;
    let mut total = Decimal::ZERO;
    let mut lines = Vec::with_capacity(brackets.len());

    for bracket in brackets {
        let ceiling = match bracket.upper_bound {
            Some(upper) => base.min(upper),
            None => base,
        };
        let taxable_slice = (ceiling - lower_bound).max(Decimal::ZERO);
        let amount = percent_of(taxable_slice, bracket.rate);
        total += amount;
        lines.push(LevyBracketLine {
            lower_bound,
            upper_bound: bracket.upper_bound,
            rate: bracket.rate,
            taxable_slice,
            amount,
        });
        match bracket.upper_bound {
            Some(upper) => lower_bound = upper,
            None => break,
        }
    }

    (total, lines)
}

/// Calculates the income levy (RTS).
///
/// The base is gross salary, or gross minus the employee social-security
/// contribution when the tenant is configured that way. Flat mode applies
/// `flat_rate` to the whole base; progressive mode applies the brackets
/// marginally. An active levy with no flat rate or no brackets contributes
/// zero and raises a missing-rate warning.
pub fn calculate_income_levy(
    gross: Decimal,
    social_security_amount: Decimal,
    employee: &Employee,
    config: &IncomeLevyConfig,
    currency: &CurrencyConfig,
    step_number: u32,
) -> LevyResult {
    let active = employee
        .deduction_switches
        .income_levy
        .unwrap_or(config.active);
    let base = match config.base {
        LevyBase::Gross => gross,
        LevyBase::GrossAfterSocialSecurity => gross - social_security_amount,
    }
    .max(Decimal::ZERO);

    let mut warning = None;
    let mut brackets = Vec::new();
    let (rate, amount, reasoning) = if !active {
        (
            config.flat_rate.filter(|_| config.mode == LevyMode::Flat),
            Decimal::ZERO,
            "Income levy inactive for this employee, contributes zero".to_string(),
        )
    } else {
        match config.mode {
            LevyMode::Flat => match config.flat_rate {
                Some(rate) => {
                    let amount = currency.round(percent_of(base, rate));
                    (
                        Some(rate),
                        amount,
                        format!("Flat {}% of {} base", rate.normalize(), base.normalize()),
                    )
                }
                None => {
                    warning = Some(AuditWarning::missing_rate("income levy (flat rate)"));
                    (
                        None,
                        Decimal::ZERO,
                        "Flat income levy has no rate configured, contributes zero".to_string(),
                    )
                }
            },
            LevyMode::Progressive if config.brackets.is_empty() => {
                warning = Some(AuditWarning::missing_rate("income levy (brackets)"));
                (
                    None,
                    Decimal::ZERO,
                    "Progressive income levy has no brackets configured, contributes zero"
                        .to_string(),
                )
            }
            LevyMode::Progressive => {
                let (levy, lines) = progressive_levy(base, &config.brackets);
                let reasoning = format!(
                    "Marginal brackets on {} base: {}",
                    base.normalize(),
                    lines
                        .iter()
                        .filter(|line| line.taxable_slice > Decimal::ZERO)
                        .map(|line| format!(
                            "{}% × {}",
                            line.rate.normalize(),
                            line.taxable_slice.normalize()
                        ))
                        .collect::<Vec<_>>()
                        .join(" + ")
                );
                brackets = lines;
                (None, currency.round(levy), reasoning)
            }
        }
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "income_levy".to_string(),
        rule_name: "Income Levy".to_string(),
        input: serde_json::json!({
            "base": base.normalize().to_string(),
            "base_kind": config.base,
            "mode": config.mode,
            "active": active,
        }),
        output: serde_json::json!({
            "amount": amount.normalize().to_string(),
            "brackets_applied": brackets
                .iter()
                .filter(|line| line.taxable_slice > Decimal::ZERO)
                .count(),
        }),
        reasoning,
    };

    LevyResult {
        line: DeductionLine {
            kind: DeductionKind::IncomeLevy,
            active,
            base,
            rate,
            amount,
        },
        brackets,
        warning,
        audit_step,
    }
}

/// Calculates the alternate flat levy (VF) on gross salary.
///
/// The employee override takes precedence over the tenant rate. An active
/// levy with no rate at either level contributes zero and raises a
/// missing-rate warning.
pub fn calculate_alternate_levy(
    gross: Decimal,
    employee: &Employee,
    config: &AlternateLevyConfig,
    currency: &CurrencyConfig,
    step_number: u32,
) -> LevyResult {
    let active = employee
        .deduction_switches
        .alternate_levy
        .unwrap_or(config.active);
    let rate = employee
        .statutory_overrides
        .alternate_levy_rate
        .or(config.rate);
    let base = gross.max(Decimal::ZERO);

    let mut warning = None;
    let (amount, reasoning) = match (active, rate) {
        (false, _) => (
            Decimal::ZERO,
            "Alternate levy inactive for this employee, contributes zero".to_string(),
        ),
        (true, Some(rate)) => (
            currency.round(percent_of(base, rate)),
            format!("{}% of {} gross", rate.normalize(), base.normalize()),
        ),
        (true, None) => {
            warning = Some(AuditWarning::missing_rate("alternate levy"));
            (
                Decimal::ZERO,
                "Alternate levy has no rate configured, contributes zero".to_string(),
            )
        }
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "alternate_levy".to_string(),
        rule_name: "Alternate Levy".to_string(),
        input: serde_json::json!({
            "gross": base.normalize().to_string(),
            "rate": rate.map(|rate| rate.normalize().to_string()),
            "active": active,
        }),
        output: serde_json::json!({
            "amount": amount.normalize().to_string(),
        }),
        reasoning,
    };

    LevyResult {
        line: DeductionLine {
            kind: DeductionKind::AlternateLevy,
            active,
            base,
            rate,
            amount,
        },
        brackets: Vec::new(),
        warning,
        audit_step,
    }
}

/// Applies every deduction to gross salary.
///
/// Lines are produced in a fixed order: social security, income levy,
/// alternate levy, advances, sanctions. Inactive deductions stay in the
/// breakdown with a zero amount.
pub fn apply_deductions(
    gross: Decimal,
    employee: &Employee,
    config: &DeductionConfig,
    currency: &CurrencyConfig,
    first_step: u32,
) -> DeductionsResult {
    let mut step_number = first_step;
    let mut warnings = Vec::new();
    let mut audit_steps = Vec::new();

    let social_security = calculate_social_security(
        gross,
        employee,
        &config.social_security,
        currency,
        step_number,
    );
    audit_steps.push(social_security.audit_step);
    step_number += 1;

    let income_levy = calculate_income_levy(
        gross,
        social_security.line.amount,
        employee,
        &config.income_levy,
        currency,
        step_number,
    );
    audit_steps.push(income_levy.audit_step);
    warnings.extend(income_levy.warning);
    step_number += 1;

    let alternate_levy = calculate_alternate_levy(
        gross,
        employee,
        &config.alternate_levy,
        currency,
        step_number,
    );
    audit_steps.push(alternate_levy.audit_step);
    warnings.extend(alternate_levy.warning);
    step_number += 1;

    let withheld = |kind: DeductionKind, amount: Decimal| DeductionLine {
        kind,
        active: true,
        base: amount,
        rate: None,
        amount: currency.round(amount),
    };

    let lines = vec![
        social_security.line,
        income_levy.line,
        alternate_levy.line,
        withheld(DeductionKind::Advances, employee.advances),
        withheld(DeductionKind::Sanctions, employee.sanctions),
    ];
    let total: Decimal = lines.iter().map(|line| line.amount).sum();

    audit_steps.push(AuditStep {
        step_number,
        rule_id: "deduction_total".to_string(),
        rule_name: "Deduction Total".to_string(),
        input: serde_json::json!(lines
            .iter()
            .map(|line| serde_json::json!({
                "kind": line.kind,
                "active": line.active,
                "amount": line.amount.normalize().to_string(),
            }))
            .collect::<Vec<_>>()),
        output: serde_json::json!({
            "total": total.normalize().to_string(),
        }),
        reasoning: format!(
            "Statutory deductions, advances and sanctions withheld: {}",
            total.normalize()
        ),
    });

    DeductionsResult {
        breakdown: DeductionBreakdown {
            lines,
            income_levy_brackets: income_levy.brackets,
            total,
        },
        employer_social_security: social_security.employer_amount,
        warnings,
        audit_steps,
    }
}
