//! Configuration types for payroll computation.
//!
//! This module contains the strongly-typed per-tenant configuration structures
//! that are deserialized from YAML configuration files.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::models::AttendanceStatus;

/// Conversion from the payroll currency to a reference currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceCurrency {
    /// ISO code of the reference currency (e.g. "EUR").
    pub code: String,
    /// Units of the payroll currency per one unit of the reference currency.
    pub rate: Decimal,
}

/// Currency settings of a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// ISO code of the payroll currency (e.g. "GNF").
    pub code: String,
    /// Number of decimal places of the smallest currency unit.
    #[serde(default)]
    pub minor_units: u32,
    /// Optional reference currency for reporting.
    #[serde(default)]
    pub reference: Option<ReferenceCurrency>,
}

impl CurrencyConfig {
    /// Rounds half-up (away from zero) to the smallest currency unit.
    pub fn round(&self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(self.minor_units, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Converts `amount` to the reference currency, rounded to cents.
    ///
    /// Returns `None` when no reference currency is configured or its rate is zero.
    pub fn to_reference(&self, amount: Decimal) -> Option<Decimal> {
        let reference = self.reference.as_ref()?;
        if reference.rate.is_zero() {
            return None;
        }
        Some((amount / reference.rate).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }
}

/// Tenant metadata from tenant.yaml.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantMetadata {
    /// The tenant identifier.
    pub tenant_id: String,
    /// The employer's display name.
    pub name: String,
    /// Currency settings.
    pub currency: CurrencyConfig,
}

/// Amount paid per occurrence of each attendance status.
///
/// A status absent from the table is "missing configuration": valuation
/// treats it as zero and flags it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTable {
    /// Map of status to amount per occurrence.
    pub amounts: BTreeMap<AttendanceStatus, Decimal>,
}

impl RateTable {
    /// Creates a rate table from explicit amounts.
    pub fn new(amounts: BTreeMap<AttendanceStatus, Decimal>) -> Self {
        Self { amounts }
    }

    /// Inserts an explicit zero for every zero-by-default status the table omits.
    pub fn with_zero_defaults(mut self) -> Self {
        for status in AttendanceStatus::ALL {
            if status.defaults_to_zero() {
                self.amounts.entry(status).or_insert(Decimal::ZERO);
            }
        }
        self
    }

    /// Returns the configured amount for `status`.
    pub fn amount(&self, status: AttendanceStatus) -> Option<Decimal> {
        self.amounts.get(&status).copied()
    }
}

/// Overtime settings from overtime.yaml.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeConfig {
    /// Hours in a standard workday; daily rate ÷ this gives the default hourly rate.
    pub standard_workday_hours: Decimal,
    /// Multiplier for overtime on ordinary days.
    pub ordinary_multiplier: Decimal,
    /// Multiplier for overtime on Sundays and public holidays.
    pub sunday_holiday_multiplier: Decimal,
}

impl Default for OvertimeConfig {
    fn default() -> Self {
        Self {
            standard_workday_hours: Decimal::from(8),
            ordinary_multiplier: Decimal::ONE,
            sunday_holiday_multiplier: Decimal::from(2),
        }
    }
}

/// Social-security (CNSS) settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialSecurityConfig {
    /// Whether the employee contribution is withheld.
    pub active: bool,
    /// Employee share in percent.
    #[serde(default = "default_employee_rate")]
    pub employee_rate: Decimal,
    /// Employer share in percent.
    #[serde(default = "default_employer_rate")]
    pub employer_rate: Decimal,
}

fn default_employee_rate() -> Decimal {
    Decimal::from(5)
}

fn default_employer_rate() -> Decimal {
    Decimal::from(18)
}

/// Whether the income levy is computed flat or by brackets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevyMode {
    /// One percentage on the whole base.
    Flat,
    /// Marginal rates per bracket.
    Progressive,
}

/// The amount the income levy is computed on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevyBase {
    /// Gross salary.
    #[default]
    Gross,
    /// Gross salary minus the employee social-security contribution.
    GrossAfterSocialSecurity,
}

/// One bracket of a progressive schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevyBracket {
    /// Inclusive upper bound of the bracket; `None` for the open top bracket.
    #[serde(default)]
    pub upper_bound: Option<Decimal>,
    /// Rate in percent applied to the slice of income inside the bracket.
    pub rate: Decimal,
}

/// Income levy (RTS) settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeLevyConfig {
    /// Whether the levy is withheld.
    pub active: bool,
    /// Flat or progressive.
    pub mode: LevyMode,
    /// What the levy is computed on.
    #[serde(default)]
    pub base: LevyBase,
    /// Percentage used in flat mode.
    #[serde(default)]
    pub flat_rate: Option<Decimal>,
    /// Ordered brackets used in progressive mode.
    #[serde(default)]
    pub brackets: Vec<LevyBracket>,
}

/// Alternate levy (VF) settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternateLevyConfig {
    /// Whether the levy is withheld.
    pub active: bool,
    /// Percentage of gross salary. An active levy without a rate is flagged.
    #[serde(default)]
    pub rate: Option<Decimal>,
}

/// Deduction configuration from deductions.yaml.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionConfig {
    /// Social security (CNSS).
    pub social_security: SocialSecurityConfig,
    /// Income levy (RTS).
    pub income_levy: IncomeLevyConfig,
    /// Alternate levy (VF).
    pub alternate_levy: AlternateLevyConfig,
}

/// The complete configuration of one tenant.
///
/// Every payroll computation receives this explicitly; nothing in the engine
/// reads rates from global state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantConfig {
    /// Tenant metadata and currency.
    pub metadata: TenantMetadata,
    /// Status-to-amount table.
    pub rates: RateTable,
    /// Overtime settings.
    pub overtime: OvertimeConfig,
    /// Deduction settings.
    pub deductions: DeductionConfig,
}

impl TenantConfig {
    /// Returns the tenant identifier.
    pub fn tenant_id(&self) -> &str {
        &self.metadata.tenant_id
    }

    /// Returns the currency settings.
    pub fn currency(&self) -> &CurrencyConfig {
        &self.metadata.currency
    }
}
