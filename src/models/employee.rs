//! Employee model and related types.
//!
//! This module defines the Employee struct together with the per-employee
//! overrides that take precedence over tenant-level payroll configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-employee statutory rate overrides, in percent.
///
/// A `None` rate falls back to the tenant's configured default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatutoryOverrides {
    /// Employee share of social security (CNSS), in percent.
    #[serde(default)]
    pub social_security_employee_rate: Option<Decimal>,
    /// Employer share of social security (CNSS), in percent.
    #[serde(default)]
    pub social_security_employer_rate: Option<Decimal>,
    /// Alternate flat levy (VF), in percent.
    #[serde(default)]
    pub alternate_levy_rate: Option<Decimal>,
}

/// Per-employee switches overriding the tenant's active flag for each deduction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionSwitches {
    /// Overrides whether social security is withheld.
    #[serde(default)]
    pub social_security: Option<bool>,
    /// Overrides whether the income levy is withheld.
    #[serde(default)]
    pub income_levy: Option<bool>,
    /// Overrides whether the alternate levy is withheld.
    #[serde(default)]
    pub alternate_levy: Option<bool>,
}

/// Fixed monthly allowances paid on top of attendance amounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyAllowances {
    /// Transport allowance.
    #[serde(default)]
    pub transport: Decimal,
    /// Housing allowance.
    #[serde(default)]
    pub housing: Decimal,
    /// Cost-of-living allowance.
    #[serde(default)]
    pub cost_of_living: Decimal,
    /// Discipline bonus.
    #[serde(default)]
    pub discipline_bonus: Decimal,
    /// Public-holiday bonus.
    #[serde(default)]
    pub holiday_bonus: Decimal,
}

impl MonthlyAllowances {
    /// Returns each allowance with its type name, in a fixed order.
    pub fn entries(&self) -> [(&'static str, Decimal); 5] {
        [
            ("transport", self.transport),
            ("housing", self.housing),
            ("cost_of_living", self.cost_of_living),
            ("discipline_bonus", self.discipline_bonus),
            ("holiday_bonus", self.holiday_bonus),
        ]
    }
}

/// An employee on a tenant's payroll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// The tenant (employer) the employee belongs to.
    pub tenant_id: String,
    /// Employee code printed on payslips.
    pub matricule: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Base daily rate, used to derive the default overtime hourly rate.
    pub daily_rate: Decimal,
    /// Optional hourly rate used for overtime instead of the derived one.
    #[serde(default)]
    pub hourly_rate: Option<Decimal>,
    /// Statutory rate overrides.
    #[serde(default)]
    pub statutory_overrides: StatutoryOverrides,
    /// Deduction activation overrides.
    #[serde(default)]
    pub deduction_switches: DeductionSwitches,
    /// Outstanding advance withheld from the next payslip.
    #[serde(default)]
    pub advances: Decimal,
    /// Accumulated sanction deductions.
    #[serde(default)]
    pub sanctions: Decimal,
    /// Fixed monthly allowances.
    #[serde(default)]
    pub allowances: MonthlyAllowances,
    /// Amount paid per kilometre driven on duty.
    #[serde(default)]
    pub value_per_km: Decimal,
    /// Kilometres driven on duty during the pay period.
    #[serde(default)]
    pub kilometres: Decimal,
    /// Soft-archived employees are kept but excluded from payroll runs.
    #[serde(default)]
    pub archived: bool,
}

impl Employee {
    /// Returns "first last".
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::Employee;
    /// use rust_decimal::Decimal;
    ///
    /// let employee: Employee = serde_json::from_value(serde_json::json!({
    ///     "id": "emp_001",
    ///     "tenant_id": "acme_mining",
    ///     "matricule": "ACM-001",
    ///     "first_name": "Mamadou",
    ///     "last_name": "Diallo",
    ///     "daily_rate": "80000"
    /// })).unwrap();
    /// assert_eq!(employee.full_name(), "Mamadou Diallo");
    /// assert_eq!(employee.daily_rate, Decimal::new(80000, 0));
    /// ```
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Allowance for kilometres driven during the period.
    pub fn mileage_allowance(&self) -> Decimal {
        self.kilometres * self.value_per_km
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_employee() -> Employee {
        Employee {
            id: "emp_001".to_string(),
            tenant_id: "acme_mining".to_string(),
            matricule: "ACM-001".to_string(),
            first_name: "Aissatou".to_string(),
            last_name: "Bah".to_string(),
            daily_rate: Decimal::new(80000, 0),
            hourly_rate: None,
            statutory_overrides: StatutoryOverrides::default(),
            deduction_switches: DeductionSwitches::default(),
            advances: Decimal::ZERO,
            sanctions: Decimal::ZERO,
            allowances: MonthlyAllowances::default(),
            value_per_km: Decimal::ZERO,
            kilometres: Decimal::ZERO,
            archived: false,
        }
    }

    #[test]
    fn test_deserialize_minimal_employee_uses_defaults() {
        let json = r#"{
            "id": "emp_002",
            "tenant_id": "acme_mining",
            "matricule": "ACM-002",
            "first_name": "Ibrahima",
            "last_name": "Sow",
            "daily_rate": "75000"
        }"#;

        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee.hourly_rate, None);
        assert_eq!(employee.advances, Decimal::ZERO);
        assert_eq!(employee.statutory_overrides, StatutoryOverrides::default());
        assert_eq!(employee.deduction_switches, DeductionSwitches::default());
        assert!(!employee.archived);
    }

    #[test]
    fn test_deserialize_employee_with_overrides() {
        let json = r#"{
            "id": "emp_003",
            "tenant_id": "acme_mining",
            "matricule": "ACM-003",
            "first_name": "Fatoumata",
            "last_name": "Camara",
            "daily_rate": "90000",
            "hourly_rate": "15000",
            "statutory_overrides": {"social_security_employee_rate": "4.5"},
            "deduction_switches": {"income_levy": false},
            "advances": "100000",
            "sanctions": "25000"
        }"#;

        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee.hourly_rate, Some(Decimal::new(15000, 0)));
        assert_eq!(
            employee.statutory_overrides.social_security_employee_rate,
            Some(Decimal::new(45, 1))
        );
        assert_eq!(employee.deduction_switches.income_levy, Some(false));
        assert_eq!(employee.deduction_switches.social_security, None);
        assert_eq!(employee.sanctions, Decimal::new(25000, 0));
    }

    #[test]
    fn test_full_name() {
        assert_eq!(create_test_employee().full_name(), "Aissatou Bah");
    }

    #[test]
    fn test_mileage_allowance() {
        let mut employee = create_test_employee();
        employee.kilometres = Decimal::new(1205, 1); // 120.5 km
        employee.value_per_km = Decimal::new(2000, 0);
        assert_eq!(employee.mileage_allowance(), Decimal::new(241000, 0));
    }

    #[test]
    fn test_allowance_entries_order() {
        let names: Vec<&str> = MonthlyAllowances::default()
            .entries()
            .iter()
            .map(|(name, _)| *name)
            .collect();
        assert_eq!(
            names,
            vec![
                "transport",
                "housing",
                "cost_of_living",
                "discipline_bonus",
                "holiday_bonus"
            ]
        );
    }
}
