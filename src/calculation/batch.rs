//! Batch payroll runs.
//!
//! A run builds the record of every active employee of a tenant for one
//! period. A failure while building one employee's record is logged and
//! reported in the run report; it never aborts the rest of the run.

use std::time::Instant;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::TenantConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{EmployeeFailure, Employee, PayPeriod, PayrollRecord, PayrollRunReport};
use crate::store::{LedgerEntry, LedgerKey, PayrollDataSource, PayrollLedger};

use super::payroll_builder::build_payroll_record;

/// Fetches one employee's inputs from `source` and builds the record.
///
/// # Errors
///
/// Any data-source or computation error, unwrapped.
pub fn compute_employee<S>(
    source: &S,
    employee: &Employee,
    period: PayPeriod,
    config: &TenantConfig,
) -> EngineResult<PayrollRecord>
where
    S: PayrollDataSource + ?Sized,
{
    let attendance = source.attendance_for_month(&employee.id, period)?;
    let overtime = source.overtime_between(&employee.id, period.first_day()?, period.last_day()?)?;
    build_payroll_record(employee, period, &attendance, &overtime, config)
}

/// Recomputes one employee's record and stores it in the ledger.
///
/// The ledger lock for (employee, month, year) is held for the whole
/// computation, so concurrent recomputations of the same record serialise.
///
/// # Errors
///
/// - `EmployeeNotFound` if the employee does not exist
/// - `TenantMismatch` if the employee belongs to another tenant
/// - any error raised while building the record
pub fn recompute_employee<S>(
    source: &S,
    ledger: &PayrollLedger,
    employee_id: &str,
    period: PayPeriod,
    config: &TenantConfig,
) -> EngineResult<LedgerEntry>
where
    S: PayrollDataSource + ?Sized,
{
    period.validate()?;
    let key = LedgerKey::new(employee_id, period);
    ledger.recompute(&key, || {
        let employee = source.employee(employee_id)?;
        compute_employee(source, &employee, period, config)
    })
}

/// Runs payroll for every employee of the tenant in `config`.
///
/// Archived employees are skipped and listed in `skipped`. Each failing
/// employee is logged at warn level and listed in `failures` as an
/// `EmployeeComputationFailure`; the remaining employees are still processed.
/// When `ledger` is given, each successful record is stored there.
///
/// # Errors
///
/// Only errors that concern the whole run: an invalid period or a failure to
/// list the tenant's employees.
pub fn run_payroll<S>(
    source: &S,
    config: &TenantConfig,
    period: PayPeriod,
    ledger: Option<&PayrollLedger>,
) -> EngineResult<PayrollRunReport>
where
    S: PayrollDataSource + ?Sized,
{
    let start_time = Instant::now();
    period.validate()?;

    let tenant_id = config.tenant_id();
    let mut employees = source.employees_for_tenant(tenant_id)?;
    employees.sort_by(|a, b| a.id.cmp(&b.id));

    let mut records = Vec::new();
    let mut failures = Vec::new();
    let mut skipped = Vec::new();

    for employee in &employees {
        if employee.archived {
            skipped.push(employee.id.clone());
            continue;
        }

        let outcome = match ledger {
            Some(ledger) => {
                let key = LedgerKey::new(employee.id.clone(), period);
                ledger
                    .recompute(&key, || compute_employee(source, employee, period, config))
                    .map(|entry| entry.record)
            }
            None => compute_employee(source, employee, period, config),
        };

        match outcome {
            Ok(record) => records.push(record),
            Err(err) => {
                let failure = EngineError::for_employee(&employee.id, err);
                warn!(
                    tenant_id = %tenant_id,
                    employee_id = %employee.id,
                    month = period.month,
                    year = period.year,
                    error = %failure,
                    "Skipping employee after payroll computation failure"
                );
                failures.push(EmployeeFailure {
                    employee_id: employee.id.clone(),
                    message: failure.to_string(),
                });
            }
        }
    }

    let duration_us = start_time.elapsed().as_micros() as u64;
    info!(
        tenant_id = %tenant_id,
        month = period.month,
        year = period.year,
        records = records.len(),
        failures = failures.len(),
        skipped = skipped.len(),
        duration_us,
        "Payroll run completed"
    );

    Ok(PayrollRunReport {
        run_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        tenant_id: tenant_id.to_string(),
        period,
        records,
        failures,
        skipped,
        duration_us,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use crate::models::{AttendanceRecord, AttendanceStatus, OvertimeSubmission};
    use crate::store::InMemoryStore;
    use chrono::NaiveDate;

    fn tenant() -> TenantConfig {
        ConfigLoader::load("./config/tenants")
            .unwrap()
            .tenant("acme_mining")
            .unwrap()
            .clone()
    }

    fn employee(id: &str) -> Employee {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "tenant_id": "acme_mining",
            "matricule": id.to_uppercase(),
            "first_name": "Test",
            "last_name": id,
            "daily_rate": "80000"
        }))
        .unwrap()
    }

    fn present(employee_id: &str, day: u32) -> AttendanceRecord {
        AttendanceRecord {
            employee_id: employee_id.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            status: AttendanceStatus::PresentFullDay,
        }
    }

    /// Wraps a store and returns duplicated attendance for one employee.
    struct CorruptSource {
        inner: InMemoryStore,
        corrupt_employee: String,
    }

    impl PayrollDataSource for CorruptSource {
        fn employee(&self, employee_id: &str) -> EngineResult<Employee> {
            self.inner.employee(employee_id)
        }

        fn employees_for_tenant(&self, tenant_id: &str) -> EngineResult<Vec<Employee>> {
            self.inner.employees_for_tenant(tenant_id)
        }

        fn attendance_for_month(
            &self,
            employee_id: &str,
            period: PayPeriod,
        ) -> EngineResult<Vec<AttendanceRecord>> {
            let mut records = self.inner.attendance_for_month(employee_id, period)?;
            if employee_id == self.corrupt_employee {
                records.push(present(employee_id, 3));
                records.push(present(employee_id, 3));
            }
            Ok(records)
        }

        fn overtime_between(
            &self,
            employee_id: &str,
            from: NaiveDate,
            to: NaiveDate,
        ) -> EngineResult<Vec<OvertimeSubmission>> {
            self.inner.overtime_between(employee_id, from, to)
        }
    }

    fn store_with(ids: &[&str]) -> InMemoryStore {
        let store = InMemoryStore::new();
        for id in ids {
            store.upsert_employee(employee(id));
            store.upsert_attendance(present(id, 3));
        }
        store
    }

    #[test]
    fn test_run_builds_every_employee() {
        let store = store_with(&["emp_001", "emp_002"]);
        let report = run_payroll(&store, &tenant(), PayPeriod::new(2025, 3).unwrap(), None).unwrap();

        assert!(report.is_complete());
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.record("emp_002").unwrap().gross_salary, rust_decimal::Decimal::from(80000));
        assert_eq!(report.tenant_id, "acme_mining");
    }

    #[test]
    fn test_failing_employee_does_not_abort_run() {
        let source = CorruptSource {
            inner: store_with(&["emp_001", "emp_002", "emp_003", "emp_004", "emp_005"]),
            corrupt_employee: "emp_003".to_string(),
        };

        let report =
            run_payroll(&source, &tenant(), PayPeriod::new(2025, 3).unwrap(), None).unwrap();

        assert_eq!(report.records.len(), 4);
        assert!(report.record("emp_003").is_none());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].employee_id, "emp_003");
        assert!(report.failures[0].message.contains("Duplicate attendance"));
        assert!(!report.is_complete());
    }

    #[test]
    fn test_archived_employees_are_skipped() {
        let store = store_with(&["emp_001"]);
        let mut archived = employee("emp_002");
        archived.archived = true;
        store.upsert_employee(archived);

        let report = run_payroll(&store, &tenant(), PayPeriod::new(2025, 3).unwrap(), None).unwrap();

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.skipped, vec!["emp_002".to_string()]);
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_invalid_period_fails_whole_run() {
        let store = store_with(&["emp_001"]);
        assert!(matches!(
            run_payroll(&store, &tenant(), PayPeriod { year: 2025, month: 0 }, None),
            Err(EngineError::InvalidPeriod { .. })
        ));
    }

    #[test]
    fn test_rerun_overwrites_ledger_records() {
        let store = store_with(&["emp_001", "emp_002"]);
        let ledger = PayrollLedger::new();
        let period = PayPeriod::new(2025, 3).unwrap();

        run_payroll(&store, &tenant(), period, Some(&ledger)).unwrap();
        run_payroll(&store, &tenant(), period, Some(&ledger)).unwrap();

        assert_eq!(ledger.len(), 2);
        let entry = ledger.get(&LedgerKey::new("emp_001", period)).unwrap();
        assert_eq!(entry.revision, 2);
    }

    #[test]
    fn test_recompute_after_attendance_change_touches_one_record() {
        let store = store_with(&["emp_001", "emp_002"]);
        let ledger = PayrollLedger::new();
        let config = tenant();
        let period = PayPeriod::new(2025, 3).unwrap();
        run_payroll(&store, &config, period, Some(&ledger)).unwrap();
        let other_before = ledger.get(&LedgerKey::new("emp_002", period)).unwrap();

        store.upsert_attendance(AttendanceRecord {
            status: AttendanceStatus::Absent,
            ..present("emp_001", 3)
        });
        let entry = recompute_employee(&store, &ledger, "emp_001", period, &config).unwrap();

        assert_eq!(entry.revision, 2);
        assert_eq!(entry.record.gross_salary, rust_decimal::Decimal::ZERO);
        assert_eq!(entry.record.attendance_summary.absences, 1);
        let other_after = ledger.get(&LedgerKey::new("emp_002", period)).unwrap();
        assert_eq!(other_before, other_after);
    }

    #[test]
    fn test_recompute_unknown_employee() {
        let store = store_with(&[]);
        let ledger = PayrollLedger::new();
        let result = recompute_employee(
            &store,
            &ledger,
            "emp_404",
            PayPeriod::new(2025, 3).unwrap(),
            &tenant(),
        );
        assert!(matches!(result, Err(EngineError::EmployeeNotFound { .. })));
        assert!(ledger.is_empty());
    }
}
