//! Data access for payroll computation.
//!
//! The engine reads its inputs through the [`PayrollDataSource`] trait so it
//! can run against any store. [`InMemoryStore`] enforces the uniqueness rules
//! on attendance and overtime, and [`PayrollLedger`] holds computed records,
//! serialising recomputation per (employee, month, year).

mod ledger;
mod memory;

use chrono::NaiveDate;

use crate::error::EngineResult;
use crate::models::{AttendanceRecord, Employee, OvertimeSubmission, PayPeriod};

pub use ledger::{LedgerEntry, LedgerKey, PayrollLedger};
pub use memory::{DuplicatePolicy, InMemoryStore};

/// Read access to the inputs of a payroll computation.
pub trait PayrollDataSource: Send + Sync {
    /// Looks up an employee by identifier.
    ///
    /// Returns `EmployeeNotFound` when the employee does not exist.
    fn employee(&self, employee_id: &str) -> EngineResult<Employee>;

    /// Every employee of a tenant, archived ones included, ordered by id.
    fn employees_for_tenant(&self, tenant_id: &str) -> EngineResult<Vec<Employee>>;

    /// The employee's attendance records dated within `period`.
    fn attendance_for_month(
        &self,
        employee_id: &str,
        period: PayPeriod,
    ) -> EngineResult<Vec<AttendanceRecord>>;

    /// The employee's overtime entries dated from `from` to `to`, inclusive.
    fn overtime_between(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<OvertimeSubmission>>;
}
