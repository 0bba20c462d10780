//! In-memory payroll data store.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculation::overtime_duration;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceRecord, Employee, OvertimeKey, OvertimeSubmission, PayPeriod,
};

use super::PayrollDataSource;

/// What to do when an overtime entry is submitted for an existing key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Refuse the submission with `DuplicateEntry`.
    #[default]
    Reject,
    /// Replace the existing entry.
    Overwrite,
}

/// A thread-safe in-memory store of employees, attendance and overtime.
///
/// Attendance is keyed by (employee, date) and overtime by (employee, date,
/// start time), so neither can hold duplicates.
///
/// # Example
///
/// ```
/// use payroll_engine::store::{DuplicatePolicy, InMemoryStore, PayrollDataSource};
/// use payroll_engine::models::{OvertimeSubmission, PayPeriod};
///
/// let store = InMemoryStore::new();
/// let submission: OvertimeSubmission = serde_json::from_value(serde_json::json!({
///     "employee_id": "emp_001", "date": "2025-03-04",
///     "start_time": "17:00:00", "end_time": "19:00:00"
/// })).unwrap();
///
/// store.submit_overtime(submission.clone(), DuplicatePolicy::Reject).unwrap();
/// assert!(store.submit_overtime(submission, DuplicatePolicy::Reject).is_err());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    employees: RwLock<BTreeMap<String, Employee>>,
    attendance: RwLock<BTreeMap<(String, NaiveDate), AttendanceRecord>>,
    overtime: RwLock<BTreeMap<OvertimeKey, OvertimeSubmission>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an employee.
    pub fn upsert_employee(&self, employee: Employee) {
        let mut employees = self.employees.write().unwrap_or_else(PoisonError::into_inner);
        employees.insert(employee.id.clone(), employee);
    }

    /// Inserts or replaces the attendance record for (employee, date).
    ///
    /// Returns the record it replaced, if any.
    pub fn upsert_attendance(&self, record: AttendanceRecord) -> Option<AttendanceRecord> {
        let key = (record.employee_id.clone(), record.date);
        let mut attendance = self.attendance.write().unwrap_or_else(PoisonError::into_inner);
        let previous = attendance.insert(key, record);
        if let Some(ref replaced) = previous {
            debug!(
                employee_id = %replaced.employee_id,
                date = %replaced.date,
                "Replaced attendance record"
            );
        }
        previous
    }

    /// Stores an overtime submission under its (employee, date, start time) key.
    ///
    /// # Errors
    ///
    /// - `InvalidInterval` when the end time is not after the start time;
    ///   nothing is stored
    /// - `DuplicateEntry` when the key exists and `policy` is `Reject`
    pub fn submit_overtime(
        &self,
        submission: OvertimeSubmission,
        policy: DuplicatePolicy,
    ) -> EngineResult<Option<OvertimeSubmission>> {
        overtime_duration(
            &submission.employee_id,
            submission.date,
            submission.start_time,
            submission.end_time,
        )?;
        let key = submission.key();
        let mut overtime = self.overtime.write().unwrap_or_else(PoisonError::into_inner);
        if policy == DuplicatePolicy::Reject && overtime.contains_key(&key) {
            return Err(EngineError::DuplicateEntry {
                employee_id: key.employee_id,
                date: key.date,
                start_time: key.start_time,
            });
        }
        Ok(overtime.insert(key, submission))
    }
}

impl PayrollDataSource for InMemoryStore {
    fn employee(&self, employee_id: &str) -> EngineResult<Employee> {
        self.employees
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(employee_id)
            .cloned()
            .ok_or_else(|| EngineError::EmployeeNotFound {
                employee_id: employee_id.to_string(),
            })
    }

    fn employees_for_tenant(&self, tenant_id: &str) -> EngineResult<Vec<Employee>> {
        Ok(self
            .employees
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|e| e.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    fn attendance_for_month(
        &self,
        employee_id: &str,
        period: PayPeriod,
    ) -> EngineResult<Vec<AttendanceRecord>> {
        let from = (employee_id.to_string(), period.first_day()?);
        let to = (employee_id.to_string(), period.last_day()?);
        Ok(self
            .attendance
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .range(from..=to)
            .map(|(_, record)| record.clone())
            .collect())
    }

    fn overtime_between(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<OvertimeSubmission>> {
        Ok(self
            .overtime
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|s| s.employee_id == employee_id && s.date >= from && s.date <= to)
            .cloned()
            .collect())
    }
}
