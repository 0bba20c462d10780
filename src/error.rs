//! Error types for the Payroll Computation Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while computing payroll.
//!
//! Missing rate configuration is deliberately absent from this enum: it never
//! aborts a computation and is reported as an audit warning on the record.

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

/// The main error type for the Payroll Computation Engine.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::TenantNotFound {
///     tenant_id: "acme".to_string(),
/// };
/// assert_eq!(error.to_string(), "Tenant not found: acme");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but violates a structural rule.
    #[error("Invalid configuration for tenant '{tenant_id}': {message}")]
    InvalidConfiguration {
        /// The tenant whose configuration is invalid.
        tenant_id: String,
        /// A description of the violated rule.
        message: String,
    },

    /// No configuration is loaded for the tenant.
    #[error("Tenant not found: {tenant_id}")]
    TenantNotFound {
        /// The tenant identifier that was not found.
        tenant_id: String,
    },

    /// No employee exists with the given identifier.
    #[error("Employee not found: {employee_id}")]
    EmployeeNotFound {
        /// The employee identifier that was not found.
        employee_id: String,
    },

    /// An employee was processed under a tenant it does not belong to.
    #[error("Employee '{employee_id}' does not belong to tenant '{tenant_id}'")]
    TenantMismatch {
        /// The employee identifier.
        employee_id: String,
        /// The tenant the computation was requested for.
        tenant_id: String,
    },

    /// Month outside 1-12 or a year the calendar cannot represent.
    #[error("Invalid pay period: month {month}, year {year}")]
    InvalidPeriod {
        /// The requested month.
        month: u32,
        /// The requested year.
        year: i32,
    },

    /// Overtime end time is not after its start time.
    #[error(
        "Invalid overtime interval for employee '{employee_id}' on {date}: end {end_time} is not after start {start_time}"
    )]
    InvalidInterval {
        /// The employee the entry belongs to.
        employee_id: String,
        /// The date of the entry.
        date: NaiveDate,
        /// The submitted start time.
        start_time: NaiveTime,
        /// The submitted end time.
        end_time: NaiveTime,
    },

    /// An overtime entry already exists for (employee, date, start time).
    #[error("Duplicate overtime entry for employee '{employee_id}' on {date} at {start_time}")]
    DuplicateEntry {
        /// The employee the entry belongs to.
        employee_id: String,
        /// The date of the entry.
        date: NaiveDate,
        /// The start time shared by both entries.
        start_time: NaiveTime,
    },

    /// More than one attendance record was supplied for the same employee and date.
    #[error("Duplicate attendance record for employee '{employee_id}' on {date}")]
    DuplicateAttendance {
        /// The employee the records belong to.
        employee_id: String,
        /// The date with more than one record.
        date: NaiveDate,
    },

    /// Building one employee's payroll record failed; the batch continues.
    #[error("Payroll computation failed for employee '{employee_id}': {message}")]
    EmployeeComputationFailure {
        /// The employee whose computation failed.
        employee_id: String,
        /// The underlying cause.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

impl EngineError {
    /// Wraps any error raised while building one employee's record.
    ///
    /// Errors that are already a computation failure are returned unchanged.
    pub fn for_employee(employee_id: &str, source: EngineError) -> Self {
        match source {
            EngineError::EmployeeComputationFailure { .. } => source,
            other => EngineError::EmployeeComputationFailure {
                employee_id: employee_id.to_string(),
                message: other.to_string(),
            },
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
