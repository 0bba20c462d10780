//! Core data models for the Payroll Computation Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod attendance;
mod employee;
mod overtime;
mod pay_period;
mod payroll_record;

pub use attendance::{AttendanceRecord, AttendanceStatus};
pub use employee::{DeductionSwitches, Employee, MonthlyAllowances, StatutoryOverrides};
pub use overtime::{OvertimeDayType, OvertimeEntry, OvertimeKey, OvertimeSubmission};
pub use pay_period::{PayPeriod, days_in_month, is_leap_year};
pub use payroll_record::{
    AttendanceSummary, AuditStep, AuditWarning, DayAttendance, DeductionBreakdown, DeductionKind,
    DeductionLine, EarningLine, EmployeeFailure, LevyBracketLine, OvertimeSummary, PayrollRecord,
    PayrollRunReport, Severity, StatusLine, WarningCode,
};
