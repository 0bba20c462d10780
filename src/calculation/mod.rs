//! Calculation logic for the Payroll Computation Engine.
//!
//! This module contains the steps that turn a month of attendance and
//! overtime into a payroll record: attendance aggregation, status valuation,
//! overtime calculation, statutory deductions, record assembly, and batch
//! runs with per-employee failure isolation.

mod attendance_aggregation;
mod batch;
mod deductions;
mod overtime;
mod payroll_builder;
mod valuation;

pub use attendance_aggregation::{MonthlyAttendance, aggregate_month, summarize};
pub use batch::{compute_employee, recompute_employee, run_payroll};
pub use deductions::{
    DeductionsResult, LevyResult, SocialSecurityResult, apply_deductions,
    calculate_alternate_levy, calculate_income_levy, calculate_social_security, progressive_levy,
};
pub use overtime::{
    HourlyRate, HourlyRateSource, OvertimeCalculation, calculate_overtime, overtime_duration,
    resolve_hourly_rate, summarize_overtime,
};
pub use payroll_builder::build_payroll_record;
pub use valuation::{Valuation, value_statuses};
