//! Payroll Computation Engine
//!
//! This crate turns a month of daily attendance records, overtime entries and a
//! per-tenant rate configuration into payroll records: per-status totals,
//! overtime pay, statutory deductions (CNSS, RTS, VF) and net payable salary.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
