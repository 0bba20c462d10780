//! Request types for the Payroll Computation Engine API.
//!
//! This module defines the JSON request structures for every endpoint.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{
    AttendanceRecord, AttendanceStatus, Employee, OvertimeDayType, OvertimeSubmission, PayPeriod,
};
use crate::store::DuplicatePolicy;

/// Request body for the `/calculate` endpoint.
///
/// Carries everything needed to build one payroll record without touching
/// the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// The employee; its `tenant_id` selects the configuration.
    pub employee: Employee,
    /// The month to compute.
    pub period: PeriodRequest,
    /// The employee's daily statuses.
    #[serde(default)]
    pub attendance: Vec<DailyStatusRequest>,
    /// The employee's overtime entries.
    #[serde(default)]
    pub overtime: Vec<OvertimeRequest>,
}

/// A month and year.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PeriodRequest {
    /// The year.
    pub year: i32,
    /// The month (1-12).
    pub month: u32,
}

/// One day's status inside a calculation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyStatusRequest {
    /// The date.
    pub date: NaiveDate,
    /// The status, by name or timesheet code.
    pub status: AttendanceStatus,
}

/// One overtime entry inside a calculation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OvertimeRequest {
    /// The date worked.
    pub date: NaiveDate,
    /// Start time.
    pub start_time: NaiveTime,
    /// End time on the same date.
    pub end_time: NaiveTime,
    /// Name of the approver.
    #[serde(default)]
    pub approved_by: Option<String>,
    /// Ordinary day or Sunday/holiday.
    #[serde(default)]
    pub day_type: OvertimeDayType,
    /// Explicit hourly rate.
    #[serde(default)]
    pub hourly_rate: Option<Decimal>,
}

/// Request body for `PUT /attendance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRequest {
    /// The employee.
    pub employee_id: String,
    /// The date.
    pub date: NaiveDate,
    /// The status, by name or timesheet code.
    pub status: AttendanceStatus,
}

/// Request body for `POST /overtime`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OvertimeSubmitRequest {
    /// The employee.
    pub employee_id: String,
    /// The date worked.
    pub date: NaiveDate,
    /// Start time.
    pub start_time: NaiveTime,
    /// End time on the same date.
    pub end_time: NaiveTime,
    /// Name of the approver.
    #[serde(default)]
    pub approved_by: Option<String>,
    /// Ordinary day or Sunday/holiday.
    #[serde(default)]
    pub day_type: OvertimeDayType,
    /// Explicit hourly rate.
    #[serde(default)]
    pub hourly_rate: Option<Decimal>,
    /// What to do if an entry already exists for (employee, date, start time).
    #[serde(default)]
    pub on_duplicate: DuplicatePolicy,
}

/// Request body for `POST /payroll/run`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollRunRequest {
    /// The tenant to run.
    pub tenant_id: String,
    /// The year.
    pub year: i32,
    /// The month (1-12).
    pub month: u32,
}

/// Request body for `POST /payroll/recompute`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecomputeRequest {
    /// The tenant the employee belongs to.
    pub tenant_id: String,
    /// The employee.
    pub employee_id: String,
    /// The year.
    pub year: i32,
    /// The month (1-12).
    pub month: u32,
}

impl From<PeriodRequest> for PayPeriod {
    fn from(req: PeriodRequest) -> Self {
        PayPeriod {
            year: req.year,
            month: req.month,
        }
    }
}

impl DailyStatusRequest {
    /// Converts to an attendance record of `employee_id`.
    pub fn into_record(self, employee_id: &str) -> AttendanceRecord {
        AttendanceRecord {
            employee_id: employee_id.to_string(),
            date: self.date,
            status: self.status,
        }
    }
}

impl OvertimeRequest {
    /// Converts to an overtime submission of `employee_id`.
    pub fn into_submission(self, employee_id: &str) -> OvertimeSubmission {
        OvertimeSubmission {
            employee_id: employee_id.to_string(),
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            approved_by: self.approved_by,
            day_type: self.day_type,
            hourly_rate: self.hourly_rate,
        }
    }
}

impl From<AttendanceRequest> for AttendanceRecord {
    fn from(req: AttendanceRequest) -> Self {
        AttendanceRecord {
            employee_id: req.employee_id,
            date: req.date,
            status: req.status,
        }
    }
}

impl From<OvertimeSubmitRequest> for OvertimeSubmission {
    fn from(req: OvertimeSubmitRequest) -> Self {
        OvertimeSubmission {
            employee_id: req.employee_id,
            date: req.date,
            start_time: req.start_time,
            end_time: req.end_time,
            approved_by: req.approved_by,
            day_type: req.day_type,
            hourly_rate: req.hourly_rate,
        }
    }
}
