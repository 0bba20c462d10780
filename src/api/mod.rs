//! HTTP API module for the Payroll Computation Engine.
//!
//! This module provides the REST endpoints for one-off payroll calculation,
//! attendance and overtime capture, and batch payroll runs.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    AttendanceRequest, CalculationRequest, OvertimeSubmitRequest, PayrollRunRequest,
    RecomputeRequest,
};
pub use response::ApiError;
pub use state::AppState;
