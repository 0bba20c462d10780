//! HTTP request handlers for the Payroll Computation Engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{build_payroll_record, calculate_overtime, recompute_employee, run_payroll};
use crate::error::EngineError;
use crate::models::{AttendanceRecord, Employee, OvertimeSubmission, PayPeriod};
use crate::store::{LedgerKey, PayrollDataSource};

use super::request::{
    AttendanceRequest, CalculationRequest, OvertimeSubmitRequest, PayrollRunRequest,
    RecomputeRequest,
};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/calculate", post(calculate_handler))
        .route("/employees", put(employee_handler))
        .route("/attendance", put(attendance_handler))
        .route("/overtime", post(overtime_handler))
        .route("/payroll/run", post(payroll_run_handler))
        .route("/payroll/recompute", post(recompute_handler))
        .route(
            "/payroll/:tenant_id/:employee_id/:year/:month",
            get(payroll_record_handler),
        )
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Request failed"
    );
    ApiErrorResponse::from(err).into_response()
}

/// Turns a JSON extraction failure into a 400 response.
fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's detailed message
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") || body_text.contains("unknown variant") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, error)
}

/// Handler for POST /calculate.
///
/// Builds one payroll record from the request body alone; nothing is stored.
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing calculation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let employee = request.employee;
    let period: PayPeriod = request.period.into();
    let attendance: Vec<AttendanceRecord> = request
        .attendance
        .into_iter()
        .map(|entry| entry.into_record(&employee.id))
        .collect();
    let overtime: Vec<OvertimeSubmission> = request
        .overtime
        .into_iter()
        .map(|entry| entry.into_submission(&employee.id))
        .collect();

    let config = match state.config().tenant(&employee.tenant_id) {
        Ok(config) => config,
        Err(err) => return error_response(correlation_id, err),
    };

    let start_time = Instant::now();
    match build_payroll_record(&employee, period, &attendance, &overtime, config) {
        Ok(record) => {
            info!(
                correlation_id = %correlation_id,
                tenant_id = %record.tenant_id,
                employee_id = %record.employee_id,
                month = period.month,
                year = period.year,
                gross_salary = %record.gross_salary,
                net_payable = %record.net_payable,
                warnings = record.warnings.len(),
                duration_us = start_time.elapsed().as_micros() as u64,
                "Calculation completed successfully"
            );
            json_response(StatusCode::OK, record)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for PUT /employees.
async fn employee_handler(
    State(state): State<AppState>,
    payload: Result<Json<Employee>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let employee = match payload {
        Ok(Json(employee)) => employee,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    if let Err(err) = state.config().tenant(&employee.tenant_id) {
        return error_response(correlation_id, err);
    }

    info!(
        correlation_id = %correlation_id,
        tenant_id = %employee.tenant_id,
        employee_id = %employee.id,
        "Employee stored"
    );
    state.store().upsert_employee(employee.clone());
    json_response(StatusCode::OK, employee)
}

/// Handler for PUT /attendance.
///
/// Inserts or replaces the record for (employee, date).
async fn attendance_handler(
    State(state): State<AppState>,
    payload: Result<Json<AttendanceRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let record: AttendanceRecord = match payload {
        Ok(Json(req)) => req.into(),
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    if let Err(err) = state.store().employee(&record.employee_id) {
        return error_response(correlation_id, err);
    }

    let replaced = state.store().upsert_attendance(record.clone());
    info!(
        correlation_id = %correlation_id,
        employee_id = %record.employee_id,
        date = %record.date,
        status = %record.status,
        replaced = replaced.is_some(),
        "Attendance stored"
    );
    json_response(StatusCode::OK, record)
}

/// Handler for POST /overtime.
///
/// Computes the entry first so an invalid interval is rejected before
/// anything is stored.
async fn overtime_handler(
    State(state): State<AppState>,
    payload: Result<Json<OvertimeSubmitRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };
    let policy = request.on_duplicate;
    let submission: OvertimeSubmission = request.into();

    let employee = match state.store().employee(&submission.employee_id) {
        Ok(employee) => employee,
        Err(err) => return error_response(correlation_id, err),
    };
    let config = match state.config().tenant(&employee.tenant_id) {
        Ok(config) => config,
        Err(err) => return error_response(correlation_id, err),
    };

    let calculation = match calculate_overtime(&submission, &employee, &config.overtime, 1) {
        Ok(calculation) => calculation,
        Err(err) => return error_response(correlation_id, err),
    };

    match state.store().submit_overtime(submission, policy) {
        Ok(previous) => {
            info!(
                correlation_id = %correlation_id,
                employee_id = %employee.id,
                date = %calculation.entry.date,
                duration_hours = %calculation.entry.duration_hours,
                amount = %calculation.entry.amount,
                overwritten = previous.is_some(),
                "Overtime entry stored"
            );
            json_response(StatusCode::CREATED, calculation.entry)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /payroll/run.
///
/// Runs payroll for every employee of the tenant and stores the records in
/// the ledger. Per-employee failures are listed in the report.
async fn payroll_run_handler(
    State(state): State<AppState>,
    payload: Result<Json<PayrollRunRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };
    info!(
        correlation_id = %correlation_id,
        tenant_id = %request.tenant_id,
        month = request.month,
        year = request.year,
        "Processing payroll run"
    );

    let config = match state.config().tenant(&request.tenant_id) {
        Ok(config) => config,
        Err(err) => return error_response(correlation_id, err),
    };
    let period = PayPeriod {
        year: request.year,
        month: request.month,
    };

    match run_payroll(state.store(), config, period, Some(state.ledger())) {
        Ok(report) => json_response(StatusCode::OK, report),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /payroll/recompute.
///
/// Rebuilds one stored record after its inputs changed.
async fn recompute_handler(
    State(state): State<AppState>,
    payload: Result<Json<RecomputeRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let config = match state.config().tenant(&request.tenant_id) {
        Ok(config) => config,
        Err(err) => return error_response(correlation_id, err),
    };
    let period = PayPeriod {
        year: request.year,
        month: request.month,
    };

    match recompute_employee(
        state.store(),
        state.ledger(),
        &request.employee_id,
        period,
        config,
    ) {
        Ok(entry) => {
            info!(
                correlation_id = %correlation_id,
                employee_id = %request.employee_id,
                revision = entry.revision,
                "Payroll record recomputed"
            );
            json_response(StatusCode::OK, entry)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /payroll/:tenant_id/:employee_id/:year/:month.
///
/// A record that belongs to another tenant is reported as not found.
async fn payroll_record_handler(
    State(state): State<AppState>,
    Path((tenant_id, employee_id, year, month)): Path<(String, String, i32, u32)>,
) -> Response {
    let key = LedgerKey::new(employee_id, PayPeriod { year, month });
    match state.ledger().get(&key) {
        Some(entry) if entry.record.tenant_id == tenant_id => {
            json_response(StatusCode::OK, entry)
        }
        _ => json_response(
            StatusCode::NOT_FOUND,
            ApiError::new(
                "RECORD_NOT_FOUND",
                format!(
                    "No payroll record for employee '{}' of tenant '{}' in {:02}/{}",
                    key.employee_id, tenant_id, month, year
                ),
            ),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn create_test_app() -> Router {
        let config = ConfigLoader::load("./config/tenants").expect("Failed to load config");
        create_router(AppState::new(config))
    }

    async fn send(
        app: Router,
        method: &str,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("Content-Type", "application/json")
                    .body(Body::from(serde_json::to_string(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn employee_json() -> serde_json::Value {
        serde_json::json!({
            "id": "emp_001",
            "tenant_id": "acme_mining",
            "matricule": "ACM-001",
            "first_name": "Aissatou",
            "last_name": "Bah",
            "daily_rate": "80000"
        })
    }

    #[tokio::test]
    async fn test_calculate_returns_record() {
        let body = serde_json::json!({
            "employee": employee_json(),
            "period": {"year": 2025, "month": 3},
            "attendance": [
                {"date": "2025-03-03", "status": "P(Am_&_Pm)"},
                {"date": "2025-03-04", "status": "P(Am)"}
            ]
        });

        let (status, json) = send(create_test_app(), "POST", "/calculate", body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["employee_id"], "emp_001");
        assert_eq!(json["gross_salary"], "120000");
        assert_eq!(json["status_counts"]["present_full_day"], 1);
    }

    #[tokio::test]
    async fn test_calculate_unknown_tenant_is_404() {
        let mut employee = employee_json();
        employee["tenant_id"] = serde_json::json!("unknown_tenant");
        let body = serde_json::json!({
            "employee": employee,
            "period": {"year": 2025, "month": 3}
        });

        let (status, json) = send(create_test_app(), "POST", "/calculate", body).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], "TENANT_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_calculate_invalid_month_is_400() {
        let body = serde_json::json!({
            "employee": employee_json(),
            "period": {"year": 2025, "month": 13}
        });

        let (status, json) = send(create_test_app(), "POST", "/calculate", body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "INVALID_PERIOD");
    }

    #[tokio::test]
    async fn test_missing_field_is_validation_error() {
        let body = serde_json::json!({"period": {"year": 2025, "month": 3}});

        let (status, json) = send(create_test_app(), "POST", "/calculate", body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_overtime_for_unknown_employee_is_404() {
        let body = serde_json::json!({
            "employee_id": "emp_404",
            "date": "2025-03-04",
            "start_time": "17:00:00",
            "end_time": "19:00:00"
        });

        let (status, json) = send(create_test_app(), "POST", "/overtime", body).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], "EMPLOYEE_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_missing_ledger_record_is_404() {
        let (status, json) = send(
            create_test_app(),
            "GET",
            "/payroll/acme_mining/emp_001/2025/3",
            serde_json::Value::Null,
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], "RECORD_NOT_FOUND");
    }
}
