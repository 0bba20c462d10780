//! Response types for the Payroll Computation Engine API.
//!
//! This module defines the error response structures and the mapping from
//! engine errors to HTTP status codes.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    fn new(status: StatusCode, code: &str, error: &EngineError) -> Self {
        Self {
            status,
            error: ApiError::new(code, error.to_string()),
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(self.error),
        )
            .into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        match &error {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                ApiErrorResponse {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    error: ApiError::with_details(
                        "CONFIG_ERROR",
                        "Configuration error",
                        error.to_string(),
                    ),
                }
            }
            EngineError::InvalidConfiguration { .. } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Invalid tenant configuration",
                    error.to_string(),
                ),
            },
            EngineError::TenantNotFound { .. } => {
                Self::new(StatusCode::NOT_FOUND, "TENANT_NOT_FOUND", &error)
            }
            EngineError::EmployeeNotFound { .. } => {
                Self::new(StatusCode::NOT_FOUND, "EMPLOYEE_NOT_FOUND", &error)
            }
            EngineError::TenantMismatch { .. } => {
                Self::new(StatusCode::BAD_REQUEST, "TENANT_MISMATCH", &error)
            }
            EngineError::InvalidPeriod { .. } => {
                Self::new(StatusCode::BAD_REQUEST, "INVALID_PERIOD", &error)
            }
            EngineError::InvalidInterval { .. } => {
                Self::new(StatusCode::BAD_REQUEST, "INVALID_INTERVAL", &error)
            }
            EngineError::DuplicateEntry { .. } => {
                Self::new(StatusCode::CONFLICT, "DUPLICATE_ENTRY", &error)
            }
            EngineError::DuplicateAttendance { .. } => {
                Self::new(StatusCode::CONFLICT, "DUPLICATE_ATTENDANCE", &error)
            }
            EngineError::EmployeeComputationFailure { .. } => Self::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                "EMPLOYEE_COMPUTATION_FAILURE",
                &error,
            ),
            EngineError::CalculationError { message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CALCULATION_ERROR",
                    "Calculation failed",
                    message.clone(),
                ),
            },
        }
    }
}
