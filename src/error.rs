//! Application error taxonomy and its HTTP mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::domain::repositories::StoreError;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Machine-readable error payload returned to API clients.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

/// Errors surfaced by the core operations.
///
/// `BadRequest`, `QuotaExceeded`, `NotFound` and `Disabled` are expected
/// outcomes and are returned to the caller verbatim. `Unavailable` never
/// carries backend detail in its message; the detail is logged where the
/// error is produced.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    BadRequest { message: String, details: Value },

    #[error("{message}")]
    Unauthorized { message: String, details: Value },

    #[error("{message}")]
    QuotaExceeded { message: String, details: Value },

    #[error("{message}")]
    NotFound { message: String, details: Value },

    #[error("{message}")]
    Disabled { message: String, details: Value },

    #[error("{message}")]
    AllocationExhausted { message: String, details: Value },

    #[error("Service temporarily unavailable")]
    Unavailable,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::BadRequest {
            message: message.into(),
            details,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details: json!({}),
        }
    }

    pub fn quota_exceeded(message: impl Into<String>, details: Value) -> Self {
        Self::QuotaExceeded {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn disabled(message: impl Into<String>, details: Value) -> Self {
        Self::Disabled {
            message: message.into(),
            details,
        }
    }

    pub fn allocation_exhausted(message: impl Into<String>, details: Value) -> Self {
        Self::AllocationExhausted {
            message: message.into(),
            details,
        }
    }

    fn parts(&self) -> (StatusCode, &'static str, Value) {
        match self {
            AppError::BadRequest { details, .. } => {
                (StatusCode::BAD_REQUEST, "bad_request", details.clone())
            }
            AppError::Unauthorized { details, .. } => {
                (StatusCode::UNAUTHORIZED, "unauthorized", details.clone())
            }
            AppError::QuotaExceeded { details, .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                "quota_exceeded",
                details.clone(),
            ),
            AppError::NotFound { details, .. } => {
                (StatusCode::NOT_FOUND, "not_found", details.clone())
            }
            AppError::Disabled { details, .. } => {
                (StatusCode::GONE, "link_disabled", details.clone())
            }
            AppError::AllocationExhausted { details, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "allocation_exhausted",
                details.clone(),
            ),
            AppError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "unavailable",
                json!({}),
            ),
        }
    }

    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        self.parts().0
    }

    /// Converts the error into the serializable payload used in response bodies.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (_, code, details) = self.parts();
        ErrorInfo {
            code,
            message: self.to_string(),
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateCode(code) => {
                AppError::bad_request("Short code already exists", json!({ "code": code }))
            }
            StoreError::NotFound => AppError::not_found("Record not found", json!({})),
            StoreError::Unavailable(reason) => {
                tracing::error!("Persistence unavailable: {}", reason);
                AppError::Unavailable
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        let details = serde_json::to_value(e.field_errors()).unwrap_or_else(|_| json!({}));
        AppError::bad_request("Request validation failed", details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::bad_request("x", json!({})).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::quota_exceeded("x", json!({})).status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::not_found("x", json!({})).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::disabled("x", json!({})).status(),
            StatusCode::GONE
        );
        assert_eq!(
            AppError::Unavailable.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_unavailable_hides_backend_detail() {
        let err: AppError = StoreError::Unavailable("connection refused to 10.0.0.5".into()).into();

        assert!(matches!(err, AppError::Unavailable));
        assert!(!err.to_string().contains("10.0.0.5"));
    }

    #[test]
    fn test_duplicate_code_becomes_bad_request() {
        let err: AppError = StoreError::DuplicateCode("promo".into()).into();

        assert!(matches!(err, AppError::BadRequest { .. }));
        assert_eq!(err.to_error_info().details["code"], "promo");
    }
}
