//! HTTP mapping of domain errors

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::domain::DomainError;

impl DomainError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DomainError::NotFound => StatusCode::NOT_FOUND,
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::InvalidFields(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DomainError::InvalidState(_) => StatusCode::CONFLICT,
            DomainError::Duplicate(_) => StatusCode::CONFLICT,
            DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
            DomainError::Database(_) | DomainError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            DomainError::NotFound => json!({ "error": "Not found" }),
            DomainError::InvalidFields(errors) => json!({
                "error": "Please correct the highlighted fields",
                "fields": errors,
            }),
            DomainError::Duplicate(msg) => json!({ "error": msg.clone(), "warning": msg }),
            DomainError::Database(msg) => {
                tracing::error!("Database error: {}", msg);
                json!({ "error": "Database error" })
            }
            DomainError::Validation(msg)
            | DomainError::InvalidState(msg)
            | DomainError::Unauthorized(msg)
            | DomainError::Forbidden(msg)
            | DomainError::Internal(msg) => json!({ "error": msg }),
        };
        (status, Json(body)).into_response()
    }
}

/// 402 body for a spend the user cannot afford
pub fn insufficient_funds(required: i32, available: i32) -> Response {
    (
        StatusCode::PAYMENT_REQUIRED,
        Json(json!({
            "error": "Not enough stars",
            "required": required,
            "available": available,
        })),
    )
        .into_response()
}
