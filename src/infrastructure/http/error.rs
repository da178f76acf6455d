//! HTTP Error Handling
//!
//! 应用层错误到 HTTP 状态码与错误体 `{"error": {code, message, details}}` 的映射

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::application::ApplicationError;

/// 错误码定义
pub mod code {
    pub const JOB_NOT_FOUND: &str = "JOB_NOT_FOUND";
    pub const JOB_NOT_COMPLETE: &str = "JOB_NOT_COMPLETE";
    pub const RESULT_EXPIRED: &str = "RESULT_EXPIRED";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const TEXT_TOO_LONG: &str = "TEXT_TOO_LONG";
    pub const INVALID_FORMAT: &str = "INVALID_FORMAT";
    pub const PROVIDER_UNAVAILABLE: &str = "PROVIDER_UNAVAILABLE";
    pub const QUEUE_FULL: &str = "QUEUE_FULL";
    pub const SERVICE_UNAVAILABLE: &str = "SERVICE_UNAVAILABLE";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// 425 Too Early
pub fn too_early() -> StatusCode {
    StatusCode::from_u16(425).unwrap_or(StatusCode::CONFLICT)
}

/// 错误体
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// API 错误
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            code::VALIDATION_ERROR,
            message,
        )
    }

    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            code::INTERNAL_ERROR,
            "Internal server error",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(code = self.code, error = %self.message, "Request failed");
        } else {
            tracing::warn!(code = self.code, error = %self.message, "Request rejected");
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        let message = e.to_string();
        match e {
            ApplicationError::NotFound { .. } => {
                ApiError::new(StatusCode::NOT_FOUND, code::JOB_NOT_FOUND, message)
            }
            ApplicationError::NotYetComplete { status } => {
                ApiError::new(too_early(), code::JOB_NOT_COMPLETE, message)
                    .with_details(json!({ "current_status": status }))
            }
            ApplicationError::Expired { .. } => {
                ApiError::new(StatusCode::GONE, code::RESULT_EXPIRED, message)
            }
            ApplicationError::ValidationError(msg) => ApiError::validation(msg),
            ApplicationError::InvalidFormat(_) => {
                ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, code::INVALID_FORMAT, message)
            }
            ApplicationError::TextTooLong {
                max_length,
                actual_length,
            } => ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, code::TEXT_TOO_LONG, message)
                .with_details(json!({
                    "max_length": max_length,
                    "actual_length": actual_length,
                })),
            ApplicationError::QueueFull => {
                ApiError::new(StatusCode::SERVICE_UNAVAILABLE, code::QUEUE_FULL, message)
            }
            ApplicationError::ShuttingDown => ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                code::SERVICE_UNAVAILABLE,
                message,
            ),
            ApplicationError::ProviderUnavailable(_) | ApplicationError::ProviderFailure(_) => {
                ApiError::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    code::PROVIDER_UNAVAILABLE,
                    message,
                )
            }
            ApplicationError::StorageError(_) | ApplicationError::InternalError(_) => {
                tracing::error!(error = %message, "Internal error");
                ApiError::internal()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation("Invalid JSON body")
            .with_details(json!({ "reason": rejection.body_text() }))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation("Invalid query parameters")
            .with_details(json!({ "reason": rejection.body_text() }))
    }
}
