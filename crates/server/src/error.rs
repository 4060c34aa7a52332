//! API error types
//!
//! Only input validation and missing configuration ever surface as error
//! statuses; remote-capability failures are absorbed into canned replies by
//! the handlers so the conversation never breaks visibly.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use hermes_protocol::ApiErrorBody;
use std::fmt;

/// Errors returned to callers of the conversation endpoints
#[derive(Debug)]
pub enum ApiError {
    /// Malformed, missing, or oversized client payload
    InvalidInput {
        message: String,
        suggestion: String,
    },

    /// A required credential was absent at startup
    ServiceMisconfigured {
        message: String,
        suggestion: String,
    },

    /// Anything else; handlers convert this to a fallback before it can
    /// reach the wire
    Internal(String),
}

impl ApiError {
    /// Invalid-input error with a remediation hint
    pub fn invalid(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        ApiError::InvalidInput {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Missing-configuration error with a remediation hint
    pub fn misconfigured(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        ApiError::ServiceMisconfigured {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidInput { message, .. } => write!(f, "invalid input: {}", message),
            ApiError::ServiceMisconfigured { message, .. } => {
                write!(f, "service misconfigured: {}", message)
            }
            ApiError::Internal(message) => write!(f, "internal error: {}", message),
        }
    }
}

impl std::error::Error for ApiError {}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::ServiceMisconfigured { .. } | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (message, suggestion) = match self {
            ApiError::InvalidInput {
                message,
                suggestion,
            }
            | ApiError::ServiceMisconfigured {
                message,
                suggestion,
            } => (message.clone(), Some(suggestion.clone())),
            ApiError::Internal(message) => (
                message.clone(),
                Some("Please try again or contact support if the issue persists.".to_string()),
            ),
        };

        HttpResponse::build(self.status_code())
            .insert_header(("Cache-Control", "no-cache"))
            .json(ApiErrorBody {
                error: message,
                error_type: None,
                suggestion,
                timestamp: chrono::Utc::now(),
            })
    }
}

/// Result type for handler-internal steps
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let invalid = ApiError::invalid("No message provided", "Provide a message.");
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);

        let misconfigured = ApiError::misconfigured("AI service not available", "Set the key.");
        assert_eq!(
            misconfigured.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_response_is_json() {
        let err = ApiError::invalid("Message too long", "Shorten it.");
        let resp = err.error_response();
        let content_type = resp
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("application/json"));
    }
}
