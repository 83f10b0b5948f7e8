//! Structured API error responses with error codes
//!
//! Every failure leaves the service as `{ "ok": false, "error", "code" }`
//! with the same code echoed in an `x-error-code` header.

use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::infra::SealError;

// ============================================================================
// Error Codes
// ============================================================================

/// Error codes for API responses
///
/// These codes are stable and can be used by clients for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Request errors (1xxx)
    /// Malformed body, wrong field type, unknown mode
    InvalidInput,
    /// A field failed a shape rule (hash, address, length, base64)
    ValidationFailed,
    /// Request body exceeds the configured limit
    PayloadTooLarge,

    // Sealing rule errors (2xxx)
    /// First-seal or subsequent-seal structural rule broken
    PolicyViolation,
    /// Signer is not authorized for the document
    Forbidden,
    /// Signer already sealed the document
    DuplicateSigner,
    /// Global or per-document seal cap reached
    LimitExceeded,

    // Lookup errors (4xxx)
    /// Query target absent
    NotFound,

    // Infrastructure errors (8xxx)
    /// Internal server error
    InternalError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn numeric_code(&self) -> u32 {
        match self {
            ErrorCode::InvalidInput => 1001,
            ErrorCode::ValidationFailed => 1002,
            ErrorCode::PayloadTooLarge => 1003,
            ErrorCode::PolicyViolation => 2001,
            ErrorCode::Forbidden => 2002,
            ErrorCode::DuplicateSigner => 2003,
            ErrorCode::LimitExceeded => 2004,
            ErrorCode::NotFound => 4001,
            ErrorCode::InternalError => 8999,
        }
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidInput
            | ErrorCode::ValidationFailed
            | ErrorCode::PolicyViolation
            | ErrorCode::DuplicateSigner
            | ErrorCode::LimitExceeded => StatusCode::BAD_REQUEST,
            ErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ErrorCode::PolicyViolation => "POLICY_VIOLATION",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::DuplicateSigner => "DUPLICATE_SIGNER",
            ErrorCode::LimitExceeded => "LIMIT_EXCEEDED",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Structured Error Response
// ============================================================================

/// Error body returned by every endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Always `false`
    pub ok: bool,
    /// Human-readable error message
    pub error: String,
    /// Machine-readable error code
    pub code: ErrorCode,
    /// Offending field, for shape-rule failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: message.into(),
            code,
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.code.http_status()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code.as_str();
        let mut response = (status, Json(self)).into_response();

        response.headers_mut().insert(
            HeaderName::from_static("x-error-code"),
            HeaderValue::from_static(code),
        );

        response
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<SealError> for ApiError {
    fn from(err: SealError) -> Self {
        let message = err.to_string();
        match err {
            SealError::InvalidInput(_) => ApiError::new(ErrorCode::InvalidInput, message),
            SealError::Validation(e) => {
                ApiError::new(ErrorCode::ValidationFailed, message).with_field(e.field)
            }
            SealError::PolicyViolation(_) => ApiError::new(ErrorCode::PolicyViolation, message),
            SealError::Forbidden(_) => ApiError::new(ErrorCode::Forbidden, message),
            SealError::DuplicateSigner { .. } => {
                ApiError::new(ErrorCode::DuplicateSigner, message)
            }
            SealError::LimitExceeded(_) => ApiError::new(ErrorCode::LimitExceeded, message),
            SealError::NotFound(_) => ApiError::new(ErrorCode::NotFound, message),
            SealError::Internal(_) => ApiError::new(ErrorCode::InternalError, message),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::new(ErrorCode::PayloadTooLarge, rejection.body_text())
        } else {
            ApiError::new(
                ErrorCode::InvalidInput,
                format!("invalid JSON body: {}", rejection.body_text()),
            )
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
