//! Request-level errors and their HTTP mapping
//!
//! Every error body is JSON: `{"error": <code>, "message": <text>}`.
//! Internal errors also carry the calculation trace gathered so far.

use pme_core::{CalcTrace, DiagnosticError, InputError};
use serde_json::json;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::Reply;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable is set to an unparseable value
    #[error("invalid value for {name}: {value:?}")]
    InvalidVar {
        /// Variable name
        name: &'static str,
        /// Raw value
        value: String,
    },
}

/// Errors surfaced by the HTTP handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Wrong HTTP verb for the endpoint
    #[error("Use {allowed}")]
    MethodNotAllowed {
        /// The verb the endpoint accepts
        allowed: &'static str,
    },

    /// Missing or wrong `x-api-key`
    #[error("Unauthorized")]
    Unauthorized,

    /// Request body over the configured limit
    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge {
        /// Configured limit
        limit: usize,
    },

    /// Body sent without a `Content-Length` header
    #[error("Content-Length header required")]
    LengthRequired,

    /// Body is not a JSON object
    #[error(transparent)]
    Input(#[from] InputError),

    /// Calculator failed unexpectedly
    #[error("internal error: {source}")]
    Internal {
        /// Underlying failure
        #[source]
        source: DiagnosticError,
        /// Trace gathered before the failure
        logs: CalcTrace,
    },
}

impl ApiError {
    /// HTTP status for this error
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::LengthRequired => StatusCode::LENGTH_REQUIRED,
            ApiError::Input(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::MethodNotAllowed { .. } => "method_not_allowed",
            ApiError::Unauthorized => "unauthorized",
            ApiError::PayloadTooLarge { .. } => "payload_too_large",
            ApiError::LengthRequired => "length_required",
            ApiError::Input(InputError::Malformed(_)) => "invalid_json",
            ApiError::Input(InputError::NotAnObject(_)) => "invalid_payload",
            ApiError::Internal { .. } => "internal_error",
        }
    }
}

impl ApiError {
    /// Render as a JSON response without consuming the error
    #[must_use]
    pub fn to_response(&self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Internal { logs, .. } => json!({
                "error": self.code(),
                "message": self.to_string(),
                "logs": logs,
            }),
            _ => json!({ "error": self.code(), "message": self.to_string() }),
        };
        warp::reply::with_status(warp::reply::json(&body), status).into_response()
    }
}

impl Reply for ApiError {
    fn into_response(self) -> Response {
        self.to_response()
    }
}

impl warp::reject::Reject for ApiError {}
