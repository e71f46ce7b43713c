//! Error types and HTTP response conversion

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::classify::Category;
use crate::query::{QueryParseError, RegistryError};
use crate::rpc::RpcError;

/// Realm advertised in `WWW-Authenticate` challenges
pub const AUTH_REALM: &str = r#"Basic realm="shotgun-restful""#;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Query format activation error
    #[error("Configuration error: {0}")]
    Registry(#[from] RegistryError),

    /// Filter query could not be parsed
    #[error("{0}")]
    Query(#[from] QueryParseError),

    /// Backend transport failure
    #[error("{0}")]
    Rpc(#[from] RpcError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed credentials
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Authorization error
    #[error("{0}")]
    Forbidden(String),

    /// Resource not found
    #[error("{0}")]
    NotFound(String),

    /// Bad request
    #[error("{0}")]
    BadRequest(String),

    /// Resource conflict (409)
    #[error("{0}")]
    Conflict(String),

    /// Backend reported an exception on a read-style call
    #[error("{0}")]
    Backend(String),

    /// Backend answered with something we could not use (502)
    #[error("Bad gateway: {0}")]
    BadGateway(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl Error {
    /// Error for a classified backend exception
    ///
    /// Returns `None` for [`Category::Success`].
    #[must_use]
    pub fn from_category(category: Category, message: impl Into<String>) -> Option<Self> {
        let message = message.into();
        match category {
            Category::Success => None,
            Category::Conflict => Some(Self::Conflict(message)),
            Category::Forbidden => Some(Self::Forbidden(message)),
            Category::NotFound => Some(Self::NotFound(message)),
            Category::BadRequest => Some(Self::BadRequest(message)),
        }
    }

    /// HTTP status this error is reported with
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Query(_) | Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Error::Rpc(RpcError::Decode(_) | RpcError::Status(_)) => StatusCode::BAD_GATEWAY,
            Error::Config(_)
            | Error::Registry(_)
            | Error::Rpc(_)
            | Error::Io(_)
            | Error::Backend(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,

    /// Optional error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// HTTP status code
    pub status: u16,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
            status: status.as_u16(),
        }
    }

    /// Create error response with a code
    pub fn with_code(
        status: StatusCode,
        code: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            error: error.into(),
            code: Some(code.into()),
            status: status.as_u16(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = match self {
            Error::Config(e) => {
                ErrorResponse::with_code(status, "CONFIG_ERROR", e.to_string())
            }

            Error::Registry(e) => {
                ErrorResponse::with_code(status, "CONFIG_ERROR", e.to_string())
            }

            Error::Query(e) => {
                tracing::debug!("Query parse error: {}", e);
                ErrorResponse::with_code(status, "INVALID_QUERY", e.to_string())
            }

            Error::Rpc(RpcError::Transport(e)) => {
                tracing::error!("Backend request failed: {}", e);
                ErrorResponse::with_code(status, "BACKEND_UNREACHABLE", "Backend request failed")
            }

            Error::Rpc(e @ (RpcError::Decode(_) | RpcError::Status(_))) => {
                tracing::error!("Bad backend response: {}", e);
                ErrorResponse::with_code(status, "BAD_GATEWAY", "Bad response from backend")
            }

            Error::Rpc(e @ RpcError::InvalidHost(_)) => {
                ErrorResponse::with_code(status, "CONFIG_ERROR", e.to_string())
            }

            Error::Io(e) => {
                tracing::error!("I/O error: {}", e);
                ErrorResponse::with_code(status, "INTERNAL_ERROR", "Internal server error")
            }

            Error::Unauthorized(msg) => {
                tracing::debug!("Rejected credentials: {}", msg);
                let mut response = (
                    status,
                    Json(ErrorResponse::with_code(status, "UNAUTHORIZED", "401 Unauthorized")),
                )
                    .into_response();
                response.headers_mut().insert(
                    header::WWW_AUTHENTICATE,
                    HeaderValue::from_static(AUTH_REALM),
                );
                return response;
            }

            Error::Forbidden(msg) => ErrorResponse::with_code(status, "FORBIDDEN", msg),

            Error::NotFound(msg) => ErrorResponse::with_code(status, "NOT_FOUND", msg),

            Error::BadRequest(msg) => ErrorResponse::with_code(status, "BAD_REQUEST", msg),

            Error::Conflict(msg) => ErrorResponse::with_code(status, "CONFLICT", msg),

            Error::Backend(msg) => {
                tracing::warn!("Backend exception: {}", msg);
                ErrorResponse::with_code(status, "BACKEND_EXCEPTION", msg)
            }

            Error::BadGateway(msg) => {
                tracing::error!("Bad gateway: {}", msg);
                ErrorResponse::with_code(status, "BAD_GATEWAY", msg)
            }

            Error::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ErrorResponse::with_code(status, "INTERNAL_ERROR", "Internal server error")
            }
        };

        (status, Json(error_response)).into_response()
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}
