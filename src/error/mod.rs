//! Unified error handling for Registra Core
//!
//! Every handler and service returns [`ApiError`]; the translation from the
//! domain error taxonomy to HTTP status codes and structured integration
//! error bodies happens exactly once, in `into_response`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, ApiError>;

/// Error codes used in integration error bodies
pub mod codes {
    pub const DEFAULT: &str = "Global.Internal.Error";
    pub const VALIDATION: &str = "Validation.Exception";
    pub const NOT_SUPPORTED: &str = "Global.NotSupported";
    pub const KEY_NOT_FOUND: &str = "Key.NotFound";
    pub const PERMISSION: &str = "Access.Denied";
}

/// Message returned for every operation a resource does not support
pub const NOT_SUPPORTED_MESSAGE: &str =
    "The method specified is not supported for this resource.";

/// One entry in an integration error body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationApiError {
    pub code: String,
    pub description: String,
    pub message: String,
}

impl IntegrationApiError {
    pub fn new(
        code: impl Into<String>,
        description: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            message: message.into(),
        }
    }

    /// The default-shaped error used when a handler rejects input itself
    pub fn default_api_error(message: impl Into<String>) -> Self {
        Self::new(codes::DEFAULT, "Unexpected error", message)
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// One or more structured validation errors, reported together
    #[error("Validation failed")]
    Validation(Vec<IntegrationApiError>),

    /// The id belongs to a different resource type than the one requested
    #[error("Wrong resource type: {0}")]
    WrongResourceType(String),

    /// Create/update/delete requested on a resource that does not allow it
    #[error("{}", NOT_SUPPORTED_MESSAGE)]
    NotSupported,

    /// Requested API version is not served by the route
    #[error("Not acceptable: {0}")]
    NotAcceptable(String),

    #[error("Repository error: {0}")]
    Repository(#[from] sqlx::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Shorthand for a single structured validation error
    pub fn validation(description: &str, message: impl Into<String>) -> Self {
        ApiError::Validation(vec![IntegrationApiError::new(
            codes::VALIDATION,
            description,
            message,
        )])
    }
}

/// Integration error response body: `{"errors": [...]}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub errors: Vec<IntegrationApiError>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, errors) = match &self {
            ApiError::NotFound(msg) => {
                tracing::error!("{}", self);
                (
                    StatusCode::NOT_FOUND,
                    vec![IntegrationApiError::new(
                        codes::KEY_NOT_FOUND,
                        "The record could not be found",
                        msg.clone(),
                    )],
                )
            }
            ApiError::BadRequest(msg) => {
                tracing::error!("{}", self);
                (
                    StatusCode::BAD_REQUEST,
                    vec![IntegrationApiError::default_api_error(msg.clone())],
                )
            }
            ApiError::Forbidden(msg) => {
                tracing::error!("{}", self);
                (
                    StatusCode::FORBIDDEN,
                    vec![IntegrationApiError::new(
                        codes::PERMISSION,
                        "Access to the resource was denied",
                        msg.clone(),
                    )],
                )
            }
            ApiError::SessionExpired(msg) => {
                tracing::error!("{}", self);
                (
                    StatusCode::UNAUTHORIZED,
                    vec![IntegrationApiError::default_api_error(msg.clone())],
                )
            }
            ApiError::Validation(errors) => {
                tracing::error!("Validation failed: {:?}", errors);
                (StatusCode::BAD_REQUEST, errors.clone())
            }
            ApiError::WrongResourceType(msg) => {
                tracing::error!("{}", self);
                (
                    StatusCode::BAD_REQUEST,
                    vec![IntegrationApiError::default_api_error(msg.clone())],
                )
            }
            ApiError::NotSupported => (
                StatusCode::BAD_REQUEST,
                vec![IntegrationApiError::new(
                    codes::NOT_SUPPORTED,
                    "The requested operation is not supported",
                    NOT_SUPPORTED_MESSAGE,
                )],
            ),
            ApiError::NotAcceptable(msg) => {
                tracing::error!("{}", self);
                (
                    StatusCode::NOT_ACCEPTABLE,
                    vec![IntegrationApiError::default_api_error(msg.clone())],
                )
            }
            ApiError::Repository(e) => {
                tracing::error!("Repository error: {:?}", e);
                (
                    StatusCode::BAD_REQUEST,
                    vec![IntegrationApiError::new(
                        codes::DEFAULT,
                        "A data access error occurred",
                        "Unable to read or update the backing record.",
                    )],
                )
            }
            ApiError::Cache(e) => {
                tracing::error!("Cache error: {:?}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    vec![IntegrationApiError::new(
                        codes::DEFAULT,
                        "A cache error occurred",
                        "The caching layer is unavailable.",
                    )],
                )
            }
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                (
                    StatusCode::BAD_REQUEST,
                    vec![IntegrationApiError::default_api_error(
                        "An unexpected error occurred processing the request.",
                    )],
                )
            }
        };

        (status, Json(ErrorResponse { errors })).into_response()
    }
}

// Conversion from validator derive errors
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::validation("An error occurred attempting to validate data.", errors.to_string())
    }
}
