//! Client error types

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Base URL or path could not be built
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required (missing or rejected token)
    #[error("Authentication required")]
    Unauthorized,

    /// Subscription lapsed (HTTP 402)
    #[error("Payment required")]
    PaymentRequired,

    /// Server answered with a structured error envelope
    #[error("API error {}: {}", .0.code, .0.message)]
    Api(AppError),

    /// Unexpected status without an envelope
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Http(e) => {
                if e.is_timeout() {
                    AppError::with_message(ErrorCode::TimeoutError, e.to_string())
                } else if e.is_decode() {
                    AppError::with_message(ErrorCode::InvalidFormat, e.to_string())
                } else {
                    AppError::network(e.to_string())
                }
            }
            ClientError::InvalidUrl(msg) => AppError::with_message(ErrorCode::ConfigError, msg),
            ClientError::InvalidResponse(msg) => {
                AppError::with_message(ErrorCode::InvalidFormat, msg)
            }
            ClientError::Unauthorized => AppError::not_authenticated(),
            ClientError::PaymentRequired => AppError::subscription_required(),
            ClientError::Api(e) => e,
            ClientError::Status { status, body } => {
                let code = http::StatusCode::from_u16(status)
                    .map(ErrorCode::from_http_status)
                    .unwrap_or(ErrorCode::InternalError);
                let message = if body.is_empty() {
                    code.message().to_string()
                } else {
                    body
                };
                AppError::with_message(code, message).with_detail("status", status)
            }
            ClientError::Serialization(e) => {
                AppError::with_message(ErrorCode::InvalidFormat, e.to_string())
            }
        }
    }
}
