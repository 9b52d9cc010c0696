//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::OrderNotFound
            | Self::OrderItemNotFound
            | Self::VoidItemNotFound
            | Self::TableNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::OrderAlreadyPaid
            | Self::OrderAlreadyCanceled
            | Self::InvalidTransition
            | Self::NoActiveOrder => StatusCode::CONFLICT,

            // 410 Gone
            Self::RecoveryExpired => StatusCode::GONE,

            // 401 Unauthorized
            Self::NotAuthenticated | Self::TokenExpired | Self::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }

            // 403 Forbidden
            Self::PermissionDenied => StatusCode::FORBIDDEN,

            // 402 Payment Required
            Self::SubscriptionRequired => StatusCode::PAYMENT_REQUIRED,

            // 503 Service Unavailable (transient errors, client can retry)
            Self::NetworkError | Self::TimeoutError => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::Unknown | Self::InternalError | Self::ConfigError | Self::StorageError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Map a non-success HTTP status onto the closest error code
    ///
    /// Used when the backend answers without a parseable error envelope.
    pub fn from_http_status(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::NotAuthenticated,
            StatusCode::PAYMENT_REQUIRED => Self::SubscriptionRequired,
            StatusCode::FORBIDDEN => Self::PermissionDenied,
            StatusCode::NOT_FOUND => Self::NotFound,
            StatusCode::CONFLICT => Self::InvalidTransition,
            StatusCode::GONE => Self::RecoveryExpired,
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Self::ValidationFailed,
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => Self::TimeoutError,
            StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE => Self::NetworkError,
            s if s.is_success() => Self::Success,
            _ => Self::InternalError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_status() {
        assert_eq!(ErrorCode::OrderNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::VoidItemNotFound.http_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_payment_required_status() {
        assert_eq!(
            ErrorCode::SubscriptionRequired.http_status(),
            StatusCode::PAYMENT_REQUIRED
        );
    }

    #[test]
    fn test_bad_request_status() {
        assert_eq!(ErrorCode::ValidationFailed.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::LayoutLocked.http_status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_from_http_status() {
        assert_eq!(
            ErrorCode::from_http_status(StatusCode::PAYMENT_REQUIRED),
            ErrorCode::SubscriptionRequired
        );
        assert_eq!(
            ErrorCode::from_http_status(StatusCode::UNAUTHORIZED),
            ErrorCode::NotAuthenticated
        );
        assert_eq!(
            ErrorCode::from_http_status(StatusCode::UNPROCESSABLE_ENTITY),
            ErrorCode::ValidationFailed
        );
        assert_eq!(
            ErrorCode::from_http_status(StatusCode::IM_A_TEAPOT),
            ErrorCode::InternalError
        );
    }
}
