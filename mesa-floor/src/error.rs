//! Floor error taxonomy
//!
//! Local refusals (`Validation`, `InvalidTransition`) are raised before any
//! network call. Everything the backend reports arrives as [`AppError`] and is
//! folded onto the same variants.

use shared::error::{AppError, ErrorCategory, ErrorCode};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum FloorError {
    /// Bad local input (quantity <= 0, missing table selection, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Illegal order or item status change
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// Void item is past its recovery window
    #[error("Recovery window expired for void item {0}")]
    RecoveryExpired(String),

    /// No eligible active order to receive a recovered item
    #[error("No active order: {0}")]
    NoActiveOrder(String),

    /// Order, item, table or void item does not exist (or was already consumed)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or rejected session token
    #[error("Authentication required")]
    Authentication,

    /// Payment-required boundary signal; caller must redirect to billing
    #[error("Subscription required")]
    SubscriptionRequired,

    /// Transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// Local layout storage failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Any other refusal reported by the backend
    #[error("Backend error: {0}")]
    Backend(AppError),
}

impl FloorError {
    /// Unified error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::ValidationFailed,
            Self::InvalidTransition(_) => ErrorCode::InvalidTransition,
            Self::RecoveryExpired(_) => ErrorCode::RecoveryExpired,
            Self::NoActiveOrder(_) => ErrorCode::NoActiveOrder,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::Authentication => ErrorCode::NotAuthenticated,
            Self::SubscriptionRequired => ErrorCode::SubscriptionRequired,
            Self::Network(_) => ErrorCode::NetworkError,
            Self::Storage(_) => ErrorCode::StorageError,
            Self::Backend(e) => e.code,
        }
    }

    /// Refused locally, before any network call
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidTransition(_))
    }

    /// Overrides any in-progress state; the caller must go to billing
    pub fn requires_billing_redirect(&self) -> bool {
        matches!(self, Self::SubscriptionRequired)
    }

    /// Shown to staff as a notification rather than an inline form error
    pub fn is_user_notification(&self) -> bool {
        matches!(
            self,
            Self::RecoveryExpired(_) | Self::NoActiveOrder(_) | Self::Network(_)
        )
    }
}

impl From<AppError> for FloorError {
    fn from(err: AppError) -> Self {
        match err.code {
            ErrorCode::SubscriptionRequired => FloorError::SubscriptionRequired,
            ErrorCode::NotAuthenticated | ErrorCode::TokenExpired | ErrorCode::TokenInvalid => {
                FloorError::Authentication
            }
            ErrorCode::NetworkError | ErrorCode::TimeoutError => FloorError::Network(err.message),
            ErrorCode::ValidationFailed
            | ErrorCode::RequiredField
            | ErrorCode::InvalidFormat
            | ErrorCode::OrderEmpty
            | ErrorCode::TableNotSelected => FloorError::Validation(err.message),
            ErrorCode::InvalidTransition
            | ErrorCode::OrderAlreadyPaid
            | ErrorCode::OrderAlreadyCanceled => FloorError::InvalidTransition(err.message),
            ErrorCode::RecoveryExpired => FloorError::RecoveryExpired(err.message),
            ErrorCode::NoActiveOrder => FloorError::NoActiveOrder(err.message),
            ErrorCode::NotFound
            | ErrorCode::OrderNotFound
            | ErrorCode::OrderItemNotFound
            | ErrorCode::VoidItemNotFound
            | ErrorCode::TableNotFound => FloorError::NotFound(err.message),
            _ => {
                if err.code.category() == ErrorCategory::System {
                    tracing::error!(code = %err.code, message = %err.message, "Backend system error");
                }
                FloorError::Backend(err)
            }
        }
    }
}

pub type FloorResult<T> = Result<T, FloorError>;
