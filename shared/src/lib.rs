//! Shared types for the Mesa floor stack
//!
//! Data model, backend boundary trait, request bodies, and the unified
//! error taxonomy used by both the HTTP client and the floor core.

pub mod backend;
pub mod error;
pub mod models;
pub mod money;
pub mod request;
pub mod serde_helpers;
pub mod types;
pub mod util;

// Re-exports
pub use backend::OrderBackend;
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use serde::{Deserialize, Serialize};
