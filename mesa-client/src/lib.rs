//! Mesa Client - HTTP transport for the order backend
//!
//! Implements [`shared::OrderBackend`] over REST calls.

pub mod backend;
pub mod config;
pub mod error;
pub mod http;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use crate::http::HttpClient;

// Re-export shared types for convenience
pub use shared::error::ApiResponse;
