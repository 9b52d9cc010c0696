//! Common types for the shared crate

/// Timestamp type (Unix milliseconds, UTC)
pub type Timestamp = i64;

/// One minute in milliseconds
pub const MINUTE_MS: i64 = 60_000;
