//! Data models
//!
//! Mirrors what the backend returns for orders, void items and tables.
//! All timestamps are Unix millis.

pub mod dining_table;
pub mod order;
pub mod void_item;

// Re-exports
pub use dining_table::*;
pub use order::*;
pub use void_item::*;
