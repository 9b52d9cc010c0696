//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Displayed table status
///
/// Occupancy is always derived from active orders; the value the backend
/// reports is kept only as a hint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    #[default]
    Available,
    Occupied,
    Reserved,
    ProcessingPayment,
}

/// Dining table entity (桌台)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Table {
    pub table_id: String,
    pub table_number: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
    /// Status as last reported by the backend (not authoritative)
    #[serde(default)]
    pub status: TableStatus,
}

impl Table {
    pub fn new(table_id: impl Into<String>, table_number: i32) -> Self {
        Self {
            table_id: table_id.into(),
            table_number,
            qr_code: None,
            status: TableStatus::Available,
        }
    }
}
