//! Void Order Item Model

use crate::money;
use crate::serde_helpers::{self, flexible_timestamp};
use crate::types::Timestamp;
use serde::{Deserialize, Serialize};

/// A prepared line pulled off its bill, waiting in the recovery pool
///
/// Lives independently of the order it came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoidOrderItem {
    pub void_order_item_id: String,
    /// Order the line was voided from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default)]
    pub menu_item_id: String,
    pub name: String,
    pub price: f64,
    pub quantity: i32,
    #[serde(
        default = "serde_helpers::default_observation",
        deserialize_with = "serde_helpers::observation"
    )]
    pub observation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub void_reason: Option<String>,
    /// Server clock at the moment of voiding
    #[serde(with = "flexible_timestamp")]
    pub created_at: Timestamp,
}

impl VoidOrderItem {
    pub fn validate(&self) -> Result<(), String> {
        if self.void_order_item_id.trim().is_empty() {
            return Err("void_order_item_id must not be empty".to_string());
        }
        if !self.price.is_finite() || self.price < 0.0 || self.price > money::MAX_PRICE {
            return Err(format!(
                "void item {} has invalid price {}",
                self.void_order_item_id, self.price
            ));
        }
        if self.quantity <= 0 || self.quantity > money::MAX_QUANTITY {
            return Err(format!(
                "void item {} has invalid quantity {}",
                self.void_order_item_id, self.quantity
            ));
        }
        Ok(())
    }
}
