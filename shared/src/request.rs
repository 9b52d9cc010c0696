//! Request bodies for the order backend
//!
//! One struct per mutating endpoint; optional fields are skipped when absent.

use crate::models::{BillableLine, OrderItemStatus, OrderStatus};
use serde::{Deserialize, Serialize};

/// `createOrder(tableId, restaurantId, billableLines[])`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub table_id: String,
    pub restaurant_id: String,
    pub items: Vec<BillableLine>,
}

/// `addItemsToOrder(orderId, items[])`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddItemsRequest {
    pub items: Vec<BillableLine>,
}

/// `updateOrderStatus(orderId, status, elapsedMinutes?)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_minutes: Option<i64>,
}

/// Addresses one order line by `(menu_item_id, observation)`
///
/// `status` is set for item status updates, `void_reason` for voids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemRequest {
    pub menu_item_id: String,
    pub observation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderItemStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub void_reason: Option<String>,
}

impl OrderItemRequest {
    pub fn new(menu_item_id: impl Into<String>, observation: impl Into<String>) -> Self {
        Self {
            menu_item_id: menu_item_id.into(),
            observation: observation.into(),
            status: None,
            void_reason: None,
        }
    }

    pub fn with_status(mut self, status: OrderItemStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_void_reason(mut self, reason: Option<String>) -> Self {
        self.void_reason = reason;
        self
    }
}

/// `recoverVoidOrderItem(voidItemId, targetOrderId)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoverVoidItemRequest {
    pub target_order_id: String,
}
