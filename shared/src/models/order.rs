//! Order Model

use crate::money;
use crate::serde_helpers::{self, flexible_timestamp};
use crate::types::Timestamp;
use serde::{Deserialize, Serialize};

/// Observation stored on lines that carry no free-text note
pub const NO_OBSERVATION: &str = "no observation";

/// Order status (order-level billing lifecycle)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Ordered,
    Prepared,
    Delivered,
    Paid,
    Canceled,
}

impl OrderStatus {
    /// Statuses that keep a table occupied
    pub const ACTIVE: [OrderStatus; 3] = [Self::Ordered, Self::Prepared, Self::Delivered];

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid | Self::Canceled)
    }

    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ordered => "ordered",
            Self::Prepared => "prepared",
            Self::Delivered => "delivered",
            Self::Paid => "paid",
            Self::Canceled => "canceled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-line preparation status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderItemStatus {
    #[default]
    Ordered,
    Pending,
    Prepared,
    Delivered,
    Void,
    Cancelled,
}

impl OrderItemStatus {
    /// Nothing cooked yet
    pub fn is_before_preparation(&self) -> bool {
        matches!(self, Self::Ordered | Self::Pending)
    }

    /// Removed from the bill, either voided or cancelled
    pub fn is_removed(&self) -> bool {
        matches!(self, Self::Void | Self::Cancelled)
    }

    /// Whether the line counts towards `total_price`
    pub fn is_billable(&self) -> bool {
        !self.is_removed()
    }

    /// Kitchen progress rank; `None` for the void/cancelled side branches
    pub fn rank(&self) -> Option<u8> {
        match self {
            Self::Ordered => Some(0),
            Self::Pending => Some(1),
            Self::Prepared => Some(2),
            Self::Delivered => Some(3),
            Self::Void | Self::Cancelled => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ordered => "ordered",
            Self::Pending => "pending",
            Self::Prepared => "prepared",
            Self::Delivered => "delivered",
            Self::Void => "void",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line within an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub menu_item_id: String,
    pub name: String,
    /// Unit price; side-dish lines are always 0
    pub price: f64,
    pub quantity: i32,
    #[serde(
        default = "serde_helpers::default_observation",
        deserialize_with = "serde_helpers::observation"
    )]
    pub observation: String,
    #[serde(default)]
    pub status: OrderItemStatus,
}

impl OrderItem {
    pub fn new(
        menu_item_id: impl Into<String>,
        name: impl Into<String>,
        price: f64,
        quantity: i32,
        observation: &str,
    ) -> Self {
        Self {
            menu_item_id: menu_item_id.into(),
            name: name.into(),
            price,
            quantity,
            observation: serde_helpers::normalize_observation(observation),
            status: OrderItemStatus::Ordered,
        }
    }

    /// Whether this line is addressed by `(menu_item_id, observation)`
    ///
    /// The observation is compared after normalization.
    pub fn matches(&self, menu_item_id: &str, observation: &str) -> bool {
        self.menu_item_id == menu_item_id
            && self.observation == serde_helpers::normalize_observation(observation)
    }

    pub fn subtotal(&self) -> f64 {
        money::to_f64(money::line_total(self.price, self.quantity))
    }
}

/// Order as reported by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Server-assigned identifier
    pub order_id: String,
    /// Table number shown to staff
    pub table: i32,
    /// Reference to [`crate::models::Table::table_id`]
    pub table_id: String,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    #[serde(default)]
    pub total_price: f64,
    #[serde(with = "flexible_timestamp")]
    pub created_at: Timestamp,
    /// Minutes from creation to `prepared`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_to_prepare: Option<i64>,
    /// Minutes recorded at `delivered`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_to_deliver: Option<i64>,
    /// Minutes recorded at `paid`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_to_pay: Option<i64>,
}

impl Order {
    pub fn new(
        order_id: impl Into<String>,
        table: i32,
        table_id: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            table,
            table_id: table_id.into(),
            items: Vec::new(),
            status: OrderStatus::Ordered,
            total_price: 0.0,
            created_at,
            time_to_prepare: None,
            time_to_deliver: None,
            time_to_pay: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Sum of `price * quantity` over lines that are neither void nor cancelled
    pub fn billable_total(&self) -> f64 {
        money::sum_lines(
            self.items
                .iter()
                .filter(|i| i.status.is_billable())
                .map(|i| (i.price, i.quantity)),
        )
    }

    /// Refresh `total_price` from the current lines
    pub fn recompute_total(&mut self) {
        self.total_price = self.billable_total();
    }

    /// Schema check applied to every order crossing the boundary
    pub fn validate(&self) -> Result<(), String> {
        if self.order_id.trim().is_empty() {
            return Err("order_id must not be empty".to_string());
        }
        for item in &self.items {
            if item.menu_item_id.trim().is_empty() {
                return Err(format!("order {}: item without menu_item_id", self.order_id));
            }
            if !item.price.is_finite() || item.price < 0.0 || item.price > money::MAX_PRICE {
                return Err(format!(
                    "order {}: item {} has invalid price {}",
                    self.order_id, item.menu_item_id, item.price
                ));
            }
            if item.quantity <= 0 || item.quantity > money::MAX_QUANTITY {
                return Err(format!(
                    "order {}: item {} has invalid quantity {}",
                    self.order_id, item.menu_item_id, item.quantity
                ));
            }
        }
        Ok(())
    }
}

/// Post-explosion line sent to order creation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillableLine {
    pub menu_item_id: String,
    pub name: String,
    pub quantity: i32,
    pub observation: String,
    pub price: f64,
}

impl From<&BillableLine> for OrderItem {
    fn from(line: &BillableLine) -> Self {
        OrderItem::new(
            line.menu_item_id.clone(),
            line.name.clone(),
            line.price,
            line.quantity,
            &line.observation,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, price: f64, quantity: i32, status: OrderItemStatus) -> OrderItem {
        let mut item = OrderItem::new(id, format!("Dish {}", id), price, quantity, "");
        item.status = status;
        item
    }

    #[test]
    fn test_billable_total_excludes_void_and_cancelled() {
        let mut order = Order::new("o-1", 4, "t-4", 0);
        order.items = vec![
            item("a", 10.0, 2, OrderItemStatus::Ordered),
            item("b", 7.5, 1, OrderItemStatus::Void),
            item("c", 3.0, 3, OrderItemStatus::Cancelled),
            item("d", 4.25, 2, OrderItemStatus::Delivered),
            item("e", 0.0, 2, OrderItemStatus::Prepared),
        ];
        order.recompute_total();
        assert_eq!(order.total_price, 28.5);
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(serde_json::to_string(&OrderStatus::Canceled).unwrap(), "\"canceled\"");
        assert_eq!(
            serde_json::to_string(&OrderItemStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
        let s: OrderItemStatus = serde_json::from_str("\"void\"").unwrap();
        assert_eq!(s, OrderItemStatus::Void);
    }

    #[test]
    fn test_order_deserialize_with_defaults() {
        let json = r#"{
            "order_id": "o-9",
            "table": 4,
            "table_id": "t-4",
            "status": "ordered",
            "created_at": "2024-05-01T12:00:00",
            "items": [
                {"menu_item_id": "m-1", "name": "Soup", "price": 6.0, "quantity": 1, "observation": ""}
            ]
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.created_at, 1_714_564_800_000);
        assert_eq!(order.total_price, 0.0);
        assert_eq!(order.time_to_prepare, None);
        assert_eq!(order.items[0].observation, NO_OBSERVATION);
        assert_eq!(order.items[0].status, OrderItemStatus::Ordered);
        assert!(order.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_lines() {
        let mut order = Order::new("o-1", 1, "t-1", 0);
        order.items.push(item("a", -1.0, 1, OrderItemStatus::Ordered));
        assert!(order.validate().is_err());

        order.items[0].price = 1.0;
        order.items[0].quantity = 0;
        assert!(order.validate().is_err());

        let blank = Order::new(" ", 1, "t-1", 0);
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_lines() {
        let mut order = Order::new("o-1", 1, "t-1", 0);
        order.items.push(item("a", 1e20, 1_000_000_000, OrderItemStatus::Prepared));
        assert!(order.validate().is_err());

        order.items[0].quantity = 1;
        assert!(order.validate().is_err());

        order.items[0].price = money::MAX_PRICE;
        order.items[0].quantity = money::MAX_QUANTITY;
        assert!(order.validate().is_ok());
        order.recompute_total();
        assert_eq!(order.total_price, 9_999_000_000.0);
    }

    #[test]
    fn test_item_matches_normalized_observation() {
        let line = OrderItem::new("m-1", "Soup", 6.0, 1, "  ");
        assert!(line.matches("m-1", ""));
        assert!(line.matches("m-1", NO_OBSERVATION));
        assert!(!line.matches("m-1", "extra hot"));
        assert!(!line.matches("m-2", ""));
    }

    #[test]
    fn test_status_helpers() {
        assert!(OrderStatus::Paid.is_terminal());
        assert!(OrderStatus::Canceled.is_terminal());
        assert!(OrderStatus::Delivered.is_active());
        assert!(OrderItemStatus::Pending.is_before_preparation());
        assert!(!OrderItemStatus::Prepared.is_before_preparation());
        assert!(OrderItemStatus::Void.is_removed());
    }
}
