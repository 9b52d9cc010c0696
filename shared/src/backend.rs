//! Order backend boundary
//!
//! The floor core talks to the backend only through [`OrderBackend`].
//! Transport (HTTP, in-memory test double) lives behind the trait.

use crate::error::AppResult;
use crate::models::{BillableLine, Order, OrderItemStatus, OrderStatus, Table, VoidOrderItem};
use async_trait::async_trait;

/// Request/response boundary consumed by the floor core
///
/// Every method may fail with `NotAuthenticated`, `SubscriptionRequired`
/// (payment-required signal, must never be retried) or `NetworkError`.
#[async_trait]
pub trait OrderBackend: Send + Sync {
    async fn fetch_active_orders(
        &self,
        restaurant_id: &str,
        statuses: &[OrderStatus],
    ) -> AppResult<Vec<Order>>;

    async fn fetch_void_items(&self, restaurant_id: &str) -> AppResult<Vec<VoidOrderItem>>;

    async fn fetch_tables(&self, restaurant_id: &str) -> AppResult<Vec<Table>>;

    async fn create_order(
        &self,
        table_id: &str,
        restaurant_id: &str,
        lines: &[BillableLine],
    ) -> AppResult<Order>;

    async fn add_items_to_order(&self, order_id: &str, lines: &[BillableLine]) -> AppResult<Order>;

    async fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        elapsed_minutes: Option<i64>,
    ) -> AppResult<()>;

    async fn update_order_item(
        &self,
        order_id: &str,
        menu_item_id: &str,
        observation: &str,
        status: OrderItemStatus,
    ) -> AppResult<()>;

    async fn cancel_order_item(
        &self,
        order_id: &str,
        menu_item_id: &str,
        observation: &str,
    ) -> AppResult<()>;

    async fn void_order_item(
        &self,
        order_id: &str,
        menu_item_id: &str,
        observation: &str,
        reason: Option<&str>,
    ) -> AppResult<()>;

    async fn recover_void_order_item(
        &self,
        void_item_id: &str,
        target_order_id: &str,
    ) -> AppResult<()>;
}
