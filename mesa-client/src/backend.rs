//! [`OrderBackend`] over HTTP
//!
//! Endpoint layout:
//!
//! | Operation                | Method | Path |
//! |--------------------------|--------|------|
//! | fetch_active_orders      | GET    | `/api/restaurants/{rid}/orders?status=a,b` |
//! | fetch_void_items         | GET    | `/api/restaurants/{rid}/void-items` |
//! | fetch_tables             | GET    | `/api/restaurants/{rid}/tables` |
//! | create_order             | POST   | `/api/orders` |
//! | add_items_to_order       | POST   | `/api/orders/{id}/items` |
//! | update_order_status      | PATCH  | `/api/orders/{id}/status` |
//! | update_order_item        | PATCH  | `/api/orders/{id}/items` |
//! | cancel_order_item        | POST   | `/api/orders/{id}/items/cancel` |
//! | void_order_item          | POST   | `/api/orders/{id}/items/void` |
//! | recover_void_order_item  | POST   | `/api/void-items/{id}/recover` |

use crate::HttpClient;
use async_trait::async_trait;
use reqwest::Method;
use shared::OrderBackend;
use shared::error::{AppError, AppResult};
use shared::models::{BillableLine, Order, OrderItemStatus, OrderStatus, Table, VoidOrderItem};
use shared::request::{
    AddItemsRequest, CreateOrderRequest, OrderItemRequest, RecoverVoidItemRequest,
    UpdateOrderStatusRequest,
};

/// Reject payloads that fail the schema check instead of letting them leak inward
fn checked<T>(items: Vec<T>, validate: impl Fn(&T) -> Result<(), String>) -> AppResult<Vec<T>> {
    for item in &items {
        validate(item).map_err(|e| {
            tracing::warn!(error = %e, "backend payload failed validation");
            AppError::validation(e)
        })?;
    }
    Ok(items)
}

fn status_query(statuses: &[OrderStatus]) -> Vec<(&'static str, String)> {
    if statuses.is_empty() {
        return Vec::new();
    }
    let joined = statuses
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(",");
    vec![("status", joined)]
}

#[async_trait]
impl OrderBackend for HttpClient {
    async fn fetch_active_orders(
        &self,
        restaurant_id: &str,
        statuses: &[OrderStatus],
    ) -> AppResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .get(
                &["api", "restaurants", restaurant_id, "orders"],
                &status_query(statuses),
            )
            .await?;
        checked(orders, Order::validate)
    }

    async fn fetch_void_items(&self, restaurant_id: &str) -> AppResult<Vec<VoidOrderItem>> {
        let items: Vec<VoidOrderItem> = self
            .get(&["api", "restaurants", restaurant_id, "void-items"], &[])
            .await?;
        checked(items, VoidOrderItem::validate)
    }

    async fn fetch_tables(&self, restaurant_id: &str) -> AppResult<Vec<Table>> {
        Ok(self
            .get(&["api", "restaurants", restaurant_id, "tables"], &[])
            .await?)
    }

    async fn create_order(
        &self,
        table_id: &str,
        restaurant_id: &str,
        lines: &[BillableLine],
    ) -> AppResult<Order> {
        let body = CreateOrderRequest {
            table_id: table_id.to_string(),
            restaurant_id: restaurant_id.to_string(),
            items: lines.to_vec(),
        };
        let order: Order = self.call(Method::POST, &["api", "orders"], &body).await?;
        order.validate().map_err(AppError::validation)?;
        Ok(order)
    }

    async fn add_items_to_order(&self, order_id: &str, lines: &[BillableLine]) -> AppResult<Order> {
        let body = AddItemsRequest {
            items: lines.to_vec(),
        };
        let order: Order = self
            .call(Method::POST, &["api", "orders", order_id, "items"], &body)
            .await?;
        order.validate().map_err(AppError::validation)?;
        Ok(order)
    }

    async fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        elapsed_minutes: Option<i64>,
    ) -> AppResult<()> {
        let body = UpdateOrderStatusRequest {
            status,
            elapsed_minutes,
        };
        Ok(self
            .call_unit(Method::PATCH, &["api", "orders", order_id, "status"], &body)
            .await?)
    }

    async fn update_order_item(
        &self,
        order_id: &str,
        menu_item_id: &str,
        observation: &str,
        status: OrderItemStatus,
    ) -> AppResult<()> {
        let body = OrderItemRequest::new(menu_item_id, observation).with_status(status);
        Ok(self
            .call_unit(Method::PATCH, &["api", "orders", order_id, "items"], &body)
            .await?)
    }

    async fn cancel_order_item(
        &self,
        order_id: &str,
        menu_item_id: &str,
        observation: &str,
    ) -> AppResult<()> {
        let body = OrderItemRequest::new(menu_item_id, observation);
        Ok(self
            .call_unit(
                Method::POST,
                &["api", "orders", order_id, "items", "cancel"],
                &body,
            )
            .await?)
    }

    async fn void_order_item(
        &self,
        order_id: &str,
        menu_item_id: &str,
        observation: &str,
        reason: Option<&str>,
    ) -> AppResult<()> {
        let body = OrderItemRequest::new(menu_item_id, observation)
            .with_void_reason(reason.map(str::to_string));
        Ok(self
            .call_unit(
                Method::POST,
                &["api", "orders", order_id, "items", "void"],
                &body,
            )
            .await?)
    }

    async fn recover_void_order_item(
        &self,
        void_item_id: &str,
        target_order_id: &str,
    ) -> AppResult<()> {
        let body = RecoverVoidItemRequest {
            target_order_id: target_order_id.to_string(),
        };
        Ok(self
            .call_unit(
                Method::POST,
                &["api", "void-items", void_item_id, "recover"],
                &body,
            )
            .await?)
    }
}
