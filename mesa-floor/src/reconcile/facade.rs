//! ReconciliationFacade - 楼面操作入口
//!
//! Every mutating action follows the same shape:
//!
//! 1. validate locally against the last applied state (no network call on refusal)
//! 2. call the backend
//! 3. refetch orders, void items and tables and apply all three before returning
//!
//! Table statuses are never stored; [`ReconciliationFacade::table_views`]
//! derives them from the applied orders every time.

use super::sequencer::ReadKind;
use super::session::{FloorSession, FloorState};
use crate::core::{Clock, SystemClock};
use crate::error::{FloorError, FloorResult};
use crate::orders::lifecycle;
use crate::orders::void_window::{self, VoidCountdown};
use crate::tables::{TableView, derive_all};
use shared::OrderBackend;
use shared::models::{Order, OrderItemStatus, OrderStatus, VoidOrderItem};
use shared::serde_helpers::normalize_observation;
use std::collections::HashSet;

pub struct ReconciliationFacade<B: OrderBackend, C: Clock = SystemClock> {
    backend: B,
    clock: C,
    restaurant_id: String,
    state: FloorState,
    session: FloorSession,
}

impl<B: OrderBackend> ReconciliationFacade<B, SystemClock> {
    pub fn new(backend: B, restaurant_id: impl Into<String>, session: FloorSession) -> Self {
        Self::with_clock(backend, SystemClock, restaurant_id, session)
    }
}

impl<B: OrderBackend, C: Clock> ReconciliationFacade<B, C> {
    pub fn with_clock(
        backend: B,
        clock: C,
        restaurant_id: impl Into<String>,
        session: FloorSession,
    ) -> Self {
        Self {
            backend,
            clock,
            restaurant_id: restaurant_id.into(),
            state: FloorState::new(),
            session,
        }
    }

    pub fn restaurant_id(&self) -> &str {
        &self.restaurant_id
    }

    pub fn state(&self) -> &FloorState {
        &self.state
    }

    pub fn session(&self) -> &FloorSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut FloorSession {
        &mut self.session
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Refetch all three collections concurrently
    ///
    /// Either every accepted slice is applied or, if any read fails, none is.
    pub async fn refresh(&mut self) -> FloorResult<()> {
        let orders_ticket = self.state.issue(ReadKind::Orders);
        let voids_ticket = self.state.issue(ReadKind::VoidItems);
        let tables_ticket = self.state.issue(ReadKind::Tables);

        let (orders, void_items, tables) = futures::join!(
            self.backend
                .fetch_active_orders(&self.restaurant_id, &OrderStatus::ACTIVE),
            self.backend.fetch_void_items(&self.restaurant_id),
            self.backend.fetch_tables(&self.restaurant_id),
        );

        let (orders, void_items, tables) = match (orders, void_items, tables) {
            (Ok(o), Ok(v), Ok(t)) => (o, v, t),
            (o, v, t) => {
                let err = [o.err(), v.err(), t.err()]
                    .into_iter()
                    .flatten()
                    .map(FloorError::from)
                    // 订阅失效优先
                    .reduce(|first, next| {
                        if next.requires_billing_redirect() { next } else { first }
                    })
                    .unwrap_or_else(|| FloorError::Network("refresh failed".to_string()));
                tracing::warn!(error = %err, "refresh failed, keeping previous state");
                return Err(err);
            }
        };

        self.state.apply_orders(orders_ticket, orders);
        self.state.apply_void_items(voids_ticket, void_items);
        self.state.apply_tables(tables_ticket, tables);
        self.session.checkout.retain_active(self.state.orders());

        tracing::info!(
            orders = self.state.orders().len(),
            void_items = self.state.void_items().len(),
            tables = self.state.tables().len(),
            "floor refreshed"
        );
        Ok(())
    }

    fn open_order(&self, order_id: &str) -> FloorResult<&Order> {
        self.state
            .order(order_id)
            .ok_or_else(|| FloorError::NotFound(format!("order {}", order_id)))
    }

    /// Submit the cart as a new order on `table_id`
    ///
    /// The cart is cleared only once the backend has accepted the order.
    pub async fn place_order(&mut self, table_id: &str) -> FloorResult<Order> {
        if table_id.trim().is_empty() {
            return Err(FloorError::Validation("no table selected".to_string()));
        }
        if self.session.cart.is_empty() {
            return Err(FloorError::Validation("cart is empty".to_string()));
        }
        if !self.state.tables().is_empty() && self.state.table(table_id).is_none() {
            return Err(FloorError::NotFound(format!("table {}", table_id)));
        }

        let lines = self.session.cart.explode();
        let order = self
            .backend
            .create_order(table_id, &self.restaurant_id, &lines)
            .await?;
        self.session.cart.clear();
        tracing::info!(order_id = %order.order_id, table_id = %table_id, lines = lines.len(), "order placed");

        self.refresh().await?;
        Ok(order)
    }

    /// Append the cart to an existing open order
    pub async fn add_items(&mut self, order_id: &str) -> FloorResult<Order> {
        if self.session.cart.is_empty() {
            return Err(FloorError::Validation("cart is empty".to_string()));
        }
        lifecycle::check_accepts_items(self.open_order(order_id)?)?;

        let lines = self.session.cart.explode();
        let order = self.backend.add_items_to_order(order_id, &lines).await?;
        self.session.cart.clear();
        tracing::info!(order_id = %order_id, lines = lines.len(), "items added");

        self.refresh().await?;
        Ok(order)
    }

    /// Move an order to `status`, recording the phase duration
    ///
    /// Returns the order as it stands right after the transition.
    pub async fn change_status(
        &mut self,
        order_id: &str,
        status: OrderStatus,
        elapsed_minutes: Option<i64>,
    ) -> FloorResult<Order> {
        let updated = match lifecycle::transition(self.open_order(order_id)?, status, elapsed_minutes) {
            Ok(updated) => updated,
            Err(e) => {
                tracing::debug!(order_id = %order_id, target = %status, error = %e, "transition refused");
                return Err(e);
            }
        };

        self.backend
            .update_order_status(order_id, status, elapsed_minutes)
            .await?;
        tracing::info!(order_id = %order_id, status = %status, ?elapsed_minutes, "order status changed");

        if status.is_terminal() && self.session.checkout.clear(&updated.table_id) {
            tracing::debug!(table_id = %updated.table_id, "checkout cleared");
        }

        self.refresh().await?;
        Ok(updated)
    }

    /// Kitchen/floor progress on a single item
    pub async fn update_item(
        &mut self,
        order_id: &str,
        menu_item_id: &str,
        observation: &str,
        status: OrderItemStatus,
    ) -> FloorResult<()> {
        lifecycle::update_item(self.open_order(order_id)?, menu_item_id, observation, status)?;
        let observation = normalize_observation(observation);

        self.backend
            .update_order_item(order_id, menu_item_id, &observation, status)
            .await?;
        tracing::info!(order_id = %order_id, menu_item_id = %menu_item_id, status = %status, "item updated");

        self.refresh().await
    }

    /// Cancel an item nothing was cooked for
    pub async fn cancel_item(
        &mut self,
        order_id: &str,
        menu_item_id: &str,
        observation: &str,
    ) -> FloorResult<()> {
        lifecycle::cancel_item(self.open_order(order_id)?, menu_item_id, observation)?;
        let observation = normalize_observation(observation);

        self.backend
            .cancel_order_item(order_id, menu_item_id, &observation)
            .await?;
        tracing::info!(order_id = %order_id, menu_item_id = %menu_item_id, "item cancelled");

        self.refresh().await
    }

    /// Void a prepared or delivered item into the recovery pool
    pub async fn void_item(
        &mut self,
        order_id: &str,
        menu_item_id: &str,
        observation: &str,
        reason: Option<&str>,
    ) -> FloorResult<VoidOrderItem> {
        let now = self.clock.now();
        let (_, projected) = void_window::void_item(
            self.open_order(order_id)?,
            menu_item_id,
            observation,
            reason,
            uuid::Uuid::new_v4().to_string(),
            now,
        )?;

        let known: HashSet<String> = self
            .state
            .void_items()
            .iter()
            .map(|v| v.void_order_item_id.clone())
            .collect();

        self.backend
            .void_order_item(order_id, menu_item_id, &projected.observation, reason)
            .await?;
        tracing::info!(order_id = %order_id, menu_item_id = %menu_item_id, "item voided");

        self.refresh().await?;

        // 优先返回后端生成的记录
        let created = self
            .state
            .void_items()
            .iter()
            .filter(|v| !known.contains(&v.void_order_item_id))
            .filter(|v| v.order_id.as_deref().is_none_or(|id| id == order_id))
            .filter(|v| v.name == projected.name && v.observation == projected.observation)
            .max_by_key(|v| v.created_at)
            .cloned();
        Ok(created.unwrap_or(projected))
    }

    /// Reattach a void item to `target_order_id`
    ///
    /// The window is checked against the clock now, not against whatever
    /// countdown was last displayed.
    pub async fn recover_item(
        &mut self,
        void_order_item_id: &str,
        target_order_id: &str,
    ) -> FloorResult<Order> {
        let now = self.clock.now();
        let item = self
            .state
            .void_item(void_order_item_id)
            .ok_or_else(|| FloorError::NotFound(format!("void item {}", void_order_item_id)))?;

        if let Err(e) = void_window::check_recovery(item, self.state.order(target_order_id), now) {
            tracing::warn!(void_item_id = %void_order_item_id, target = %target_order_id, error = %e, "recovery refused");
            return Err(e);
        }
        let target = self.open_order(target_order_id)?;
        let updated = void_window::recover(item, target, now)?;

        self.backend
            .recover_void_order_item(void_order_item_id, target_order_id)
            .await?;
        tracing::info!(void_item_id = %void_order_item_id, order_id = %target_order_id, "void item recovered");

        self.refresh().await?;
        Ok(updated)
    }

    /// Recover into the oldest active order on `table_id`
    pub async fn recover_to_table(
        &mut self,
        void_order_item_id: &str,
        table_id: &str,
    ) -> FloorResult<Order> {
        let now = self.clock.now();
        let item = self
            .state
            .void_item(void_order_item_id)
            .ok_or_else(|| FloorError::NotFound(format!("void item {}", void_order_item_id)))?;

        let target = self
            .state
            .active_orders_for_table(table_id)
            .into_iter()
            .find(|o| item.order_id.as_deref() != Some(o.order_id.as_str()))
            .map(|o| o.order_id.clone());

        match target {
            Some(order_id) => self.recover_item(void_order_item_id, &order_id).await,
            None => {
                // 过期优先于无目标订单
                void_window::check_recovery(item, None, now)?;
                Err(FloorError::NoActiveOrder(format!("table {}", table_id)))
            }
        }
    }

    /// Mark a table as processing payment
    pub fn begin_checkout(&mut self, table_id: &str) -> FloorResult<()> {
        if self.state.active_orders_for_table(table_id).is_empty() {
            return Err(FloorError::NoActiveOrder(format!("table {}", table_id)));
        }
        self.session.checkout.begin(table_id);
        tracing::info!(table_id = %table_id, "checkout started");
        Ok(())
    }

    /// Abandon the payment flow; returns whether one was in progress
    pub fn cancel_checkout(&mut self, table_id: &str) -> bool {
        let cleared = self.session.checkout.clear(table_id);
        if cleared {
            tracing::info!(table_id = %table_id, "checkout cancelled");
        }
        cleared
    }

    pub fn table_views(&self) -> Vec<TableView> {
        derive_all(
            self.state.tables(),
            self.state.orders(),
            &self.session.checkout,
        )
    }

    pub fn void_countdowns(&self) -> Vec<VoidCountdown> {
        void_window::countdowns(self.state.void_items(), self.clock.now())
    }
}
