//! Floor state and session state
//!
//! [`FloorState`] mirrors the three backend collections and is only written
//! through sequenced `apply_*` calls. [`FloorSession`] holds what belongs to
//! this client alone: the cart, the checkout flags and the table layout.

use super::sequencer::{ReadKind, ReadSequencer, ReadTicket};
use crate::error::FloorResult;
use crate::orders::Cart;
use crate::tables::{CheckoutSet, LayoutStore, TableLayout, TableShape};
use shared::models::{Order, Table, VoidOrderItem};

/// Last applied snapshot of orders, void items and tables
#[derive(Debug, Default)]
pub struct FloorState {
    orders: Vec<Order>,
    void_items: Vec<VoidOrderItem>,
    tables: Vec<Table>,
    sequencer: ReadSequencer,
}

impl FloorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn void_items(&self) -> &[VoidOrderItem] {
        &self.void_items
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn order(&self, order_id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.order_id == order_id)
    }

    pub fn void_item(&self, void_order_item_id: &str) -> Option<&VoidOrderItem> {
        self.void_items
            .iter()
            .find(|v| v.void_order_item_id == void_order_item_id)
    }

    pub fn table(&self, table_id: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.table_id == table_id)
    }

    /// Active orders on a table, oldest first
    pub fn active_orders_for_table(&self, table_id: &str) -> Vec<&Order> {
        let mut orders: Vec<&Order> = self
            .orders
            .iter()
            .filter(|o| o.status.is_active() && o.table_id == table_id)
            .collect();
        orders.sort_by_key(|o| o.created_at);
        orders
    }

    pub fn issue(&mut self, kind: ReadKind) -> ReadTicket {
        self.sequencer.issue(kind)
    }

    pub fn apply_orders(&mut self, ticket: ReadTicket, orders: Vec<Order>) -> bool {
        debug_assert_eq!(ticket.kind, ReadKind::Orders);
        if !self.sequencer.accept(ticket) {
            return false;
        }
        self.orders = orders;
        true
    }

    pub fn apply_void_items(&mut self, ticket: ReadTicket, items: Vec<VoidOrderItem>) -> bool {
        debug_assert_eq!(ticket.kind, ReadKind::VoidItems);
        if !self.sequencer.accept(ticket) {
            return false;
        }
        self.void_items = items;
        true
    }

    pub fn apply_tables(&mut self, ticket: ReadTicket, tables: Vec<Table>) -> bool {
        debug_assert_eq!(ticket.kind, ReadKind::Tables);
        if !self.sequencer.accept(ticket) {
            return false;
        }
        self.tables = tables;
        true
    }
}

/// Client-owned session state (会话状态)
#[derive(Debug, Default)]
pub struct FloorSession {
    pub cart: Cart,
    pub checkout: CheckoutSet,
    layout: TableLayout,
    layout_store: Option<LayoutStore>,
}

impl FloorSession {
    /// Session with an in-memory layout
    pub fn new() -> Self {
        Self::default()
    }

    /// Session whose layout is loaded from and saved to `store`
    pub fn with_layout_store(store: LayoutStore) -> FloorResult<Self> {
        let layout = store.load()?;
        Ok(Self {
            layout,
            layout_store: Some(store),
            ..Self::default()
        })
    }

    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }

    fn persist_layout(&self) -> FloorResult<()> {
        if let Some(store) = &self.layout_store {
            store.save(&self.layout)?;
        }
        Ok(())
    }

    pub fn move_table(&mut self, table_id: &str, x: f64, y: f64) -> FloorResult<()> {
        self.layout.move_table(table_id, x, y)?;
        self.persist_layout()
    }

    pub fn set_table_shape(&mut self, table_id: &str, shape: TableShape) -> FloorResult<()> {
        self.layout.set_shape(table_id, shape)?;
        self.persist_layout()
    }

    pub fn lock_layout(&mut self) -> FloorResult<()> {
        self.layout.lock();
        self.persist_layout()
    }

    pub fn unlock_layout(&mut self) -> FloorResult<()> {
        self.layout.unlock();
        self.persist_layout()
    }
}
