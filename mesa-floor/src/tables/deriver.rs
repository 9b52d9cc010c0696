//! Table status derivation
//!
//! A table's displayed status is a projection of the active orders that
//! reference it. The status the backend reports is ignored.

use serde::Serialize;
use shared::models::{Order, Table, TableStatus};
use shared::money;
use std::collections::HashSet;

/// Occupancy from the active order set
///
/// Pure; recompute after every fetch.
pub fn derive_status(table: &Table, active_orders: &[Order]) -> TableStatus {
    let occupied = active_orders
        .iter()
        .any(|o| o.status.is_active() && o.table_id == table.table_id);

    if occupied {
        TableStatus::Occupied
    } else {
        TableStatus::Available
    }
}

/// Tables with a payment flow in progress (结账中)
///
/// Set only by an explicit checkout action; never inferred from orders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutSet {
    tables: HashSet<String>,
}

impl CheckoutSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, table_id: &str) {
        self.tables.insert(table_id.to_string());
    }

    /// Returns whether the table was in checkout
    pub fn clear(&mut self, table_id: &str) -> bool {
        self.tables.remove(table_id)
    }

    pub fn contains(&self, table_id: &str) -> bool {
        self.tables.contains(table_id)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Drop flags for tables that no longer have an active order
    pub fn retain_active(&mut self, active_orders: &[Order]) {
        self.tables.retain(|table_id| {
            active_orders
                .iter()
                .any(|o| o.status.is_active() && &o.table_id == table_id)
        });
    }
}

/// A table as displayed on the floor plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub table_id: String,
    pub table_number: i32,
    pub qr_code: Option<String>,
    pub status: TableStatus,
    /// Active orders on this table, oldest first
    pub order_ids: Vec<String>,
    /// Sum of the active orders' totals
    pub amount_due: f64,
}

/// Derive every table, layering the checkout flag over occupancy
///
/// `processing_payment` only applies while the table is occupied.
pub fn derive_all(tables: &[Table], active_orders: &[Order], checkout: &CheckoutSet) -> Vec<TableView> {
    tables
        .iter()
        .map(|table| {
            let mut orders: Vec<&Order> = active_orders
                .iter()
                .filter(|o| o.status.is_active() && o.table_id == table.table_id)
                .collect();
            orders.sort_by_key(|o| o.created_at);

            let mut status = derive_status(table, active_orders);
            if status == TableStatus::Occupied && checkout.contains(&table.table_id) {
                status = TableStatus::ProcessingPayment;
            }

            TableView {
                table_id: table.table_id.clone(),
                table_number: table.table_number,
                qr_code: table.qr_code.clone(),
                status,
                order_ids: orders.iter().map(|o| o.order_id.clone()).collect(),
                amount_due: money::sum_lines(orders.iter().map(|o| (o.total_price, 1))),
            }
        })
        .collect()
}
