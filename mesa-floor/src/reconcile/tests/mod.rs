use super::*;
use crate::core::{Clock, ManualClock};
use crate::error::FloorError;
use crate::orders::void_window::RECOVERY_WINDOW_MS;
use crate::orders::{MenuDish, SideDish};
use async_trait::async_trait;
use shared::OrderBackend;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    BillableLine, Order, OrderItem, OrderItemStatus, OrderStatus, Table, TableStatus,
    VoidOrderItem,
};
use shared::types::{MINUTE_MS, Timestamp};
use std::sync::Mutex;


/// 2024-05-01T12:00:00Z
const T0: Timestamp = 1_714_564_800_000;
const SEC: i64 = 1_000;

// ========================================================================
// In-memory backend
// ========================================================================

#[derive(Default)]
struct Inner {
    orders: Vec<Order>,
    void_items: Vec<VoidOrderItem>,
    tables: Vec<Table>,
    next_id: u32,
    /// Returned by every read while set
    read_error: Option<AppError>,
    /// Returned by the table read only
    tables_error: Option<AppError>,
    writes: usize,
}

impl Inner {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{}", prefix, self.next_id)
    }

    fn order_mut(&mut self, order_id: &str) -> AppResult<&mut Order> {
        self.orders
            .iter_mut()
            .find(|o| o.order_id == order_id)
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))
    }
}

/// Backend double with server-side semantics; stamps void items with `clock`
struct MemoryBackend {
    inner: Mutex<Inner>,
    clock: ManualClock,
}

impl MemoryBackend {
    fn new(clock: ManualClock) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            clock,
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        f(&mut self.inner.lock().unwrap())
    }

    fn writes(&self) -> usize {
        self.with(|inner| inner.writes)
    }

    fn set_read_error(&self, err: Option<AppError>) {
        self.with(|inner| inner.read_error = err);
    }

    fn set_tables_error(&self, err: Option<AppError>) {
        self.with(|inner| inner.tables_error = err);
    }

    fn stored_order(&self, order_id: &str) -> Order {
        self.with(|inner| {
            inner
                .orders
                .iter()
                .find(|o| o.order_id == order_id)
                .cloned()
                .unwrap()
        })
    }

    fn read_guard(&self) -> AppResult<()> {
        self.with(|inner| match &inner.read_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        })
    }
}

#[async_trait]
impl OrderBackend for MemoryBackend {
    async fn fetch_active_orders(
        &self,
        _restaurant_id: &str,
        statuses: &[OrderStatus],
    ) -> AppResult<Vec<Order>> {
        self.read_guard()?;
        Ok(self.with(|inner| {
            inner
                .orders
                .iter()
                .filter(|o| statuses.contains(&o.status))
                .cloned()
                .collect()
        }))
    }

    async fn fetch_void_items(&self, _restaurant_id: &str) -> AppResult<Vec<VoidOrderItem>> {
        self.read_guard()?;
        Ok(self.with(|inner| inner.void_items.clone()))
    }

    async fn fetch_tables(&self, _restaurant_id: &str) -> AppResult<Vec<Table>> {
        self.read_guard()?;
        self.with(|inner| match &inner.tables_error {
            Some(err) => Err(err.clone()),
            None => Ok(inner.tables.clone()),
        })
    }

    async fn create_order(
        &self,
        table_id: &str,
        _restaurant_id: &str,
        lines: &[BillableLine],
    ) -> AppResult<Order> {
        let now = self.clock.now();
        self.with(|inner| {
            inner.writes += 1;
            let table = inner
                .tables
                .iter()
                .find(|t| t.table_id == table_id)
                .map(|t| t.table_number)
                .ok_or_else(|| AppError::new(ErrorCode::TableNotFound))?;
            let id = inner.next_id("O");
            let mut order = Order::new(id, table, table_id, now);
            order.items = lines.iter().map(OrderItem::from).collect();
            order.recompute_total();
            inner.orders.push(order.clone());
            Ok(order)
        })
    }

    async fn add_items_to_order(&self, order_id: &str, lines: &[BillableLine]) -> AppResult<Order> {
        self.with(|inner| {
            inner.writes += 1;
            let order = inner.order_mut(order_id)?;
            order.items.extend(lines.iter().map(OrderItem::from));
            order.recompute_total();
            Ok(order.clone())
        })
    }

    async fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        elapsed_minutes: Option<i64>,
    ) -> AppResult<()> {
        self.with(|inner| {
            inner.writes += 1;
            let order = inner.order_mut(order_id)?;
            match status {
                OrderStatus::Prepared => order.time_to_prepare = elapsed_minutes,
                OrderStatus::Delivered => order.time_to_deliver = elapsed_minutes,
                OrderStatus::Paid => order.time_to_pay = elapsed_minutes,
                _ => {}
            }
            order.status = status;
            Ok(())
        })
    }

    async fn update_order_item(
        &self,
        order_id: &str,
        menu_item_id: &str,
        observation: &str,
        status: OrderItemStatus,
    ) -> AppResult<()> {
        self.with(|inner| {
            inner.writes += 1;
            let order = inner.order_mut(order_id)?;
            let item = order
                .items
                .iter_mut()
                .find(|i| !i.status.is_removed() && i.matches(menu_item_id, observation))
                .ok_or_else(|| AppError::new(ErrorCode::OrderItemNotFound))?;
            item.status = status;
            Ok(())
        })
    }

    async fn cancel_order_item(
        &self,
        order_id: &str,
        menu_item_id: &str,
        observation: &str,
    ) -> AppResult<()> {
        self.with(|inner| {
            inner.writes += 1;
            let order = inner.order_mut(order_id)?;
            let item = order
                .items
                .iter_mut()
                .find(|i| i.status.is_before_preparation() && i.matches(menu_item_id, observation))
                .ok_or_else(|| AppError::new(ErrorCode::OrderItemNotFound))?;
            item.status = OrderItemStatus::Cancelled;
            order.recompute_total();
            Ok(())
        })
    }

    async fn void_order_item(
        &self,
        order_id: &str,
        menu_item_id: &str,
        observation: &str,
        reason: Option<&str>,
    ) -> AppResult<()> {
        let now = self.clock.now();
        self.with(|inner| {
            inner.writes += 1;
            let void_id = inner.next_id("V");
            let order = inner.order_mut(order_id)?;
            let item = order
                .items
                .iter_mut()
                .find(|i| {
                    matches!(i.status, OrderItemStatus::Prepared | OrderItemStatus::Delivered)
                        && i.matches(menu_item_id, observation)
                })
                .ok_or_else(|| AppError::new(ErrorCode::OrderItemNotFound))?;
            item.status = OrderItemStatus::Void;
            let record = VoidOrderItem {
                void_order_item_id: void_id,
                order_id: Some(order_id.to_string()),
                menu_item_id: item.menu_item_id.clone(),
                name: item.name.clone(),
                price: item.price,
                quantity: item.quantity,
                observation: item.observation.clone(),
                void_reason: reason.map(str::to_string),
                created_at: now,
            };
            order.recompute_total();
            inner.void_items.push(record);
            Ok(())
        })
    }

    async fn recover_void_order_item(
        &self,
        void_item_id: &str,
        target_order_id: &str,
    ) -> AppResult<()> {
        let now = self.clock.now();
        self.with(|inner| {
            inner.writes += 1;
            let idx = inner
                .void_items
                .iter()
                .position(|v| v.void_order_item_id == void_item_id)
                .ok_or_else(|| AppError::new(ErrorCode::VoidItemNotFound))?;
            if now - inner.void_items[idx].created_at >= RECOVERY_WINDOW_MS {
                return Err(AppError::new(ErrorCode::RecoveryExpired));
            }
            if inner.order_mut(target_order_id)?.is_terminal() {
                return Err(AppError::new(ErrorCode::NoActiveOrder));
            }
            let item = inner.void_items.remove(idx);
            let target = inner.order_mut(target_order_id)?;
            let mut line = OrderItem::new(
                item.menu_item_id,
                item.name,
                item.price,
                item.quantity,
                &item.observation,
            );
            line.status = OrderItemStatus::Prepared;
            target.items.push(line);
            target.recompute_total();
            Ok(())
        })
    }
}

// ========================================================================
// Helpers
// ========================================================================

fn line(id: &str, name: &str, price: f64, quantity: i32, status: OrderItemStatus) -> OrderItem {
    let mut item = OrderItem::new(id, name, price, quantity, "");
    item.status = status;
    item
}

/// Tables 4, 7 and 9
///
/// - O1 on table 4, `ordered`: soup (ordered), steak (prepared), tea (pending)
/// - O2 on table 7, `delivered`: bread (delivered)
/// - table 9 is free
fn seeded_backend(clock: ManualClock) -> MemoryBackend {
    let backend = MemoryBackend::new(clock);
    backend.with(|inner| {
        inner.tables = vec![
            Table::new("t-4", 4),
            Table::new("t-7", 7),
            Table::new("t-9", 9),
        ];

        let mut o1 = Order::new("O1", 4, "t-4", T0 - 30 * MINUTE_MS);
        o1.items = vec![
            line("soup", "Soup", 6.0, 1, OrderItemStatus::Ordered),
            line("steak", "Steak", 22.0, 1, OrderItemStatus::Prepared),
            line("tea", "Tea", 2.5, 2, OrderItemStatus::Pending),
        ];
        o1.recompute_total();

        let mut o2 = Order::new("O2", 7, "t-7", T0 - 10 * MINUTE_MS);
        o2.status = OrderStatus::Delivered;
        o2.items = vec![line("bread", "Bread", 3.0, 1, OrderItemStatus::Delivered)];
        o2.recompute_total();

        inner.orders = vec![o1, o2];
    });
    backend
}

/// Facade over the seeded backend, already refreshed, clock at `T0`
async fn seeded_facade() -> (ReconciliationFacade<MemoryBackend, ManualClock>, ManualClock) {
    let clock = ManualClock::new(T0);
    let backend = seeded_backend(clock.clone());
    let mut facade =
        ReconciliationFacade::with_clock(backend, clock.clone(), "r-1", FloorSession::new());
    facade.refresh().await.unwrap();
    (facade, clock)
}

fn status_of(facade: &ReconciliationFacade<MemoryBackend, ManualClock>, table_id: &str) -> TableStatus {
    facade
        .table_views()
        .into_iter()
        .find(|v| v.table_id == table_id)
        .map(|v| v.status)
        .unwrap()
}
