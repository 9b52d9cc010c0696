//! Void items and their recovery window
//!
//! A prepared or delivered line that has to come off a bill is voided instead
//! of cancelled. The resulting [`VoidOrderItem`] sits in a pool for
//! [`RECOVERY_WINDOW_MS`] during which it can be reattached to another active
//! order. Eligibility is always judged against the time of the call; the
//! countdown shown on screen is advisory.

use crate::error::{FloorError, FloorResult};
use crate::orders::lifecycle;
use serde::Serialize;
use shared::models::{Order, OrderItem, OrderItemStatus, VoidOrderItem};
use shared::types::{MINUTE_MS, Timestamp};

/// 作废菜品可恢复时长: 20 分钟
pub const RECOVERY_WINDOW_MS: i64 = 20 * MINUTE_MS;

/// Recoverable while strictly less than the window has passed
pub fn is_recoverable(created_at: Timestamp, now: Timestamp) -> bool {
    now - created_at < RECOVERY_WINDOW_MS
}

/// Milliseconds left in the window, floored at 0
pub fn remaining_ms(created_at: Timestamp, now: Timestamp) -> i64 {
    (created_at + RECOVERY_WINDOW_MS - now).clamp(0, RECOVERY_WINDOW_MS)
}

/// Only items something was cooked for can be voided
pub fn check_voidable(status: OrderItemStatus) -> FloorResult<()> {
    match status {
        OrderItemStatus::Prepared | OrderItemStatus::Delivered => Ok(()),
        OrderItemStatus::Ordered | OrderItemStatus::Pending => {
            Err(FloorError::InvalidTransition(format!(
                "cannot void a {} item, cancel it instead",
                status
            )))
        }
        OrderItemStatus::Void | OrderItemStatus::Cancelled => Err(
            FloorError::InvalidTransition(format!("item is already {}", status)),
        ),
    }
}

/// Void one line
///
/// Returns the origin order with the line marked `void` and its total
/// recomputed, plus the pool record stamped at `now`.
pub fn void_item(
    order: &Order,
    menu_item_id: &str,
    observation: &str,
    reason: Option<&str>,
    void_order_item_id: impl Into<String>,
    now: Timestamp,
) -> FloorResult<(Order, VoidOrderItem)> {
    lifecycle::check_accepts_items(order)?;
    let idx = lifecycle::find_item(order, menu_item_id, observation, |s| {
        check_voidable(s).is_ok()
    })?;
    check_voidable(order.items[idx].status)?;

    let mut updated = order.clone();
    updated.items[idx].status = OrderItemStatus::Void;
    updated.recompute_total();

    let line = &order.items[idx];
    let record = VoidOrderItem {
        void_order_item_id: void_order_item_id.into(),
        order_id: Some(order.order_id.clone()),
        menu_item_id: line.menu_item_id.clone(),
        name: line.name.clone(),
        price: line.price,
        quantity: line.quantity,
        observation: line.observation.clone(),
        void_reason: reason.map(str::to_string),
        created_at: now,
    };
    Ok((updated, record))
}

/// Check a recovery request
///
/// Expiry is checked first so an expired item reports expiry whatever the
/// target. The target must be open and must not be the order the item was
/// voided from.
pub fn check_recovery(
    item: &VoidOrderItem,
    target: Option<&Order>,
    now: Timestamp,
) -> FloorResult<()> {
    if !is_recoverable(item.created_at, now) {
        return Err(FloorError::RecoveryExpired(item.void_order_item_id.clone()));
    }

    let target = target.ok_or_else(|| {
        FloorError::NoActiveOrder(format!(
            "no target order for void item {}",
            item.void_order_item_id
        ))
    })?;
    if target.is_terminal() {
        return Err(FloorError::NoActiveOrder(format!(
            "order {} is already {}",
            target.order_id, target.status
        )));
    }
    if item.order_id.as_deref() == Some(target.order_id.as_str()) {
        return Err(FloorError::NoActiveOrder(format!(
            "void item {} cannot return to its origin order {}",
            item.void_order_item_id, target.order_id
        )));
    }
    Ok(())
}

/// Reattach a void item to `target`
///
/// The recovered line enters as `prepared`, since the dish already exists.
pub fn recover(item: &VoidOrderItem, target: &Order, now: Timestamp) -> FloorResult<Order> {
    check_recovery(item, Some(target), now)?;

    let mut line = OrderItem::new(
        item.menu_item_id.clone(),
        item.name.clone(),
        item.price,
        item.quantity,
        &item.observation,
    );
    line.status = OrderItemStatus::Prepared;

    let mut updated = target.clone();
    updated.items.push(line);
    updated.recompute_total();
    Ok(updated)
}

/// Display row for the void pool
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoidCountdown {
    pub void_order_item_id: String,
    pub name: String,
    pub remaining_ms: i64,
    pub recoverable: bool,
}

impl VoidCountdown {
    /// `mm:ss` left in the window
    pub fn label(&self) -> String {
        let secs = self.remaining_ms / 1000;
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }
}

/// Countdown rows for the pool at `now`, soonest to expire first
pub fn countdowns(items: &[VoidOrderItem], now: Timestamp) -> Vec<VoidCountdown> {
    let mut rows: Vec<VoidCountdown> = items
        .iter()
        .map(|item| VoidCountdown {
            void_order_item_id: item.void_order_item_id.clone(),
            name: item.name.clone(),
            remaining_ms: remaining_ms(item.created_at, now),
            recoverable: is_recoverable(item.created_at, now),
        })
        .collect();
    rows.sort_by_key(|row| row.remaining_ms);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::OrderStatus;

    const T: Timestamp = 1_714_564_800_000;
    const SEC: i64 = 1_000;

    fn line(id: &str, price: f64, status: OrderItemStatus) -> OrderItem {
        let mut item = OrderItem::new(id, format!("Dish {}", id), price, 1, "");
        item.status = status;
        item
    }

    fn origin() -> Order {
        let mut order = Order::new("O1", 4, "t-4", T - 30 * MINUTE_MS);
        order.items = vec![
            line("soup", 6.0, OrderItemStatus::Ordered),
            line("steak", 22.0, OrderItemStatus::Prepared),
            line("wine", 8.0, OrderItemStatus::Delivered),
            line("tea", 2.0, OrderItemStatus::Pending),
        ];
        order.recompute_total();
        order
    }

    fn target() -> Order {
        let mut order = Order::new("O2", 7, "t-7", T);
        order.items = vec![line("bread", 3.0, OrderItemStatus::Delivered)];
        order.recompute_total();
        order
    }

    fn voided_steak() -> VoidOrderItem {
        void_item(&origin(), "steak", "", Some("wrong table"), "v-1", T)
            .unwrap()
            .1
    }

    #[test]
    fn test_void_prepared_item() {
        let (order, record) = void_item(&origin(), "steak", "", Some("wrong table"), "v-1", T).unwrap();
        assert_eq!(order.items[1].status, OrderItemStatus::Void);
        assert_eq!(order.total_price, 16.0);
        assert!(lifecycle::check_total_invariant(&order));

        assert_eq!(record.void_order_item_id, "v-1");
        assert_eq!(record.order_id.as_deref(), Some("O1"));
        assert_eq!(record.price, 22.0);
        assert_eq!(record.created_at, T);
        assert_eq!(record.void_reason.as_deref(), Some("wrong table"));
    }

    #[test]
    fn test_void_delivered_item() {
        let (order, _) = void_item(&origin(), "wine", "", None, "v-2", T).unwrap();
        assert_eq!(order.items[2].status, OrderItemStatus::Void);
    }

    #[test]
    fn test_void_rejected_before_preparation() {
        for id in ["soup", "tea"] {
            assert!(matches!(
                void_item(&origin(), id, "", None, "v-x", T),
                Err(FloorError::InvalidTransition(_))
            ));
        }
    }

    #[test]
    fn test_void_twice_is_not_found() {
        let (order, _) = void_item(&origin(), "steak", "", None, "v-1", T).unwrap();
        assert!(matches!(
            void_item(&order, "steak", "", None, "v-2", T),
            Err(FloorError::NotFound(_))
        ));
    }

    #[test]
    fn test_recover_just_inside_window() {
        let now = T + 19 * MINUTE_MS + 59 * SEC;
        let updated = recover(&voided_steak(), &target(), now).unwrap();
        assert_eq!(updated.items.len(), 2);
        assert_eq!(updated.items[1].menu_item_id, "steak");
        assert_eq!(updated.items[1].status, OrderItemStatus::Prepared);
        assert_eq!(updated.total_price, 25.0);
    }

    #[test]
    fn test_recover_just_after_window() {
        let now = T + 20 * MINUTE_MS + SEC;
        assert!(matches!(
            recover(&voided_steak(), &target(), now),
            Err(FloorError::RecoveryExpired(_))
        ));
    }

    #[test]
    fn test_window_boundary_is_expired() {
        assert!(is_recoverable(T, T + RECOVERY_WINDOW_MS - 1));
        assert!(!is_recoverable(T, T + RECOVERY_WINDOW_MS));
    }

    #[test]
    fn test_expiry_wins_over_bad_target() {
        let now = T + 25 * MINUTE_MS;
        let item = voided_steak();
        assert!(matches!(
            check_recovery(&item, None, now),
            Err(FloorError::RecoveryExpired(_))
        ));
        let mut paid = target();
        paid.status = OrderStatus::Paid;
        assert!(matches!(
            check_recovery(&item, Some(&paid), now),
            Err(FloorError::RecoveryExpired(_))
        ));
    }

    #[test]
    fn test_recover_needs_open_foreign_target() {
        let item = voided_steak();
        assert!(matches!(
            check_recovery(&item, None, T),
            Err(FloorError::NoActiveOrder(_))
        ));

        let mut canceled = target();
        canceled.status = OrderStatus::Canceled;
        assert!(matches!(
            recover(&item, &canceled, T),
            Err(FloorError::NoActiveOrder(_))
        ));

        assert!(matches!(
            recover(&item, &origin(), T),
            Err(FloorError::NoActiveOrder(_))
        ));
    }

    #[test]
    fn test_countdowns() {
        let mut older = voided_steak();
        older.void_order_item_id = "v-0".to_string();
        older.created_at = T - 25 * MINUTE_MS;
        let fresh = voided_steak();

        let rows = countdowns(&[fresh, older], T + 5 * MINUTE_MS);
        assert_eq!(rows[0].void_order_item_id, "v-0");
        assert_eq!(rows[0].remaining_ms, 0);
        assert!(!rows[0].recoverable);
        assert_eq!(rows[1].remaining_ms, 15 * MINUTE_MS);
        assert!(rows[1].recoverable);
        assert_eq!(rows[1].label(), "15:00");
    }

    #[test]
    fn test_remaining_never_exceeds_window() {
        // server clock ahead of ours
        assert_eq!(remaining_ms(T + MINUTE_MS, T), RECOVERY_WINDOW_MS);
    }
}
