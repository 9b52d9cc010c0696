//! Order and order-item state machine
//!
//! Order level: `ordered → prepared → delivered → paid`, plus `canceled` from
//! any non-terminal state. `ordered → delivered` is allowed for orders whose
//! items went out without a separate prepared step. Nothing moves backward
//! and `paid` is only reachable from `delivered`.
//!
//! Item level runs independently of the order: `ordered/pending → prepared →
//! delivered`, with `cancelled` (before preparation) and `void` (after) as side
//! branches handled by [`cancel_item`] and [`crate::orders::void_window`].
//!
//! Every function here is pure. The facade runs them before calling the
//! backend so illegal requests never leave the process.

use crate::error::{FloorError, FloorResult};
use shared::models::{Order, OrderItemStatus, OrderStatus};
use shared::money;

/// Check an order-level transition without touching the order
pub fn check_transition(from: OrderStatus, to: OrderStatus) -> FloorResult<()> {
    if from.is_terminal() {
        return Err(FloorError::InvalidTransition(format!(
            "order is already {}",
            from
        )));
    }

    let allowed = matches!(
        (from, to),
        (_, OrderStatus::Canceled)
            | (OrderStatus::Ordered, OrderStatus::Prepared)
            | (OrderStatus::Ordered, OrderStatus::Delivered)
            | (OrderStatus::Prepared, OrderStatus::Delivered)
            | (OrderStatus::Delivered, OrderStatus::Paid)
    );
    if !allowed {
        return Err(FloorError::InvalidTransition(format!(
            "{} -> {} is not allowed",
            from, to
        )));
    }
    Ok(())
}

/// Apply an order-level transition, recording the phase duration
///
/// `elapsed_minutes` is mandatory for `prepared` and recorded when given for
/// `delivered` / `paid`.
pub fn transition(
    order: &Order,
    target: OrderStatus,
    elapsed_minutes: Option<i64>,
) -> FloorResult<Order> {
    check_transition(order.status, target)?;

    if let Some(minutes) = elapsed_minutes
        && minutes < 0
    {
        return Err(FloorError::Validation(format!(
            "elapsed minutes must not be negative, got {}",
            minutes
        )));
    }

    let mut updated = order.clone();
    match target {
        OrderStatus::Prepared => {
            let minutes = elapsed_minutes.ok_or_else(|| {
                FloorError::Validation("elapsed minutes required to mark prepared".to_string())
            })?;
            updated.time_to_prepare = Some(minutes);
        }
        OrderStatus::Delivered => {
            if elapsed_minutes.is_some() {
                updated.time_to_deliver = elapsed_minutes;
            }
        }
        OrderStatus::Paid => {
            if elapsed_minutes.is_some() {
                updated.time_to_pay = elapsed_minutes;
            }
        }
        OrderStatus::Ordered | OrderStatus::Canceled => {}
    }
    updated.status = target;
    Ok(updated)
}

/// Locate a live line by `(menu_item_id, observation)`
///
/// Void and cancelled lines are skipped. Among the remaining matches the
/// first one accepted by `eligible` wins, falling back to the first match so
/// the caller reports the real status instead of "not found".
pub fn find_item(
    order: &Order,
    menu_item_id: &str,
    observation: &str,
    eligible: impl Fn(OrderItemStatus) -> bool,
) -> FloorResult<usize> {
    let live: Vec<usize> = order
        .items
        .iter()
        .enumerate()
        .filter(|(_, item)| !item.status.is_removed() && item.matches(menu_item_id, observation))
        .map(|(idx, _)| idx)
        .collect();

    live.iter()
        .copied()
        .find(|&idx| eligible(order.items[idx].status))
        .or_else(|| live.first().copied())
        .ok_or_else(|| {
            FloorError::NotFound(format!(
                "item {} ({}) in order {}",
                menu_item_id, observation, order.order_id
            ))
        })
}

fn ensure_open(order: &Order) -> FloorResult<()> {
    if order.is_terminal() {
        return Err(FloorError::InvalidTransition(format!(
            "order {} is already {}",
            order.order_id, order.status
        )));
    }
    Ok(())
}

/// Check an item-level progress change (kitchen / floor updates)
pub fn check_item_update(from: OrderItemStatus, to: OrderItemStatus) -> FloorResult<()> {
    match (from.rank(), to.rank()) {
        (None, _) => Err(FloorError::InvalidTransition(format!(
            "item is already {}",
            from
        ))),
        (_, None) => Err(FloorError::InvalidTransition(format!(
            "use cancel or void to mark an item {}",
            to
        ))),
        (Some(a), Some(b)) if b <= a => Err(FloorError::InvalidTransition(format!(
            "item {} -> {} is not allowed",
            from, to
        ))),
        _ => Ok(()),
    }
}

/// Move one item forward, independently of the order status
pub fn update_item(
    order: &Order,
    menu_item_id: &str,
    observation: &str,
    status: OrderItemStatus,
) -> FloorResult<Order> {
    ensure_open(order)?;
    let idx = find_item(order, menu_item_id, observation, |s| {
        check_item_update(s, status).is_ok()
    })?;
    check_item_update(order.items[idx].status, status)?;

    let mut updated = order.clone();
    updated.items[idx].status = status;
    Ok(updated)
}

/// Cancellation is only for items nothing was cooked for
pub fn check_cancel(status: OrderItemStatus) -> FloorResult<()> {
    if status.is_before_preparation() {
        Ok(())
    } else {
        Err(FloorError::InvalidTransition(format!(
            "cannot cancel a {} item",
            status
        )))
    }
}

/// Cancel one item and drop it from the total
pub fn cancel_item(order: &Order, menu_item_id: &str, observation: &str) -> FloorResult<Order> {
    ensure_open(order)?;
    let idx = find_item(order, menu_item_id, observation, |s| {
        s.is_before_preparation()
    })?;
    check_cancel(order.items[idx].status)?;

    let mut updated = order.clone();
    updated.items[idx].status = OrderItemStatus::Cancelled;
    updated.recompute_total();
    Ok(updated)
}

/// Lines can only be appended to orders that are still open
pub fn check_accepts_items(order: &Order) -> FloorResult<()> {
    ensure_open(order)
}

/// `total_price` agrees with the billable lines to the cent
pub fn check_total_invariant(order: &Order) -> bool {
    money::money_eq(order.total_price, order.billable_total())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::OrderItem;

    fn line(id: &str, price: f64, qty: i32, status: OrderItemStatus) -> OrderItem {
        let mut item = OrderItem::new(id, format!("Dish {}", id), price, qty, "");
        item.status = status;
        item
    }

    fn order_on_table_4() -> Order {
        let mut order = Order::new("O1", 4, "t-4", 0);
        order.items = vec![
            line("soup", 6.0, 1, OrderItemStatus::Ordered),
            line("steak", 22.0, 1, OrderItemStatus::Prepared),
            line("wine", 8.5, 2, OrderItemStatus::Pending),
        ];
        order.recompute_total();
        order
    }

    #[test]
    fn test_happy_path_records_durations() {
        let order = order_on_table_4();
        let prepared = transition(&order, OrderStatus::Prepared, Some(12)).unwrap();
        assert_eq!(prepared.status, OrderStatus::Prepared);
        assert_eq!(prepared.time_to_prepare, Some(12));

        let delivered = transition(&prepared, OrderStatus::Delivered, Some(3)).unwrap();
        assert_eq!(delivered.time_to_deliver, Some(3));

        let paid = transition(&delivered, OrderStatus::Paid, Some(40)).unwrap();
        assert_eq!(paid.status, OrderStatus::Paid);
        assert_eq!(paid.time_to_pay, Some(40));
        assert_eq!(paid.time_to_prepare, Some(12));
    }

    #[test]
    fn test_prepared_requires_elapsed_minutes() {
        let order = order_on_table_4();
        assert!(matches!(
            transition(&order, OrderStatus::Prepared, None),
            Err(FloorError::Validation(_))
        ));
        assert!(matches!(
            transition(&order, OrderStatus::Prepared, Some(-1)),
            Err(FloorError::Validation(_))
        ));
    }

    #[test]
    fn test_ordered_straight_to_delivered() {
        let order = order_on_table_4();
        let delivered = transition(&order, OrderStatus::Delivered, None).unwrap();
        assert_eq!(delivered.status, OrderStatus::Delivered);
        assert_eq!(delivered.time_to_deliver, None);
    }

    #[test]
    fn test_backward_and_skipping_rejected() {
        use OrderStatus::*;
        for (from, to) in [
            (Delivered, Ordered),
            (Prepared, Ordered),
            (Delivered, Prepared),
            (Ordered, Paid),
            (Prepared, Paid),
            (Ordered, Ordered),
        ] {
            assert!(
                matches!(check_transition(from, to), Err(FloorError::InvalidTransition(_))),
                "{} -> {} should be rejected",
                from,
                to
            );
        }
    }

    #[test]
    fn test_terminal_orders_are_frozen() {
        use OrderStatus::*;
        for from in [Paid, Canceled] {
            for to in [Ordered, Prepared, Delivered, Paid, Canceled] {
                assert!(check_transition(from, to).is_err());
            }
        }
    }

    #[test]
    fn test_cancel_reachable_from_any_open_state() {
        use OrderStatus::*;
        for from in [Ordered, Prepared, Delivered] {
            assert!(check_transition(from, Canceled).is_ok());
        }
    }

    #[test]
    fn test_cancel_item_before_preparation() {
        let order = order_on_table_4();
        assert_eq!(order.total_price, 45.0);

        let updated = cancel_item(&order, "soup", "").unwrap();
        assert_eq!(updated.items[0].status, OrderItemStatus::Cancelled);
        assert_eq!(updated.total_price, 39.0);
        assert!(check_total_invariant(&updated));

        let updated = cancel_item(&updated, "wine", "no observation").unwrap();
        assert_eq!(updated.total_price, 22.0);
    }

    #[test]
    fn test_cancel_rejected_on_prepared_item() {
        let order = order_on_table_4();
        assert!(matches!(
            cancel_item(&order, "steak", ""),
            Err(FloorError::InvalidTransition(_))
        ));
    }

    #[test]
    fn test_cancel_unknown_item() {
        let order = order_on_table_4();
        assert!(matches!(
            cancel_item(&order, "dessert", ""),
            Err(FloorError::NotFound(_))
        ));
        // observation is part of the address
        assert!(matches!(
            cancel_item(&order, "soup", "extra hot"),
            Err(FloorError::NotFound(_))
        ));
    }

    #[test]
    fn test_find_item_prefers_eligible_duplicate() {
        let mut order = order_on_table_4();
        order.items.push(line("steak", 22.0, 1, OrderItemStatus::Ordered));
        let idx = find_item(&order, "steak", "", |s| s.is_before_preparation()).unwrap();
        assert_eq!(idx, 3);
    }

    #[test]
    fn test_find_item_skips_removed_lines() {
        let mut order = order_on_table_4();
        order.items[0].status = OrderItemStatus::Cancelled;
        assert!(matches!(
            find_item(&order, "soup", "", |_| true),
            Err(FloorError::NotFound(_))
        ));
    }

    #[test]
    fn test_item_updates_independent_of_order() {
        let order = order_on_table_4();
        let updated = update_item(&order, "soup", "", OrderItemStatus::Prepared).unwrap();
        assert_eq!(updated.items[0].status, OrderItemStatus::Prepared);
        assert_eq!(updated.status, OrderStatus::Ordered);

        assert!(matches!(
            update_item(&updated, "soup", "", OrderItemStatus::Ordered),
            Err(FloorError::InvalidTransition(_))
        ));
        assert!(matches!(
            update_item(&updated, "soup", "", OrderItemStatus::Void),
            Err(FloorError::InvalidTransition(_))
        ));
    }

    #[test]
    fn test_item_changes_on_terminal_order_rejected() {
        let mut order = order_on_table_4();
        order.status = OrderStatus::Paid;
        assert!(update_item(&order, "soup", "", OrderItemStatus::Prepared).is_err());
        assert!(cancel_item(&order, "soup", "").is_err());
        assert!(check_accepts_items(&order).is_err());
    }

    #[test]
    fn test_total_invariant_detects_drift() {
        let mut order = order_on_table_4();
        assert!(check_total_invariant(&order));
        order.items[1].status = OrderItemStatus::Void;
        assert!(!check_total_invariant(&order));
        order.recompute_total();
        assert!(check_total_invariant(&order));
    }
}
