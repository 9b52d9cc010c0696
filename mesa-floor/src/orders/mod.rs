//! Order-side logic: cart aggregation, status transitions, void recovery

pub mod cart;
pub mod lifecycle;
pub mod void_window;

pub use cart::{Cart, CartLine, MenuDish, SideDish};
pub use void_window::{RECOVERY_WINDOW_MS, VoidCountdown};
