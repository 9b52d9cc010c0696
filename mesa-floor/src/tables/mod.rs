//! Table status derivation and floor-plan layout

pub mod deriver;
pub mod layout;

pub use deriver::{CheckoutSet, TableView, derive_all, derive_status};
pub use layout::{LayoutStore, TableLayout, TablePlacement, TableShape};
