//! Reconciliation: the orchestration surface over the backend
//!
//! ```text
//! action ─► local check ─► backend mutation ─► refresh (orders ∥ void items ∥ tables)
//!                                                  │
//!                                                  ▼
//!                                       FloorState ─► derive_all ─► TableView
//! ```

pub mod facade;
pub mod sequencer;
pub mod session;

pub use facade::ReconciliationFacade;
pub use sequencer::{ReadKind, ReadSequencer, ReadTicket};
pub use session::{FloorSession, FloorState};

#[cfg(test)]
mod tests;
