//! Wishlist Payment Engine
//!
//! The reconciliation core of the wishlist payment gateway. Gateway adapters (see the server crate)
//! verify and canonicalise inbound payment notifications; this library owns everything that happens
//! after that point:
//! 1. Storage ([`mod@sqlite`]): SQLite is the shipped backend. Use the public API rather than the
//!    database directly; the data types in [`db_types`] are the supported surface.
//! 2. The reconciliation API ([`ReconciliationApi`]): applies settlements to orders with the
//!    idempotency and monotonicity guarantees the gateways' at-least-once delivery requires, and
//!    assigns completed orders to shipment batches.
//! 3. Events ([`mod@events`]): a small hook system for post-commit side effects. The server subscribes
//!    its confirmation-mail dispatcher here.
pub mod db_types;
pub mod events;
pub mod traits;

mod reconciler;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::{db, SqliteDatabase};
pub use reconciler::{ReconciliationApi, SettlementOutcome};
pub use traits::{ReconcilerDatabase, ReconcilerError};
