//! Backend traits for the reconciliation engine.
//!
//! The [`ReconciliationApi`](crate::ReconciliationApi) depends only on [`ReconcilerDatabase`], so any
//! store that can perform the conditional settlement update and the transactional batch find-or-create
//! can act as a backend. SQLite is the shipped implementation.
use thiserror::Error;

use crate::db_types::{Order, OrderId, OrderItem, Settlement, ShipmentBatch};

#[allow(async_fn_in_trait)]
pub trait ReconcilerDatabase: Clone {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Fetches the order with the given external order id, or `None` if it does not exist. Orders are
    /// created at checkout, never by the reconciler.
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, ReconcilerError>;

    /// Fetches the line items for the order with the given internal id, in insertion order.
    async fn fetch_items_for_order(&self, order_id: i64) -> Result<Vec<OrderItem>, ReconcilerError>;

    /// Applies the settlement to the order in a single conditional update:
    /// the `(payment_status, status)` pair is written together, and only while the order's payment
    /// status is still `Pending`. Returns the updated order, or `None` if the order was already settled
    /// (a duplicate, stale or concurrent delivery lost the race). `Completed` and `Failed` are terminal.
    async fn settle_order(&self, settlement: &Settlement) -> Result<Option<Order>, ReconcilerError>;

    /// Attaches a newly-completed order to the `Collecting` shipment batch of its destination
    /// organization, creating the batch if none exists. The whole operation runs in one transaction and
    /// relies on a uniqueness constraint, so concurrent deliveries for the same organization end up
    /// sharing a single batch.
    ///
    /// The destination organization is taken from the first line item with an animal reference. Returns
    /// `None` (and does nothing) when the order has no such item.
    async fn assign_order_to_batch(&self, order: &Order) -> Result<Option<ShipmentBatch>, ReconcilerError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), ReconcilerError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum ReconcilerError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
}

impl From<sqlx::Error> for ReconcilerError {
    fn from(e: sqlx::Error) -> Self {
        ReconcilerError::DatabaseError(e.to_string())
    }
}
