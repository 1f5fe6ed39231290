use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderItem};

/// Published once, after the authoritative settlement write has committed, for each order that reaches
/// `Completed`. Carries everything the confirmation-mail collaborator needs so that subscribers do not
/// have to touch the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfirmedEvent {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

impl OrderConfirmedEvent {
    pub fn new(order: Order, items: Vec<OrderItem>) -> Self {
        Self { order, items }
    }
}
