use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Order, OrderId, OrderItem, Settlement},
    traits::ReconcilerError,
};

/// Returns the order with the given external order id, if it exists.
pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("SELECT * FROM orders WHERE order_id = $1").bind(order_id.as_str()).fetch_optional(conn).await?;
    Ok(order)
}

/// Returns the line items of the order with the given internal id, in insertion order.
pub async fn fetch_items_for_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    let items = sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(items)
}

/// Writes the settlement's `(payment_status, status)` pair onto the order in one conditional update.
///
/// The `payment_status = 'Pending'` guard is the whole idempotency story at the storage level: two
/// concurrent duplicate deliveries both reach this statement, but only one of them matches a row. The
/// loser gets `None` back instead of overwriting a terminal state.
pub async fn settle_order(
    settlement: &Settlement,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, ReconcilerError> {
    trace!("🗃️ Settling order {} as {}", settlement.order_id, settlement.payment_status);
    // `fetch_all` rather than `fetch_optional`: SQLite only commits the statement's implicit
    // transaction once it has run to completion, and `fetch_optional` hands the row back after the
    // first step. Draining the statement guarantees the write is durable before we return.
    let mut rows: Vec<Order> = sqlx::query_as(
        r#"
            UPDATE orders
            SET payment_status = $1, status = $2, updated_at = CURRENT_TIMESTAMP
            WHERE order_id = $3 AND payment_status = 'Pending'
            RETURNING *
        "#,
    )
    .bind(settlement.payment_status.to_string())
    .bind(settlement.status.to_string())
    .bind(settlement.order_id.as_str())
    .fetch_all(conn)
    .await?;
    // order_id is unique, so there is at most one row.
    Ok(rows.pop())
}

/// Returns the destination organization for the order: the organization of the first line item that
/// carries an animal reference. Orders spanning multiple organizations resolve to the first match.
pub async fn organization_for_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Option<i64>, sqlx::Error> {
    let org: Option<i64> = sqlx::query_scalar(
        r#"
            SELECT a.organization_id
            FROM order_items i JOIN animals a ON a.id = i.animal_id
            WHERE i.order_id = $1
            ORDER BY i.id
            LIMIT 1
        "#,
    )
    .bind(order_id)
    .fetch_optional(conn)
    .await?;
    Ok(org)
}

pub(crate) async fn attach_order_to_batch(
    order_id: i64,
    batch_id: i64,
    conn: &mut SqliteConnection,
) -> Result<(), ReconcilerError> {
    sqlx::query("UPDATE orders SET batch_id = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2")
        .bind(batch_id)
        .bind(order_id)
        .execute(conn)
        .await?;
    Ok(())
}
