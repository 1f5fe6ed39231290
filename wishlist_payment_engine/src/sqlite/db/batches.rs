use log::debug;
use sqlx::SqliteConnection;

use crate::{db_types::ShipmentBatch, traits::ReconcilerError};

/// Returns the `Collecting` batch for the organization, creating it if none exists.
///
/// The insert races against concurrent callers on the partial unique index over
/// `(organization_id) WHERE status = 'Collecting'`; whichever insert loses simply falls through to the
/// select, so at most one collecting batch per organization can ever exist.
pub async fn find_or_create_collecting_batch(
    organization_id: i64,
    conn: &mut SqliteConnection,
) -> Result<ShipmentBatch, ReconcilerError> {
    let inserted = sqlx::query(
        "INSERT INTO shipment_batches (organization_id, status) VALUES ($1, 'Collecting') ON CONFLICT DO NOTHING",
    )
    .bind(organization_id)
    .execute(&mut *conn)
    .await?;
    if inserted.rows_affected() > 0 {
        debug!("🗃️📦️ Created a new collecting batch for organization #{organization_id}");
    }
    let batch: ShipmentBatch =
        sqlx::query_as("SELECT * FROM shipment_batches WHERE organization_id = $1 AND status = 'Collecting'")
            .bind(organization_id)
            .fetch_one(conn)
            .await?;
    Ok(batch)
}
