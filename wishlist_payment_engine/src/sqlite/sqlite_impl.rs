//! `SqliteDatabase` is the concrete SQLite implementation of [`ReconcilerDatabase`].
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{batches, new_pool, orders};
use crate::{
    db_types::{Order, OrderId, OrderItem, Settlement, ShipmentBatch},
    traits::{ReconcilerDatabase, ReconcilerError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl ReconcilerDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, ReconcilerError> {
        let mut conn = self.pool.acquire().await.map_err(ReconcilerError::from)?;
        let order = orders::fetch_order_by_order_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_items_for_order(&self, order_id: i64) -> Result<Vec<OrderItem>, ReconcilerError> {
        let mut conn = self.pool.acquire().await.map_err(ReconcilerError::from)?;
        let items = orders::fetch_items_for_order(order_id, &mut conn).await?;
        Ok(items)
    }

    async fn settle_order(&self, settlement: &Settlement) -> Result<Option<Order>, ReconcilerError> {
        // A single conditional UPDATE, so no explicit transaction is needed.
        let mut conn = self.pool.acquire().await.map_err(ReconcilerError::from)?;
        let order = orders::settle_order(settlement, &mut conn).await?;
        if let Some(o) = &order {
            debug!("🗃️ Order {} settled as {}/{}", o.order_id, o.payment_status, o.status);
        }
        Ok(order)
    }

    async fn assign_order_to_batch(&self, order: &Order) -> Result<Option<ShipmentBatch>, ReconcilerError> {
        let mut tx = self.pool.begin().await.map_err(ReconcilerError::from)?;
        let org = orders::organization_for_order(order.id, &mut tx).await?;
        let Some(organization_id) = org else {
            trace!("🗃️📦️ Order {} resolves to no organization.", order.order_id);
            return Ok(None);
        };
        let batch = batches::find_or_create_collecting_batch(organization_id, &mut tx).await?;
        orders::attach_order_to_batch(order.id, batch.id, &mut tx).await?;
        tx.commit().await.map_err(ReconcilerError::from)?;
        debug!("🗃️📦️ Order {} attached to batch #{} (organization #{organization_id})", order.order_id, batch.id);
        Ok(Some(batch))
    }

    async fn close(&mut self) -> Result<(), ReconcilerError> {
        self.pool.close().await;
        Ok(())
    }
}
