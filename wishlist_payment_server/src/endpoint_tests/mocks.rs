use mockall::mock;
use wishlist_payment_engine::{
    db_types::{Order, OrderId, OrderItem, Settlement, ShipmentBatch},
    traits::ReconcilerDatabase,
    ReconcilerError,
};

mock! {
    pub ReconcilerDb {}

    impl Clone for ReconcilerDb {
        fn clone(&self) -> Self;
    }

    impl ReconcilerDatabase for ReconcilerDb {
        fn url(&self) -> &str;
        async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, ReconcilerError>;
        async fn fetch_items_for_order(&self, order_id: i64) -> Result<Vec<OrderItem>, ReconcilerError>;
        async fn settle_order(&self, settlement: &Settlement) -> Result<Option<Order>, ReconcilerError>;
        async fn assign_order_to_batch(&self, order: &Order) -> Result<Option<ShipmentBatch>, ReconcilerError>;
    }
}
