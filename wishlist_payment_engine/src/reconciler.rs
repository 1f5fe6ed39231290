use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Order, OrderItem, PaymentStatus, Settlement},
    events::{EventProducers, OrderConfirmedEvent},
    traits::{ReconcilerDatabase, ReconcilerError},
};

/// `ReconciliationApi` is the order state machine. It takes verified, canonically-mapped gateway
/// notifications ([`Settlement`]s) and drives the order through `Pending → {Completed, Failed}` exactly
/// once, triggering the post-payment side effects (batch assignment, confirmation event) after the
/// authoritative state write has committed.
pub struct ReconciliationApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for ReconciliationApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconciliationApi")
    }
}

impl<B> ReconciliationApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

/// The outcome of processing one settlement. Every variant is a success from the gateway's point of
/// view; failing outcomes are expressed as [`ReconcilerError`]s instead.
#[derive(Debug, Clone)]
pub enum SettlementOutcome {
    /// The order state was written and any side effects were triggered.
    Settled(Order),
    /// The order had already reached a terminal state. Nothing was written and no side effects fired.
    AlreadySettled(Order),
    /// The incoming status mapped to `Pending`, which carries no new information. Nothing was written.
    Unchanged(Order),
}

impl SettlementOutcome {
    pub fn order(&self) -> &Order {
        match self {
            SettlementOutcome::Settled(o) | SettlementOutcome::AlreadySettled(o) | SettlementOutcome::Unchanged(o) => o,
        }
    }
}

impl<B> ReconciliationApi<B>
where B: ReconcilerDatabase
{
    /// Applies a verified settlement to its order.
    ///
    /// The flow is:
    /// 1. Look the order up by its external id. Unknown orders are an error; the reconciler never
    ///    creates orders.
    /// 2. Idempotency gate: a `Completed` notification for an already-`Completed` order short-circuits
    ///    with success. Gateways redeliver notifications freely, so this is the common duplicate path.
    /// 3. Persist the new `(payment_status, status)` pair with a single conditional update. A lost race
    ///    against a concurrent delivery surfaces here as "no row updated" and is treated like a
    ///    duplicate rather than overwriting a terminal state.
    /// 4. If the order just became `Completed`: assign it to a shipment batch and publish the
    ///    confirmation event. Both are best-effort; the settlement has already committed, so their
    ///    failures are logged and swallowed.
    pub async fn process_settlement(&self, settlement: Settlement) -> Result<SettlementOutcome, ReconcilerError> {
        let txid = settlement.txid.clone().unwrap_or_default();
        let order = self
            .db
            .fetch_order_by_order_id(&settlement.order_id)
            .await?
            .ok_or_else(|| ReconcilerError::OrderNotFound(settlement.order_id.clone()))?;
        if order.payment_status == PaymentStatus::Completed && settlement.payment_status == PaymentStatus::Completed {
            debug!("🧾️ Order {} is already completed. Ignoring duplicate delivery [{txid}].", order.order_id);
            return Ok(SettlementOutcome::AlreadySettled(order));
        }
        if settlement.payment_status == PaymentStatus::Pending {
            trace!("🧾️ Notification [{txid}] for order {} carries no new state. Nothing to do.", order.order_id);
            return Ok(SettlementOutcome::Unchanged(order));
        }
        match self.db.settle_order(&settlement).await? {
            None => {
                // The conditional update matched no row: the order left `Pending` between our read and
                // the write, or a stale notification arrived for a terminal order.
                info!(
                    "🧾️ Order {} was already settled as {}. Notification [{txid}] changes nothing.",
                    order.order_id, order.payment_status
                );
                Ok(SettlementOutcome::AlreadySettled(order))
            },
            Some(order) => {
                info!(
                    "🧾️ Order {} settled: payment {}, order {} [{txid}]",
                    order.order_id, order.payment_status, order.status
                );
                let order = if order.payment_status == PaymentStatus::Completed {
                    self.run_post_payment_effects(order).await
                } else {
                    order
                };
                Ok(SettlementOutcome::Settled(order))
            },
        }
    }

    /// Best-effort side effects for a newly completed order. Each step has its own error boundary;
    /// nothing here may fail the webhook response, because the state transition has already committed
    /// and a non-2xx answer would only cause the gateway to redeliver.
    async fn run_post_payment_effects(&self, order: Order) -> Order {
        let order = match self.db.assign_order_to_batch(&order).await {
            Ok(Some(batch)) => {
                debug!(
                    "🧾️📦️ Order {} attached to collecting batch #{} for organization #{}",
                    order.order_id, batch.id, batch.organization_id
                );
                Order { batch_id: Some(batch.id), ..order }
            },
            Ok(None) => {
                debug!("🧾️📦️ Order {} has no animal-linked items. Skipping batch assignment.", order.order_id);
                order
            },
            Err(e) => {
                error!("🧾️📦️ Batch assignment for order {} failed: {e}", order.order_id);
                order
            },
        };
        let items = match self.db.fetch_items_for_order(order.id).await {
            Ok(items) => items,
            Err(e) => {
                error!("🧾️ Could not load line items for order {}: {e}. Confirmation fires without them.", order.order_id);
                Vec::new()
            },
        };
        self.call_order_confirmed_hook(&order, items).await;
        order
    }

    async fn call_order_confirmed_hook(&self, order: &Order, items: Vec<OrderItem>) {
        for emitter in &self.producers.order_confirmed_producer {
            debug!("🧾️📬️ Notifying order-confirmed subscribers for order {}", order.order_id);
            let event = OrderConfirmedEvent::new(order.clone(), items.clone());
            emitter.publish_event(event).await;
        }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }
}
