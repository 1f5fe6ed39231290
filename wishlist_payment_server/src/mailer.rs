//! Order confirmation email dispatch.
//!
//! Confirmation mail is strictly best-effort. The dispatcher runs off the order-confirmed event
//! channel, after the settlement has committed, so a mailer failure can never fail or retry a
//! webhook. Failures are logged and dropped.
use std::future::Future;

use log::*;
use thiserror::Error;
use wishlist_payment_engine::events::OrderConfirmedEvent;

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("Could not deliver the confirmation email. {0}")]
    DeliveryFailure(String),
}

/// Implementations are awaited on the event-handler tasks, hence the `Send` bound on the returned
/// future.
pub trait ConfirmationMailer: Clone + Send + Sync {
    fn send_order_confirmation(
        &self,
        event: &OrderConfirmedEvent,
    ) -> impl Future<Output = Result<(), MailerError>> + Send;
}

/// A mailer that writes the confirmation to the log instead of an SMTP relay. Stands in until a real
/// transport is wired up, and doubles as the mailer for test and dev environments.
#[derive(Clone, Debug, Default)]
pub struct LogMailer;

impl ConfirmationMailer for LogMailer {
    async fn send_order_confirmation(&self, event: &OrderConfirmedEvent) -> Result<(), MailerError> {
        let order = &event.order;
        let name = order.first_name.as_deref().unwrap_or("friend");
        info!(
            "✉️ Confirmation email for order {} to {}: \"Thank you, {name}! Your donation of {} ({} item(s)) has \
             been received.\"",
            order.order_id,
            order.email,
            order.total_amount,
            event.items.len()
        );
        Ok(())
    }
}
