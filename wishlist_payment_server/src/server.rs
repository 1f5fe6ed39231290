use std::{future::Future, pin::Pin, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use wishlist_payment_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    ReconciliationApi,
    SqliteDatabase,
};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    mailer::{ConfirmationMailer, LogMailer},
    routes::{health, HotpayCheckoutRoute, HotpayWebhookRoute, PayuWebhookRoute},
};

/// Queue length of the order-confirmed event channel. Settlements outpacing the mailer by more than
/// this block the webhook handler until the mailer catches up.
const EVENT_BUFFER_SIZE: usize = 25;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, confirmation_hooks(LogMailer));
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// Wires the mailer into the order-confirmed event channel. The dispatch is best-effort: a mailer
/// failure is logged and dropped, never propagated back to the settlement that triggered it.
pub fn confirmation_hooks<M: ConfirmationMailer + 'static>(mailer: M) -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks.on_order_confirmed(move |event| {
        let mailer = mailer.clone();
        Box::pin(async move {
            debug!("📬️ Dispatching confirmation email for order {}", event.order.order_id);
            if let Err(e) = mailer.send_order_confirmation(&event).await {
                error!("📬️ Confirmation email for order {} was not sent. {e}", event.order.order_id);
            }
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    hooks
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let api = ReconciliationApi::new(db.clone(), producers.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("wpg::access_log"))
            .app_data(web::Data::new(api))
            .app_data(web::Data::new(config.hotpay.clone()))
            .app_data(web::Data::new(config.payu.clone()))
            .service(health)
            .service(HotpayWebhookRoute::<SqliteDatabase>::new())
            .service(PayuWebhookRoute::<SqliteDatabase>::new())
            .service(HotpayCheckoutRoute::<SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
