//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
use std::collections::HashMap;

use actix_multipart::Multipart;
use actix_web::{get, web, Either, HttpRequest, HttpResponse, Responder};
use futures::TryStreamExt;
use log::*;
use wishlist_payment_engine::{
    db_types::{OrderId, PaymentStatus, Settlement},
    ReconcilerDatabase, ReconciliationApi,
};

use crate::{
    config::{HotPayConfig, PayUConfig},
    data_objects::{CheckoutParams, JsonResponse},
    errors::ServerError,
    gateways::{
        hotpay::{self, HotPayNotification, HotPayVerifier},
        payu::{self, PayUNotification, PayUVerifier, SIGNATURE_HEADER},
        NotificationContext, SignatureError, SignatureVerifier,
    },
};

// Web-actix cannot handle generics in handlers, so routes are registered manually via the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

/// Applies the per-adapter strict/permissive policy to a verification result. Only a genuinely absent
/// signature is ever forgiven, and only when strict mode is off. In strict mode an absent signature is
/// a missing required field (400); a present-but-wrong signature is always an authentication failure
/// (401).
fn enforce_signature(result: Result<(), SignatureError>, strict: bool, gateway: &str) -> Result<(), ServerError> {
    match result {
        Ok(()) => {
            trace!("🔐️ {gateway} notification signature verified ✅️");
            Ok(())
        },
        Err(SignatureError::Missing(msg)) if !strict => {
            warn!("🔐️ {gateway}: {msg} Proceeding anyway because strict signature mode is off.");
            Ok(())
        },
        Err(SignatureError::Missing(msg)) => {
            warn!("🔐️ {gateway}: rejecting unsigned notification. {msg}");
            Err(ServerError::MalformedPayload(format!("The notification carries no signature. {msg}")))
        },
        Err(e) => {
            warn!("🔐️ {gateway}: rejecting notification. {e}");
            Err(ServerError::AuthenticationFailure(e))
        },
    }
}

/// Collects the fields of a `multipart/form-data` notification body. Gateway form fields are small
/// text values, so everything is buffered.
async fn collect_multipart_fields(mut payload: Multipart) -> Result<HashMap<String, String>, ServerError> {
    let mut fields = HashMap::new();
    while let Some(mut field) = payload.try_next().await.map_err(bad_multipart)? {
        let Some(name) = field.content_disposition().get_name().map(String::from) else {
            continue;
        };
        let mut value = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(bad_multipart)? {
            value.extend_from_slice(&chunk);
        }
        fields.insert(name, String::from_utf8_lossy(&value).into_owned());
    }
    Ok(fields)
}

fn bad_multipart(e: actix_multipart::MultipartError) -> ServerError {
    ServerError::MalformedPayload(format!("Could not parse the multipart body. {e}"))
}

// ----------------------------------------------   HotPay  ----------------------------------------------------
route!(hotpay_webhook => Post "/webhook/hotpay" impl ReconcilerDatabase);
/// HotPay payment notification webhook.
///
/// HotPay expects a bare-text `OK` with a 200 status; anything else makes it redeliver the
/// notification, so only errors that happen before the settlement commits may be surfaced. The
/// gateway posts the body either urlencoded or as `multipart/form-data`; both are accepted.
pub async fn hotpay_webhook<B: ReconcilerDatabase>(
    body: Either<web::Form<HotPayNotification>, Multipart>,
    api: web::Data<ReconciliationApi<B>>,
    config: web::Data<HotPayConfig>,
) -> Result<HttpResponse, ServerError> {
    if !config.is_configured() {
        error!("🔐️ HotPay notification received, but no HotPay secrets are configured.");
        return Err(ServerError::NotConfigured("HotPay"));
    }
    let note = match body {
        Either::Left(form) => form.into_inner(),
        Either::Right(multipart) => {
            let fields = collect_multipart_fields(multipart).await?;
            HotPayNotification::from_fields(fields).map_err(ServerError::MalformedPayload)?
        },
    };
    trace!("💳️ Received HotPay notification for order {}", note.order_id);
    let verifier = HotPayVerifier::new(&config);
    enforce_signature(verifier.verify(&note, &NotificationContext::default()), config.strict, "HotPay")?;
    let (payment_status, order_status) = hotpay::map_status(&note.status);
    let mut settlement = Settlement::new(OrderId(note.order_id), payment_status, order_status);
    if let Some(txid) = note.payment_id {
        settlement = settlement.with_txid(txid);
    }
    let outcome = api.process_settlement(settlement).await?;
    debug!("💳️ HotPay notification for order {} processed.", outcome.order().order_id);
    Ok(HttpResponse::Ok().body("OK"))
}

route!(hotpay_checkout => Post "/checkout/hotpay" impl ReconcilerDatabase);
/// Builds the signed HotPay payment request for an existing pending order. The storefront submits the
/// returned parameter set to the gateway's payment form, which later echoes the hash back through the
/// webhook above.
pub async fn hotpay_checkout<B: ReconcilerDatabase>(
    body: web::Json<CheckoutParams>,
    api: web::Data<ReconciliationApi<B>>,
    config: web::Data<HotPayConfig>,
) -> Result<HttpResponse, ServerError> {
    if !config.is_configured() {
        return Err(ServerError::NotConfigured("HotPay"));
    }
    let params = body.into_inner();
    let order_id = OrderId(params.order_id);
    let order = api
        .db()
        .fetch_order_by_order_id(&order_id)
        .await
        .map_err(ServerError::from)?
        .ok_or_else(|| ServerError::OrderNotFound(order_id.clone()))?;
    if order.payment_status != PaymentStatus::Pending {
        return Err(ServerError::MalformedPayload(format!("Order {order_id} is not awaiting payment.")));
    }
    let request = hotpay::checkout_request(&config, &order);
    debug!("💳️ Prepared HotPay payment request for order {order_id}");
    Ok(HttpResponse::Ok().json(request))
}

// -----------------------------------------------   PayU  -----------------------------------------------------
route!(payu_webhook => Post "/webhook/payu" impl ReconcilerDatabase);
/// PayU payment notification webhook.
///
/// The signature covers the raw body bytes, so the payload is extracted as `Bytes` and verified before
/// JSON parsing.
pub async fn payu_webhook<B: ReconcilerDatabase>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<ReconciliationApi<B>>,
    config: web::Data<PayUConfig>,
) -> Result<HttpResponse, ServerError> {
    if !config.is_configured() {
        error!("🔐️ PayU notification received, but WPG_PAYU_SECOND_KEY is not configured.");
        return Err(ServerError::NotConfigured("PayU"));
    }
    let note: PayUNotification = serde_json::from_slice(&body)
        .map_err(|e| ServerError::MalformedPayload(format!("Could not parse PayU notification: {e}")))?;
    let header = req.headers().get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    let ctx = NotificationContext { raw_body: &body, signature_header: header };
    let verifier = PayUVerifier::new(&config);
    enforce_signature(verifier.verify(&note, &ctx), config.strict, "PayU")?;

    let order = note.order;
    let ext_order_id = order
        .ext_order_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ServerError::MalformedPayload("The PayU notification has no extOrderId.".to_string()))?;
    if let Some(buyer) = &order.buyer {
        trace!("💳️ PayU notification for order {ext_order_id} from buyer {:?}", buyer.email);
    }
    let (payment_status, order_status) = payu::map_status(&order.status);
    let mut settlement = Settlement::new(OrderId(ext_order_id), payment_status, order_status);
    if let Some(txid) = order.order_id {
        settlement = settlement.with_txid(txid);
    }
    let outcome = api.process_settlement(settlement).await?;
    debug!("💳️ PayU notification for order {} processed.", outcome.order().order_id);
    Ok(HttpResponse::Ok().json(JsonResponse::success("Notification processed.")))
}
