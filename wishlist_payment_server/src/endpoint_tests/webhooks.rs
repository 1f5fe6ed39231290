use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::Utc;
use wishlist_payment_engine::{
    db_types::{Order, OrderId, OrderStatus, PaymentStatus},
    events::EventProducers,
    ReconciliationApi,
};
use wpg_common::{Money, Secret};

use super::{
    helpers::{post_form, post_multipart, post_raw_json},
    mocks::MockReconcilerDb,
};
use crate::{
    config::{HotPayConfig, PayUConfig},
    gateways::{
        hotpay::{HotPayNotification, HotPayVerifier},
        payu::SIGNATURE_HEADER,
    },
    helpers::md5_hex,
    routes::{HotpayCheckoutRoute, HotpayWebhookRoute, PayuWebhookRoute},
};

fn hotpay_config() -> HotPayConfig {
    HotPayConfig {
        password: Secret::new("haslo".to_string()),
        secret: Secret::new("sekret".to_string()),
        service_name: "Schronisko".to_string(),
        return_url: "https://example.org/thanks".to_string(),
        strict: true,
    }
}

fn payu_config(strict: bool) -> PayUConfig {
    PayUConfig { second_key: Secret::new("druga-tajemnica".to_string()), strict }
}

fn order(payment_status: PaymentStatus, status: OrderStatus) -> Order {
    Order {
        id: 1,
        order_id: OrderId("O1".to_string()),
        email: "buyer@example.com".to_string(),
        first_name: Some("Ala".to_string()),
        total_amount: Money::from_cents(10_000),
        payment_status,
        status,
        batch_id: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn signed_hotpay_notification() -> HotPayNotification {
    let mut note = HotPayNotification {
        order_id: "O1".to_string(),
        status: "SUCCESS".to_string(),
        amount: "100.00".to_string(),
        payment_id: Some("P77".to_string()),
        secure: Some("1".to_string()),
        sekret: None,
        hash: None,
    };
    note.hash = Some(HotPayVerifier::new(&hotpay_config()).notification_hash(&note));
    note
}

fn signed_payu_body() -> (String, String) {
    let body = serde_json::json!({
        "order": {
            "extOrderId": "O1",
            "orderId": "PAYU-123",
            "status": "COMPLETED",
            "buyer": { "email": "buyer@example.com", "firstName": "Ala" }
        }
    })
    .to_string();
    let signature = md5_hex(format!("{body}druga-tajemnica").as_bytes());
    let header = format!("sender=checkout;signature={signature};algorithm=MD5");
    (body, header)
}

fn hotpay_app(cfg: &mut ServiceConfig, db: MockReconcilerDb, config: HotPayConfig) {
    let api = ReconciliationApi::new(db, EventProducers::default());
    cfg.service(HotpayWebhookRoute::<MockReconcilerDb>::new())
        .service(HotpayCheckoutRoute::<MockReconcilerDb>::new())
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(config));
}

fn payu_app(cfg: &mut ServiceConfig, db: MockReconcilerDb, config: PayUConfig) {
    let api = ReconciliationApi::new(db, EventProducers::default());
    cfg.service(PayuWebhookRoute::<MockReconcilerDb>::new())
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(config));
}

/// A mock that settles O1 successfully, including the post-payment effects.
fn settling_db() -> MockReconcilerDb {
    let mut db = MockReconcilerDb::new();
    db.expect_fetch_order_by_order_id()
        .returning(|_| Ok(Some(order(PaymentStatus::Pending, OrderStatus::Pending))));
    db.expect_settle_order().returning(|_| Ok(Some(order(PaymentStatus::Completed, OrderStatus::Confirmed))));
    db.expect_assign_order_to_batch().returning(|_| Ok(None));
    db.expect_fetch_items_for_order().returning(|_| Ok(vec![]));
    db
}

//----------------------------------------------   HotPay  -----------------------------------------------------

#[actix_web::test]
async fn hotpay_valid_notification_settles_the_order() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        hotpay_app(cfg, settling_db(), hotpay_config());
    }
    let (status, body) = post_form("/webhook/hotpay", &signed_hotpay_notification(), configure).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[actix_web::test]
async fn hotpay_bad_signature_is_rejected_before_any_db_call() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        // No expectations: any database call panics the test.
        hotpay_app(cfg, MockReconcilerDb::new(), hotpay_config());
    }
    let mut note = signed_hotpay_notification();
    note.amount = "999.99".to_string();
    let (status, body) = post_form("/webhook/hotpay", &note, configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("signature"));
}

// A missing signature is a missing required field, not a failed authentication attempt.
#[actix_web::test]
async fn hotpay_missing_signature_is_malformed_in_strict_mode() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        hotpay_app(cfg, MockReconcilerDb::new(), hotpay_config());
    }
    let mut note = signed_hotpay_notification();
    note.hash = None;
    let (status, _) = post_form("/webhook/hotpay", &note, configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn hotpay_accepts_a_multipart_notification() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        hotpay_app(cfg, settling_db(), hotpay_config());
    }
    let note = signed_hotpay_notification();
    let fields = [
        ("ID_ZAMOWIENIA", note.order_id.clone()),
        ("STATUS", note.status.clone()),
        ("KWOTA", note.amount.clone()),
        ("ID_PLATNOSCI", note.payment_id.clone().unwrap()),
        ("SECURE", note.secure.clone().unwrap()),
        ("HASH", note.hash.clone().unwrap()),
    ];
    let (status, body) = post_multipart("/webhook/hotpay", &fields, configure).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[actix_web::test]
async fn hotpay_multipart_without_required_fields_is_malformed() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        hotpay_app(cfg, MockReconcilerDb::new(), hotpay_config());
    }
    let fields = [("ID_ZAMOWIENIA", "O1".to_string()), ("STATUS", "SUCCESS".to_string())];
    let (status, body) = post_multipart("/webhook/hotpay", &fields, configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("KWOTA"));
}

#[actix_web::test]
async fn hotpay_unknown_order_is_a_404() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        let mut db = MockReconcilerDb::new();
        db.expect_fetch_order_by_order_id().returning(|_| Ok(None));
        hotpay_app(cfg, db, hotpay_config());
    }
    let (status, body) = post_form("/webhook/hotpay", &signed_hotpay_notification(), configure).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("O1"));
}

#[actix_web::test]
async fn hotpay_unconfigured_gateway_is_a_503() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        hotpay_app(cfg, MockReconcilerDb::new(), HotPayConfig::default());
    }
    let (status, _) = post_form("/webhook/hotpay", &signed_hotpay_notification(), configure).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn hotpay_duplicate_delivery_is_acknowledged_without_a_settlement() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        // The order is already completed, so `settle_order` must never run.
        let mut db = MockReconcilerDb::new();
        db.expect_fetch_order_by_order_id()
            .returning(|_| Ok(Some(order(PaymentStatus::Completed, OrderStatus::Confirmed))));
        hotpay_app(cfg, db, hotpay_config());
    }
    let (status, body) = post_form("/webhook/hotpay", &signed_hotpay_notification(), configure).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

//-----------------------------------------------   PayU  ------------------------------------------------------

#[actix_web::test]
async fn payu_valid_notification_is_acknowledged() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        payu_app(cfg, settling_db(), payu_config(false));
    }
    let (body, header) = signed_payu_body();
    let (status, response) =
        post_raw_json("/webhook/payu", &body, &[(SIGNATURE_HEADER, &header)], configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(response.contains(r#""success":true"#));
}

#[actix_web::test]
async fn payu_missing_signature_is_accepted_when_permissive() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        payu_app(cfg, settling_db(), payu_config(false));
    }
    let (body, _) = signed_payu_body();
    let (status, _) = post_raw_json("/webhook/payu", &body, &[], configure).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn payu_missing_signature_is_malformed_in_strict_mode() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        payu_app(cfg, MockReconcilerDb::new(), payu_config(true));
    }
    let (body, _) = signed_payu_body();
    let (status, _) = post_raw_json("/webhook/payu", &body, &[], configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn payu_tampered_body_is_rejected_even_when_permissive() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        payu_app(cfg, MockReconcilerDb::new(), payu_config(false));
    }
    let (body, header) = signed_payu_body();
    let tampered = body.replace("COMPLETED", "CANCELED");
    let (status, _) = post_raw_json("/webhook/payu", &tampered, &[(SIGNATURE_HEADER, &header)], configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn payu_notification_without_an_order_id_is_malformed() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        payu_app(cfg, MockReconcilerDb::new(), payu_config(false));
    }
    let body = serde_json::json!({ "order": { "status": "COMPLETED" } }).to_string();
    let (status, response) = post_raw_json("/webhook/payu", &body, &[], configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response.contains("extOrderId"));
}

//---------------------------------------------   Checkout  ----------------------------------------------------

#[actix_web::test]
async fn checkout_builds_a_signed_payment_request() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        let mut db = MockReconcilerDb::new();
        db.expect_fetch_order_by_order_id()
            .returning(|_| Ok(Some(order(PaymentStatus::Pending, OrderStatus::Pending))));
        hotpay_app(cfg, db, hotpay_config());
    }
    let body = serde_json::json!({ "order_id": "O1" });
    let (status, response) = post_raw_json("/checkout/hotpay", &body.to_string(), &[], configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(response.contains("https://platnosc.hotpay.pl/"));
    assert!(response.contains("HASH"));
    assert!(response.contains("100.00"));
}

#[actix_web::test]
async fn checkout_for_an_unknown_order_is_a_404() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        let mut db = MockReconcilerDb::new();
        db.expect_fetch_order_by_order_id().returning(|_| Ok(None));
        hotpay_app(cfg, db, hotpay_config());
    }
    let body = serde_json::json!({ "order_id": "O404" });
    let (status, _) = post_raw_json("/checkout/hotpay", &body.to_string(), &[], configure).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn checkout_for_a_settled_order_is_refused() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        let mut db = MockReconcilerDb::new();
        db.expect_fetch_order_by_order_id()
            .returning(|_| Ok(Some(order(PaymentStatus::Completed, OrderStatus::Confirmed))));
        hotpay_app(cfg, db, hotpay_config());
    }
    let body = serde_json::json!({ "order_id": "O1" });
    let (status, _) = post_raw_json("/checkout/hotpay", &body.to_string(), &[], configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
