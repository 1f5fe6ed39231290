//! HotPay gateway adapter.
//!
//! HotPay authenticates both directions with a SHA-256 digest over a `;`-joined concatenation of
//! request fields and the two shared secrets. The field sets differ per direction and must be
//! reproduced exactly:
//! * checkout (outbound): `password;KWOTA;NAZWA_USLUGI;ADRES_WWW;ID_ZAMOWIENIA;secret`
//! * notification (inbound): `password;KWOTA;ID_PLATNOSCI;ID_ZAMOWIENIA;STATUS;SECURE;secret`
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use wishlist_payment_engine::db_types::{Order, OrderStatus, PaymentStatus};
use wpg_common::Secret;

use crate::{
    config::HotPayConfig,
    data_objects::PaymentRequest,
    gateways::{NotificationContext, SignatureError, SignatureVerifier},
    helpers::sha256_hex,
};

pub const HOTPAY_ACTION_URL: &str = "https://platnosc.hotpay.pl/";

/// The notification body HotPay POSTs as form data. `ID_ZAMOWIENIA`, `STATUS` and `KWOTA` are
/// required; a body without them never reaches the reconciler (the form extractor rejects it with a
/// 400 response).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotPayNotification {
    #[serde(rename = "ID_ZAMOWIENIA")]
    pub order_id: String,
    #[serde(rename = "STATUS")]
    pub status: String,
    #[serde(rename = "KWOTA")]
    pub amount: String,
    #[serde(rename = "ID_PLATNOSCI", default)]
    pub payment_id: Option<String>,
    #[serde(rename = "SECURE", default)]
    pub secure: Option<String>,
    #[serde(rename = "SEKRET", default)]
    pub sekret: Option<String>,
    #[serde(rename = "HASH", default)]
    pub hash: Option<String>,
}

impl HotPayNotification {
    /// Builds a notification from loose form fields. This is the `multipart/form-data` path; the
    /// urlencoded path goes through serde directly. The same three fields are required either way.
    pub fn from_fields(mut fields: HashMap<String, String>) -> Result<Self, String> {
        let order_id =
            fields.remove("ID_ZAMOWIENIA").ok_or_else(|| "The ID_ZAMOWIENIA field is missing.".to_string())?;
        let status = fields.remove("STATUS").ok_or_else(|| "The STATUS field is missing.".to_string())?;
        let amount = fields.remove("KWOTA").ok_or_else(|| "The KWOTA field is missing.".to_string())?;
        Ok(Self {
            order_id,
            status,
            amount,
            payment_id: fields.remove("ID_PLATNOSCI"),
            secure: fields.remove("SECURE"),
            sekret: fields.remove("SEKRET"),
            hash: fields.remove("HASH"),
        })
    }
}

/// Maps HotPay's status vocabulary onto the canonical pair. Unknown statuses (including `TIMEOUT`)
/// degrade to pending rather than erroring, so a new vocabulary entry on the gateway side can never
/// poison an order.
pub fn map_status(status: &str) -> (PaymentStatus, OrderStatus) {
    match status {
        "SUCCESS" => (PaymentStatus::Completed, OrderStatus::Confirmed),
        "FAILURE" | "CANCELLED" | "REJECTED" => (PaymentStatus::Failed, OrderStatus::Cancelled),
        _ => (PaymentStatus::Pending, OrderStatus::Pending),
    }
}

pub struct HotPayVerifier {
    password: Secret<String>,
    secret: Secret<String>,
}

impl HotPayVerifier {
    pub fn new(config: &HotPayConfig) -> Self {
        Self { password: config.password.clone(), secret: config.secret.clone() }
    }

    /// The digest HotPay sends along with a notification.
    pub fn notification_hash(&self, note: &HotPayNotification) -> String {
        let fields = [
            self.password.reveal().as_str(),
            note.amount.as_str(),
            note.payment_id.as_deref().unwrap_or_default(),
            note.order_id.as_str(),
            note.status.as_str(),
            note.secure.as_deref().unwrap_or_default(),
            self.secret.reveal().as_str(),
        ];
        sha256_hex(fields.join(";").as_bytes())
    }

    /// The digest for an outbound checkout request. The gateway recomputes this over the submitted
    /// form fields, so the amount must already be the exact two-decimal string being sent.
    pub fn checkout_hash(&self, amount: &str, service_name: &str, return_url: &str, order_id: &str) -> String {
        let fields =
            [self.password.reveal().as_str(), amount, service_name, return_url, order_id, self.secret.reveal().as_str()];
        sha256_hex(fields.join(";").as_bytes())
    }
}

impl SignatureVerifier for HotPayVerifier {
    type Notification = HotPayNotification;

    fn verify(&self, note: &HotPayNotification, _ctx: &NotificationContext<'_>) -> Result<(), SignatureError> {
        let supplied = match note.hash.as_deref() {
            Some(h) if !h.is_empty() => h,
            _ => return Err(SignatureError::Missing("No HASH field in the notification body.".to_string())),
        };
        let expected = self.notification_hash(note);
        if expected.eq_ignore_ascii_case(supplied) {
            Ok(())
        } else {
            Err(SignatureError::Mismatch)
        }
    }
}

/// Builds the signed parameter set that redirects a buyer to HotPay for an existing pending order.
pub fn checkout_request(config: &HotPayConfig, order: &Order) -> PaymentRequest {
    let verifier = HotPayVerifier::new(config);
    let amount = order.total_amount.to_string();
    let hash = verifier.checkout_hash(&amount, &config.service_name, &config.return_url, order.order_id.as_str());
    let params = vec![
        ("SEKRET".to_string(), config.secret.reveal().clone()),
        ("KWOTA".to_string(), amount),
        ("NAZWA_USLUGI".to_string(), config.service_name.clone()),
        ("ADRES_WWW".to_string(), config.return_url.clone()),
        ("ID_ZAMOWIENIA".to_string(), order.order_id.0.clone()),
        ("EMAIL".to_string(), order.email.clone()),
        ("DANE_OSOBOWE".to_string(), order.first_name.clone().unwrap_or_default()),
        ("HASH".to_string(), hash),
    ];
    PaymentRequest { action_url: HOTPAY_ACTION_URL.to_string(), params }
}
