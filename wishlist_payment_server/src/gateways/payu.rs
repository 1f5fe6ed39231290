//! PayU gateway adapter.
//!
//! PayU carries its signature in an `OpenPayu-Signature` header of semicolon-delimited `key=value`
//! pairs. The digest is computed over the raw, unparsed request body concatenated with the merchant's
//! second key, so verification must run on the exact bytes received, before any JSON parsing.
use serde::{Deserialize, Serialize};
use wishlist_payment_engine::db_types::{OrderStatus, PaymentStatus};
use wpg_common::Secret;

use crate::{
    config::PayUConfig,
    gateways::{NotificationContext, SignatureError, SignatureVerifier},
    helpers::{md5_hex, sha256_hex},
};

pub const SIGNATURE_HEADER: &str = "OpenPayu-Signature";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayUNotification {
    pub order: PayUOrder,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayUOrder {
    /// Our order id, echoed back from checkout. Notifications without it are malformed.
    #[serde(rename = "extOrderId", default)]
    pub ext_order_id: Option<String>,
    pub status: String,
    /// PayU's own id for the payment.
    #[serde(rename = "orderId", default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub buyer: Option<PayUBuyer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayUBuyer {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "firstName", default)]
    pub first_name: Option<String>,
}

/// Maps PayU's status vocabulary onto the canonical pair; unknown statuses degrade to pending.
pub fn map_status(status: &str) -> (PaymentStatus, OrderStatus) {
    match status {
        "COMPLETED" => (PaymentStatus::Completed, OrderStatus::Confirmed),
        "CANCELED" | "REJECTED" => (PaymentStatus::Failed, OrderStatus::Cancelled),
        _ => (PaymentStatus::Pending, OrderStatus::Pending),
    }
}

/// The parsed `OpenPayu-Signature` header. Tolerates missing pairs and unknown keys; whitespace around
/// pairs is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureHeader {
    pub signature: Option<String>,
    pub algorithm: Option<String>,
    pub sender: Option<String>,
}

impl SignatureHeader {
    pub fn parse(value: &str) -> Self {
        let mut header = Self::default();
        for pair in value.split(';') {
            let Some((key, val)) = pair.split_once('=') else {
                continue;
            };
            let val = val.trim();
            match key.trim().to_ascii_lowercase().as_str() {
                "signature" => header.signature = Some(val.to_string()),
                "algorithm" => header.algorithm = Some(val.to_string()),
                "sender" => header.sender = Some(val.to_string()),
                _ => {},
            }
        }
        header
    }
}

pub struct PayUVerifier {
    second_key: Secret<String>,
}

impl PayUVerifier {
    pub fn new(config: &PayUConfig) -> Self {
        Self { second_key: config.second_key.clone() }
    }

    fn expected_signature(&self, raw_body: &[u8], algorithm: &str) -> Result<String, SignatureError> {
        let mut signed = raw_body.to_vec();
        signed.extend_from_slice(self.second_key.reveal().as_bytes());
        match algorithm.to_ascii_uppercase().as_str() {
            "MD5" => Ok(md5_hex(&signed)),
            "SHA-256" | "SHA256" => Ok(sha256_hex(&signed)),
            other => Err(SignatureError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

impl SignatureVerifier for PayUVerifier {
    type Notification = PayUNotification;

    fn verify(&self, _note: &PayUNotification, ctx: &NotificationContext<'_>) -> Result<(), SignatureError> {
        let Some(raw_header) = ctx.signature_header else {
            return Err(SignatureError::Missing(format!("No {SIGNATURE_HEADER} header in the request.")));
        };
        let header = SignatureHeader::parse(raw_header);
        let Some(signature) = header.signature else {
            return Err(SignatureError::Missing(format!("The {SIGNATURE_HEADER} header has no signature field.")));
        };
        let algorithm = header.algorithm.as_deref().unwrap_or("MD5");
        let expected = self.expected_signature(ctx.raw_body, algorithm)?;
        if expected.eq_ignore_ascii_case(&signature) {
            Ok(())
        } else {
            Err(SignatureError::Mismatch)
        }
    }
}
