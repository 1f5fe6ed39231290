//! Payment gateway adapters.
//!
//! Each adapter owns three things for its gateway: the typed notification payload (parsed and
//! validated before any business logic runs), the signature scheme, and the mapping from the gateway's
//! proprietary status vocabulary to the engine's canonical `(PaymentStatus, OrderStatus)` pair.
//! The webhook handlers depend only on [`SignatureVerifier`], never on a concrete algorithm.
pub mod hotpay;
pub mod payu;

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum SignatureError {
    #[error("The signature does not match the notification payload.")]
    Mismatch,
    #[error("The notification carries no signature. {0}")]
    Missing(String),
    #[error("Unsupported signature algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

/// Everything a verifier may need besides the parsed payload: the raw, unparsed body (PayU signs
/// exactly those bytes) and the transport-level signature header, when the gateway uses one.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotificationContext<'a> {
    pub raw_body: &'a [u8],
    pub signature_header: Option<&'a str>,
}

/// Proof that a notification genuinely originated from the configured gateway. Verification runs
/// before any state mutation; a [`SignatureError::Missing`] outcome is subject to the adapter's
/// strict/permissive configuration, everything else rejects the request.
pub trait SignatureVerifier {
    type Notification;

    fn verify(&self, note: &Self::Notification, ctx: &NotificationContext<'_>) -> Result<(), SignatureError>;
}
