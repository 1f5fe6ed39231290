use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// Request body for `POST /checkout/hotpay`: asks the server to build a signed payment request for an
/// existing pending order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutParams {
    pub order_id: String,
}

/// The signed parameter set the storefront submits to the gateway to start a payment. The `params`
/// pairs are posted as form fields to `action_url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub action_url: String,
    pub params: Vec<(String, String)>,
}
