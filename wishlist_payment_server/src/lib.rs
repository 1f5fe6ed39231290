//! # Wishlist payment gateway server
//! This crate hosts the HTTP edge of the wishlist payment gateway. It is responsible for:
//! Listening for payment notification webhooks from the HotPay and PayU gateways.
//! Verifying notification signatures before anything else happens.
//! Translating each gateway's payload and status vocabulary into a canonical settlement.
//! Handing the settlement to the reconciliation engine, and answering in the dialect each gateway
//! expects.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more
//! information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/webhook/hotpay`: The webhook route for HotPay payment notifications (form-encoded).
//! * `/webhook/payu`: The webhook route for PayU payment notifications (JSON, signed raw body).
//! * `/checkout/hotpay`: Builds a signed HotPay payment request for a pending order.

pub mod config;
pub mod data_objects;
pub mod errors;
pub mod gateways;
pub mod helpers;
pub mod mailer;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
