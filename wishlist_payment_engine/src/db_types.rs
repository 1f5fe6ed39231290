use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;
use wpg_common::Money;

//--------------------------------------        OrderId        -------------------------------------------------------
/// The external order id, i.e. the identifier the storefront hands to the payment gateway at checkout and
/// that the gateway echoes back in its notifications.
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid status value: {0}")]
pub struct ConversionError(String);

//--------------------------------------    PaymentStatus      -------------------------------------------------------
/// The canonical payment state of an order. `Completed` and `Failed` are terminal; the reconciler never
/// moves an order out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// No conclusive notification has been received for the order yet.
    Pending,
    /// The gateway reported a successful payment.
    Completed,
    /// The gateway reported a failed, cancelled or rejected payment.
    Failed,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "Pending"),
            PaymentStatus::Completed => write!(f, "Completed"),
            PaymentStatus::Failed => write!(f, "Failed"),
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Completed" => Ok(Self::Completed),
            "Failed" => Ok(Self::Failed),
            s => Err(ConversionError(format!("Invalid payment status: {s}"))),
        }
    }
}

impl From<String> for PaymentStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid payment status in storage: {value}. Defaulting to Pending.");
            PaymentStatus::Pending
        })
    }
}

//--------------------------------------     OrderStatus       -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatus {
    /// The order was created at checkout and is awaiting payment.
    Pending,
    /// Payment completed; the order is part of the fulfilment flow.
    Confirmed,
    /// Payment failed or was cancelled by the buyer.
    Cancelled,
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "Pending"),
            OrderStatus::Confirmed => write!(f, "Confirmed"),
            OrderStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Confirmed" => Ok(Self::Confirmed),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status in storage: {value}. Defaulting to Pending.");
            OrderStatus::Pending
        })
    }
}

//--------------------------------------     BatchStatus       -------------------------------------------------------
/// Lifecycle of a shipment batch. The reconciler only ever creates or attaches to `Collecting` batches;
/// the later transitions belong to the logistics workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum BatchStatus {
    Collecting,
    Ordered,
    Shipped,
    Confirmed,
}

impl Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchStatus::Collecting => write!(f, "Collecting"),
            BatchStatus::Ordered => write!(f, "Ordered"),
            BatchStatus::Shipped => write!(f, "Shipped"),
            BatchStatus::Confirmed => write!(f, "Confirmed"),
        }
    }
}

//--------------------------------------        Order        ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    pub email: String,
    pub first_name: Option<String>,
    pub total_amount: Money,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    pub batch_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      OrderItem       --------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    /// The animal this wishlist item was bought for, if any. Items without an animal reference do not
    /// participate in batch assignment.
    pub animal_id: Option<i64>,
}

//--------------------------------------    ShipmentBatch     --------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ShipmentBatch {
    pub id: i64,
    pub organization_id: i64,
    pub status: BatchStatus,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------      Settlement      --------------------------------------------------------
/// The canonical outcome of parsing and mapping one verified gateway notification. This is the only
/// shape the reconciler accepts; the gateway adapters produce it from their proprietary payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub order_id: OrderId,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    /// Provider-specific transaction id, when the gateway supplies one. Used for audit logging only.
    pub txid: Option<String>,
}

impl Settlement {
    pub fn new(order_id: OrderId, payment_status: PaymentStatus, status: OrderStatus) -> Self {
        Self { order_id, payment_status, status, txid: None }
    }

    pub fn with_txid(mut self, txid: impl Into<String>) -> Self {
        self.txid = Some(txid.into());
        self
    }
}
