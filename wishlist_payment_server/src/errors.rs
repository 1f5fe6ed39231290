use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use thiserror::Error;
use wishlist_payment_engine::{db_types::OrderId, ReconcilerError};

use crate::gateways::SignatureError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("The {0} gateway is not configured. Notifications cannot be verified.")]
    NotConfigured(&'static str),
    #[error("Malformed notification payload. {0}")]
    MalformedPayload(String),
    #[error("Notification signature verification failed. {0}")]
    AuthenticationFailure(#[from] SignatureError),
    #[error("The order {0} does not exist.")]
    OrderNotFound(OrderId),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationFailure(_) => StatusCode::UNAUTHORIZED,
            Self::OrderNotFound(_) => StatusCode::NOT_FOUND,
            Self::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<ReconcilerError> for ServerError {
    fn from(e: ReconcilerError) -> Self {
        match e {
            ReconcilerError::OrderNotFound(id) => Self::OrderNotFound(id),
            // Propagated as 5xx so the gateway redelivers; the settlement was not applied.
            ReconcilerError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}
