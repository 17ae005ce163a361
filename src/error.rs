use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unknown plan: {0}")]
    InvalidPlan(String),

    #[error("Amount {got} does not match the {plan} plan price of {expected}")]
    InvalidAmount { plan: String, expected: i64, got: i64 },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The provider processed the request and declined the charge.
    #[error("Payment rejected: {0}")]
    PaymentRejected(String),

    /// The gateway could not be reached or returned garbage.
    #[error("Payment gateway error: {0}")]
    PaymentUpstream(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// User-facing message constants shared between handlers and tests.
pub mod msg {
    pub const KEY_NOT_FOUND: &str = "Key not found";
    pub const KEY_EXPIRED: &str = "Key expired";
    pub const KEY_INACTIVE: &str = "Key is not active";
    pub const MISSING_KEY: &str = "Missing key";
    pub const MISSING_FIELDS: &str = "Missing required fields";
    pub const INVALID_AMOUNT: &str = "Invalid amount";
    pub const PAGE_NOT_FOUND: &str = "Affiliate page not found";
    pub const INVALID_LINK: &str = "All links must be absolute http:// or https:// URLs";
    pub const SLUG_EXHAUSTED: &str = "Could not allocate a unique slug";
    pub const PAYMENT_UNAVAILABLE: &str = "Payment provider unavailable, try again later";
}

/// Errors are serialized in the same envelope the panel expects from
/// every endpoint: `{ "success": false, "message": "..." }`.
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    message: String,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            AppError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            AppError::InvalidPlan(_) | AppError::InvalidAmount { .. } => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m.clone()),
            AppError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
            AppError::PaymentRejected(m) => (StatusCode::BAD_REQUEST, m.clone()),
            AppError::PaymentUpstream(m) => {
                tracing::error!("Payment gateway error: {}", m);
                (StatusCode::BAD_GATEWAY, msg::PAYMENT_UNAVAILABLE.to_string())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Pool(e) => {
                tracing::error!("Pool error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Json(e) => {
                tracing::error!("JSON error: {}", e);
                (StatusCode::BAD_REQUEST, format!("Invalid JSON: {}", e))
            }
            AppError::Internal(m) => {
                tracing::error!("Internal error: {}", m);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            success: false,
            message,
        };

        (status, Json(body)).into_response()
    }
}

/// Extension for the common "look it up, 404 if missing" step.
pub trait OptionExt<T> {
    fn or_not_found(self, message: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_not_found(self, message: &str) -> Result<T> {
        self.ok_or_else(|| AppError::NotFound(message.to_string()))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
