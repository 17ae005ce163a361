use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::db::{AppState, queries};
use crate::error::{AppError, Result, msg};
use crate::extractors::Json;
use crate::models::KeyValidation;
use crate::plans::Plan;

#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    /// Key token. Defaulted so an absent field reports "Missing key"
    /// rather than a deserialization error.
    #[serde(default)]
    pub key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub success: bool,
    pub key: String,
    pub plan: Plan,
    pub expires_at: i64,
    /// Whole seconds until expiry. Admin keys report time until the
    /// far-future sentinel.
    pub remaining_time: i64,
}

pub async fn authenticate_key(
    State(state): State<AppState>,
    Json(req): Json<AuthRequest>,
) -> Result<Json<AuthResponse>> {
    let token = req.key.trim();
    if token.is_empty() {
        return Err(AppError::BadRequest(msg::MISSING_KEY.into()));
    }

    let conn = state.db.get()?;

    match queries::validate_key(&conn, token)? {
        None => Err(AppError::NotFound(msg::KEY_NOT_FOUND.into())),
        Some(KeyValidation::Expired) => Err(AppError::Unauthorized(msg::KEY_EXPIRED.into())),
        Some(KeyValidation::Disabled) => Err(AppError::Unauthorized(msg::KEY_INACTIVE.into())),
        Some(KeyValidation::Valid {
            key,
            remaining_secs,
        }) => Ok(Json(AuthResponse {
            success: true,
            key: key.key,
            plan: key.plan,
            expires_at: key.expires_at,
            remaining_time: remaining_secs,
        })),
    }
}
