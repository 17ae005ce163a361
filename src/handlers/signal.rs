use axum::extract::State;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::db::{AppState, queries};
use crate::error::{AppError, Result, msg};
use crate::extractors::Json;
use crate::models::KeyValidation;
use crate::signal::{GRID_COLS, GRID_ROWS, SignalCell, generate_grid};

#[derive(Debug, Deserialize)]
pub struct SignalRequest {
    #[serde(default)]
    pub key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalResponse {
    pub success: bool,
    pub board: Vec<Vec<SignalCell>>,
    pub generated_at: i64,
}

/// The grid is gated on a valid key but is otherwise stateless; nothing
/// about it is stored.
pub async fn generate_signal(
    State(state): State<AppState>,
    Json(req): Json<SignalRequest>,
) -> Result<Json<SignalResponse>> {
    let token = req.key.trim();
    if token.is_empty() {
        return Err(AppError::BadRequest(msg::MISSING_KEY.into()));
    }

    let conn = state.db.get()?;

    match queries::validate_key(&conn, token)? {
        None => Err(AppError::NotFound(msg::KEY_NOT_FOUND.into())),
        Some(KeyValidation::Expired) => Err(AppError::Unauthorized(msg::KEY_EXPIRED.into())),
        Some(KeyValidation::Disabled) => Err(AppError::Unauthorized(msg::KEY_INACTIVE.into())),
        Some(KeyValidation::Valid { .. }) => Ok(Json(SignalResponse {
            success: true,
            board: generate_grid(GRID_ROWS, GRID_COLS),
            generated_at: Utc::now().timestamp(),
        })),
    }
}
