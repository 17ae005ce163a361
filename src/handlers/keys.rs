use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::db::{AppState, queries};
use crate::error::Result;
use crate::extractors::Json;
use crate::plans::Plan;

#[derive(Debug, Deserialize)]
pub struct GenerateKeyRequest {
    #[serde(default)]
    pub plan: String,
}

/// Shared by /generateKey and the payment endpoints, which return the same
/// shape on success.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyResponse {
    pub success: bool,
    pub key: String,
    pub plan: Plan,
    pub created_at: i64,
    pub expires_at: i64,
}

pub async fn generate_key(
    State(state): State<AppState>,
    Json(req): Json<GenerateKeyRequest>,
) -> Result<Json<KeyResponse>> {
    let plan = Plan::parse_paid(&req.plan)?;

    let conn = state.db.get()?;
    let key = queries::create_key(&conn, plan)?;

    tracing::info!("Generated key for plan {}", plan.as_ref());

    Ok(Json(KeyResponse {
        success: true,
        key: key.key,
        plan: key.plan,
        created_at: key.created_at,
        expires_at: key.expires_at,
    }))
}
