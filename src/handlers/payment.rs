use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::db::{AppState, queries};
use crate::error::{AppError, Result, msg};
use crate::extractors::Json;
use crate::payments::{ChargeOutcome, PaymentProvider};
use crate::plans::Plan;

/// Amount in meticais as clients send it. The panel posts the value as a
/// string, some clients send a number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum WireAmount {
    Number(i64),
    Text(String),
}

impl WireAmount {
    fn as_mt(&self) -> Option<i64> {
        match self {
            WireAmount::Number(n) => Some(*n),
            WireAmount::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    /// Payer phone number, passed through to the gateway as-is.
    #[serde(default)]
    pub numero: String,
    /// Payer display name. The panel sends `nome`; older clients send
    /// `quem_comprou`.
    #[serde(default, alias = "quem_comprou")]
    pub nome: String,
    #[serde(default)]
    pub plan: String,
    /// Optional on the wire. When present it must match the plan price;
    /// the charge always uses the plan table amount either way.
    #[serde(default)]
    pub valor: Option<WireAmount>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub success: bool,
    pub key: String,
    pub plan: Plan,
    pub created_at: i64,
    pub expires_at: i64,
    /// Ledger id for this charge. Reconciliation starts from this value.
    pub payment_id: String,
}

pub async fn pay_mpesa(
    State(state): State<AppState>,
    Json(req): Json<PaymentRequest>,
) -> Result<Json<PaymentResponse>> {
    process_payment(state, PaymentProvider::Mpesa, req).await
}

pub async fn pay_emola(
    State(state): State<AppState>,
    Json(req): Json<PaymentRequest>,
) -> Result<Json<PaymentResponse>> {
    process_payment(state, PaymentProvider::Emola, req).await
}

/// Shared flow for both rails: validate, record a pending attempt, charge,
/// finalize the attempt, issue the key.
async fn process_payment(
    state: AppState,
    provider: PaymentProvider,
    req: PaymentRequest,
) -> Result<Json<PaymentResponse>> {
    let phone = req.numero.trim();
    let payer_name = req.nome.trim();
    if phone.is_empty() || payer_name.is_empty() || req.plan.trim().is_empty() {
        return Err(AppError::BadRequest(msg::MISSING_FIELDS.into()));
    }

    let plan = Plan::parse_paid(&req.plan)?;
    let amount = plan.price_mt();

    // Amount check happens strictly before any gateway traffic. A caller
    // must not be able to buy a 30-day key at the 7-day price.
    if let Some(ref valor) = req.valor {
        let got = valor
            .as_mt()
            .ok_or_else(|| AppError::BadRequest(msg::INVALID_AMOUNT.into()))?;
        if got != amount {
            return Err(AppError::InvalidAmount {
                plan: plan.as_ref().to_string(),
                expected: amount,
                got,
            });
        }
    }

    let attempt = {
        let conn = state.db.get()?;
        queries::create_payment_attempt(&conn, provider, phone, payer_name, plan, amount)?
        // Connection released here: the charge below can block for the
        // whole USSD confirmation window and must not pin a pooled
        // connection for that long.
    };

    let outcome = state.gateway.charge(provider, phone, payer_name, amount).await;

    match outcome {
        Ok(ChargeOutcome::Approved { provider_ref }) => {
            let conn = state.db.get()?;
            let key = queries::create_key(&conn, plan)?;
            queries::complete_payment_attempt(
                &conn,
                &attempt.id,
                provider_ref.as_deref(),
                &key.key,
            )?;

            tracing::info!(
                "{} payment {} succeeded, issued {} plan key",
                provider.as_ref(),
                attempt.id,
                plan.as_ref()
            );

            Ok(Json(PaymentResponse {
                success: true,
                key: key.key,
                plan: key.plan,
                created_at: key.created_at,
                expires_at: key.expires_at,
                payment_id: attempt.id,
            }))
        }
        Ok(ChargeOutcome::Declined { reason }) => {
            let conn = state.db.get()?;
            queries::fail_payment_attempt(&conn, &attempt.id, &reason)?;

            tracing::warn!(
                "{} payment {} declined: {}",
                provider.as_ref(),
                attempt.id,
                reason
            );

            Err(AppError::PaymentRejected(reason))
        }
        // Transport failure: the provider may or may not have completed the
        // charge, so the attempt is left pending for reconciliation rather
        // than marked failed.
        Err(e) => {
            tracing::error!(
                "{} payment {} outcome unknown: {}",
                provider.as_ref(),
                attempt.id,
                e
            );
            Err(e)
        }
    }
}
