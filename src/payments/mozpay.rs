use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::Serialize;

use crate::error::{AppError, Result};

use super::{ChargeOutcome, PaymentProvider};

/// Per-request deadline for gateway calls. The gateway fronts a USSD push
/// that waits on the payer confirming on their phone, so this is generous.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

/// Request body shared by both charge endpoints. Field names are the
/// gateway's own.
#[derive(Debug, Serialize)]
struct ChargeRequest<'a> {
    carteira: &'a str,
    numero: &'a str,
    quem_comprou: &'a str,
    valor: String,
}

/// Client for the mozpayment gateway.
///
/// One charge is one POST; the gateway holds the request open until the
/// payer confirms or the charge fails. How success is signalled differs
/// per rail, see [`interpret_mpesa`] and [`interpret_emola`].
#[derive(Debug, Clone)]
pub struct MozPaymentClient {
    client: Client,
    base_url: String,
    wallet_id: String,
}

impl MozPaymentClient {
    pub fn new(base_url: &str, wallet_id: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            wallet_id: wallet_id.to_string(),
        }
    }

    /// Charge `amount` meticais to `phone` over the given rail.
    pub async fn charge(
        &self,
        provider: PaymentProvider,
        phone: &str,
        payer_name: &str,
        amount: i64,
    ) -> Result<ChargeOutcome> {
        let endpoint = match provider {
            PaymentProvider::Mpesa => "pagamentorotativompesa",
            PaymentProvider::Emola => "pagamentorotativoemola",
        };
        let url = format!("{}/{}", self.base_url, endpoint);

        let body = ChargeRequest {
            carteira: &self.wallet_id,
            numero: phone,
            quem_comprou: payer_name,
            valor: amount.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::PaymentUpstream(format!("gateway request failed: {}", e)))?;

        match provider {
            PaymentProvider::Mpesa => interpret_mpesa(response).await,
            PaymentProvider::Emola => interpret_emola(response).await,
        }
    }
}

/// M-Pesa signals the verdict through the HTTP status alone; the body only
/// carries the transaction reference.
async fn interpret_mpesa(response: Response) -> Result<ChargeOutcome> {
    let status = response.status();

    if status.is_success() {
        let body: serde_json::Value = response.json().await.unwrap_or_default();
        return Ok(ChargeOutcome::Approved {
            provider_ref: extract_payment_id(&body),
        });
    }

    Ok(ChargeOutcome::Declined {
        reason: mpesa_decline_reason(status).to_string(),
    })
}

/// e-Mola answers 200 for everything and puts the verdict in the body:
/// `success` is the string "yes" on a confirmed charge.
async fn interpret_emola(response: Response) -> Result<ChargeOutcome> {
    let status = response.status();
    if !status.is_success() {
        return Ok(ChargeOutcome::Declined {
            reason: "Payment was not completed".to_string(),
        });
    }

    let body: serde_json::Value = response
        .json()
        .await
        .map_err(|e| AppError::PaymentUpstream(format!("unreadable gateway response: {}", e)))?;

    if body.get("success").and_then(|v| v.as_str()) == Some("yes") {
        return Ok(ChargeOutcome::Approved {
            provider_ref: extract_payment_id(&body),
        });
    }

    let reason = body
        .get("message")
        .and_then(|v| v.as_str())
        .unwrap_or("Payment was not confirmed")
        .to_string();
    Ok(ChargeOutcome::Declined { reason })
}

/// Decline reasons for the statuses the gateway forwards from M-Pesa.
fn mpesa_decline_reason(status: StatusCode) -> &'static str {
    match status.as_u16() {
        400 => "Transaction error, check the number and try again",
        401 => "Wrong PIN or the payment was not confirmed",
        422 => "Insufficient balance",
        _ => "Payment was not completed",
    }
}

fn extract_payment_id(body: &serde_json::Value) -> Option<String> {
    body.get("paymentId")
        .and_then(|v| v.as_str())
        .map(String::from)
}
