use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::payments::PaymentProvider;
use crate::plans::Plan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentAttemptStatus {
    Pending,
    Succeeded,
    Failed,
}

/// One row per charge request against the gateway.
///
/// The row is written with status `pending` before the outbound call and
/// finalized afterwards. A charge the provider completed but we never saw
/// an answer for is therefore visible as a stuck `pending` row, which is
/// what an operator reconciles against the provider statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentAttempt {
    pub id: String,
    pub provider: PaymentProvider,
    pub phone: String,
    pub payer_name: String,
    pub plan: Plan,
    /// Amount in meticais, already checked against the plan price.
    pub amount: i64,
    pub status: PaymentAttemptStatus,
    /// Transaction reference reported by the provider, when it sends one.
    pub provider_ref: Option<String>,
    /// Token of the key issued for this payment.
    pub key: Option<String>,
    pub failure_reason: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}
