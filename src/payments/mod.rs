mod mozpay;

pub use mozpay::*;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// The two mobile-money rails the gateway can charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentProvider {
    Mpesa,
    Emola,
}

/// Interpreted result of one charge request the gateway actually answered.
///
/// Transport failures never produce this type; they surface as
/// `AppError::PaymentUpstream` from the client instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeOutcome {
    /// The provider confirmed the charge.
    Approved {
        /// Transaction reference from the provider, when it sent one.
        provider_ref: Option<String>,
    },
    /// The provider processed the request and declined it.
    Declined { reason: String },
}
