//! The consolidated plan table.
//!
//! Duration and price live on one enum so the expiry policy and the payment
//! adapter can never disagree about what a plan costs or how long it lasts.
//! Plan identifiers outside the closed set fail parsing; there is no default
//! duration to fall back to.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::error::{AppError, Result};

const SECONDS_PER_DAY: i64 = 86400;

/// Expiry stored for keys that never expire: 9999-12-31T23:59:59Z.
pub const FAR_FUTURE: i64 = 253_402_300_799;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Plan {
    #[serde(rename = "7")]
    #[strum(serialize = "7")]
    Days7,
    #[serde(rename = "15")]
    #[strum(serialize = "15")]
    Days15,
    #[serde(rename = "30")]
    #[strum(serialize = "30")]
    Days30,
    /// Operator plan, exempt from expiry and never sold.
    Admin,
}

/// The purchasable plans, in panel order.
pub const PAID_PLANS: [Plan; 3] = [Plan::Days7, Plan::Days15, Plan::Days30];

impl Plan {
    /// Parse a plan identifier from request input.
    ///
    /// Unknown identifiers are rejected outright instead of being coerced
    /// to some default duration.
    pub fn parse(s: &str) -> Result<Self> {
        s.trim()
            .parse()
            .map_err(|_| AppError::InvalidPlan(s.to_string()))
    }

    /// Parse a plan identifier, accepting only the purchasable plans.
    ///
    /// The admin plan is provisioned at startup and cannot be requested
    /// through the API, so it is rejected here with the same error an
    /// unknown identifier gets.
    pub fn parse_paid(s: &str) -> Result<Self> {
        let plan = Self::parse(s)?;
        if !PAID_PLANS.contains(&plan) {
            return Err(AppError::InvalidPlan(s.trim().to_string()));
        }
        Ok(plan)
    }

    /// Duration in seconds, or None for the admin plan.
    pub fn duration_secs(&self) -> Option<i64> {
        match self {
            Plan::Days7 => Some(7 * SECONDS_PER_DAY),
            Plan::Days15 => Some(15 * SECONDS_PER_DAY),
            Plan::Days30 => Some(30 * SECONDS_PER_DAY),
            Plan::Admin => None,
        }
    }

    /// Price in meticais. The payment adapter accepts exactly this amount.
    pub fn price_mt(&self) -> i64 {
        match self {
            Plan::Days7 => 300,
            Plan::Days15 => 700,
            Plan::Days30 => 1200,
            Plan::Admin => 0,
        }
    }

    /// Absolute expiry for a key created at `created_at`.
    pub fn expires_at(&self, created_at: i64) -> i64 {
        match self.duration_secs() {
            Some(secs) => created_at + secs,
            None => FAR_FUTURE,
        }
    }
}
