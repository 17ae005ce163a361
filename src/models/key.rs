use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::plans::Plan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum KeyStatus {
    Active,
    Expired,
    /// Turned off by an operator (directly in the store). Never set by the
    /// API itself.
    Disabled,
}

/// One access key. Keys are never deleted and never reactivated; the only
/// transition the API performs is active -> expired, done lazily by
/// validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessKey {
    /// Opaque token, 16 random bytes hex-encoded. Primary identity.
    pub key: String,
    pub plan: Plan,
    pub created_at: i64,
    pub expires_at: i64,
    pub status: KeyStatus,
}

impl AccessKey {
    /// Seconds until expiry as of `now`. Clamped at zero.
    pub fn remaining_secs(&self, now: i64) -> i64 {
        (self.expires_at - now).max(0)
    }
}

/// Outcome of validating a token that exists in the store.
#[derive(Debug, Clone)]
pub enum KeyValidation {
    Valid {
        key: AccessKey,
        remaining_secs: i64,
    },
    /// The key's time is up. Validation may have just performed the lazy
    /// transition, or the row may already have been marked on an earlier
    /// check; callers cannot tell the difference and must not need to.
    Expired,
    /// Unexpired but not active (operator-disabled).
    Disabled,
}
