//! Rate limiting for the public endpoints.
//!
//! Limits are applied per IP address. Key brute force is not the concern
//! here (tokens carry 128 bits of entropy); the limits exist to keep
//! abusive clients away from the payment gateway and the store.
//!
//! Tiers:
//! - Strict: /payment/* - every request is an external gateway call
//! - Standard: /auth, /generateKey, /generateSignal, /create-affiliate
//! - Relaxed: /status, /afiliado/{slug}
//!
//! Budgets come from `RateLimitConfig` (RATE_LIMIT_*_RPM variables).

use std::sync::Arc;
use std::time::Duration;
use tower_governor::GovernorLayer;
use tower_governor::governor::GovernorConfigBuilder;

use crate::config::RateLimitConfig;

/// Rate limiter layer type alias using governor types directly
pub type RateLimitLayer = GovernorLayer<
    tower_governor::key_extractor::PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware<governor::clock::QuantaInstant>,
    axum::body::Body,
>;

/// The three tiers, built once from config and applied per route group.
pub struct RateLimitLayers {
    pub strict: RateLimitLayer,
    pub standard: RateLimitLayer,
    pub relaxed: RateLimitLayer,
}

impl RateLimitLayers {
    pub fn from_config(config: RateLimitConfig) -> Self {
        Self {
            strict: create_layer(config.strict_rpm),
            standard: create_layer(config.standard_rpm),
            relaxed: create_layer(config.relaxed_rpm),
        }
    }
}

/// Creates a rate limiter layer with the specified requests per minute.
fn create_layer(requests_per_minute: u32) -> RateLimitLayer {
    assert!(requests_per_minute > 0, "Rate limit must be greater than 0");

    let period_secs = 60 / requests_per_minute as u64;
    let config = GovernorConfigBuilder::default()
        .period(Duration::from_secs(period_secs.max(1)))
        .burst_size(requests_per_minute)
        .finish()
        .expect("Failed to build rate limiter config");

    GovernorLayer::new(Arc::new(config))
}
