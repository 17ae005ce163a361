mod affiliate;
mod auth;
mod keys;
mod payment;
mod signal;

pub use affiliate::*;
pub use auth::*;
pub use keys::*;
pub use payment::*;
pub use signal::*;

use axum::{
    Json, Router,
    routing::{get, post},
};
use serde::Serialize;

use crate::config::RateLimitConfig;
use crate::db::AppState;
use crate::rate_limit::RateLimitLayers;

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    version: &'static str,
}

async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "online",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router(rate_limit: RateLimitConfig) -> Router<AppState> {
    let layers = RateLimitLayers::from_config(rate_limit);

    // Strict tier: every request here turns into a gateway call that can
    // hold a USSD session open on someone's phone.
    let strict = Router::new()
        .route("/payment/mpesa", post(pay_mpesa))
        .route("/payment/emola", post(pay_emola))
        .route_layer(layers.strict);

    let standard = Router::new()
        .route("/auth", post(authenticate_key))
        .route("/generateKey", post(generate_key))
        .route("/generateSignal", post(generate_signal))
        .route("/create-affiliate", post(create_affiliate))
        .route_layer(layers.standard);

    let relaxed = Router::new()
        .route("/status", get(status))
        .route("/afiliado/{slug}", get(affiliate_page))
        .route_layer(layers.relaxed);

    Router::new().merge(strict).merge(standard).merge(relaxed)
}
