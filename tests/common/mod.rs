//! Test utilities and fixtures for Keygrid integration tests

#![allow(dead_code)]

use axum::Router;
use axum::routing::{get, post};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

pub use keygrid::db::{AppState, init_affiliate_db, init_db, queries};
pub use keygrid::handlers::{
    affiliate_page, authenticate_key, create_affiliate, generate_key, generate_signal, pay_emola,
    pay_mpesa,
};
pub use keygrid::models::*;
pub use keygrid::payments::{MozPaymentClient, PaymentProvider};
pub use keygrid::plans::{FAR_FUTURE, PAID_PLANS, Plan};

/// 2024-01-01T00:00:00Z, the fixed clock most scenarios start from
pub const JAN_1_2024: i64 = 1_704_067_200;

/// 2024-01-08T00:00:00Z, seven days later
pub const JAN_8_2024: i64 = 1_704_672_000;

/// Gateway base URL nothing listens on. A handler that does reach for the
/// gateway through this gets a transport error and answers 502, so a test
/// asserting a 4xx also proves no call was attempted.
pub const UNREACHABLE_GATEWAY: &str = "http://127.0.0.1:9";

/// Create an in-memory test database with schema initialized
pub fn setup_test_db() -> Connection {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    init_db(&conn).expect("Failed to initialize schema");
    conn
}

/// Create an in-memory test affiliate database with schema initialized
pub fn setup_test_affiliate_db() -> Connection {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory affiliate database");
    init_affiliate_db(&conn).expect("Failed to initialize affiliate schema");
    conn
}

/// Get the current timestamp
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Create an AppState for testing: in-memory databases, gateway pointed at
/// a dead address
pub fn create_test_app_state() -> AppState {
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder().max_size(4).build(manager).unwrap();
    {
        let conn = pool.get().unwrap();
        init_db(&conn).unwrap();
    }

    let affiliate_manager = SqliteConnectionManager::memory();
    let affiliate_pool = Pool::builder()
        .max_size(4)
        .build(affiliate_manager)
        .unwrap();
    {
        let conn = affiliate_pool.get().unwrap();
        init_affiliate_db(&conn).unwrap();
    }

    AppState {
        db: pool,
        affiliates: affiliate_pool,
        base_url: "http://localhost:3000".to_string(),
        gateway: MozPaymentClient::new(UNREACHABLE_GATEWAY, "wallet-test"),
    }
}

/// Create a Router with all endpoints (without rate limiting for tests)
pub fn public_app(state: AppState) -> Router {
    Router::new()
        .route("/auth", post(authenticate_key))
        .route("/generateKey", post(generate_key))
        .route("/payment/mpesa", post(pay_mpesa))
        .route("/payment/emola", post(pay_emola))
        .route("/generateSignal", post(generate_signal))
        .route("/create-affiliate", post(create_affiliate))
        .route("/afiliado/{slug}", get(affiliate_page))
        .with_state(state)
}

/// Create a key as of a fixed timestamp
pub fn create_test_key(conn: &Connection, plan: Plan, created_at: i64) -> AccessKey {
    queries::create_key_at(conn, plan, created_at).expect("Failed to create test key")
}

/// Force a key's status directly, the way an operator would
pub fn set_key_status(conn: &Connection, token: &str, status: &str) {
    conn.execute(
        "UPDATE keys SET status = ?2 WHERE key = ?1",
        rusqlite::params![token, status],
    )
    .expect("Failed to update key status");
}
