mod from_row;
mod schema;
pub mod queries;

pub use schema::{init_affiliate_db, init_db};

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::payments::MozPaymentClient;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Application state holding database pools and configuration
#[derive(Clone)]
pub struct AppState {
    /// Main database pool (keys, payment attempts)
    pub db: DbPool,
    /// Affiliate pages pool (separate file, unrelated concern with its own growth)
    pub affiliates: DbPool,
    /// Base URL used when building public affiliate URLs
    pub base_url: String,
    /// Client for the mozpayment gateway (M-Pesa and e-Mola charges)
    pub gateway: MozPaymentClient,
}

pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(database_path);
    Pool::builder().max_size(10).build(manager)
}
