use std::env;

/// Requests-per-minute budgets for the public rate limit tiers.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub strict_rpm: u32,
    pub standard_rpm: u32,
    pub relaxed_rpm: u32,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub affiliate_database_path: String,
    pub base_url: String,
    /// Base URL of the mozpayment gateway (overridable for tests).
    pub payment_api_base: String,
    /// Merchant wallet id ("carteira") charged payments are routed to.
    pub wallet_id: String,
    /// Allowed CORS origin for the panel. Unset = allow any origin.
    pub panel_origin: Option<String>,
    pub rate_limit: RateLimitConfig,
    pub dev_mode: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("KEYGRID_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let base_url = env::var("BASE_URL").unwrap_or_else(|_| format!("http://{}:{}", host, port));

        let rate_limit = RateLimitConfig {
            strict_rpm: env_rpm("RATE_LIMIT_STRICT_RPM", 10),
            standard_rpm: env_rpm("RATE_LIMIT_STANDARD_RPM", 30),
            relaxed_rpm: env_rpm("RATE_LIMIT_RELAXED_RPM", 60),
        };

        Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "keygrid.db".to_string()),
            affiliate_database_path: env::var("AFFILIATE_DATABASE_PATH")
                .unwrap_or_else(|_| "keygrid_affiliates.db".to_string()),
            base_url,
            payment_api_base: env::var("PAYMENT_API_BASE")
                .unwrap_or_else(|_| "https://mozpayment.co.mz/api/1.1/wf".to_string()),
            wallet_id: env::var("WALLET_ID").unwrap_or_default(),
            panel_origin: env::var("PANEL_ORIGIN").ok(),
            rate_limit,
            dev_mode,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_rpm(var: &str, default: u32) -> u32 {
    env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|&rpm| rpm > 0)
        .unwrap_or(default)
}
