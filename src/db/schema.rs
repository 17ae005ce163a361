use rusqlite::Connection;

/// Initialize the main database schema (keys and the payment ledger)
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- Access keys. The token itself is the primary key: it is generated
        -- with 128 bits of entropy and is the only lookup the system does.
        -- Rows are never deleted; the API only ever moves status from
        -- active to expired. 'disabled' is reserved for operators flipping
        -- a key off by hand.
        CREATE TABLE IF NOT EXISTS keys (
            key TEXT PRIMARY KEY,
            plan TEXT NOT NULL CHECK (plan IN ('7', '15', '30', 'admin')),
            created_at INTEGER NOT NULL,
            expires_at INTEGER NOT NULL,
            status TEXT NOT NULL CHECK (status IN ('active', 'expired', 'disabled'))
        );
        CREATE INDEX IF NOT EXISTS idx_keys_status ON keys(status);
        CREATE INDEX IF NOT EXISTS idx_keys_plan ON keys(plan);

        -- Payment ledger. Written pending before the gateway call and
        -- finalized after it, so charges the provider completed but we never
        -- heard back about remain visible for manual reconciliation.
        CREATE TABLE IF NOT EXISTS payment_attempts (
            id TEXT PRIMARY KEY,
            provider TEXT NOT NULL CHECK (provider IN ('mpesa', 'emola')),
            phone TEXT NOT NULL,
            payer_name TEXT NOT NULL,
            plan TEXT NOT NULL,
            amount INTEGER NOT NULL,
            status TEXT NOT NULL CHECK (status IN ('pending', 'succeeded', 'failed')),
            provider_ref TEXT,
            key TEXT REFERENCES keys(key),
            failure_reason TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_payment_attempts_status ON payment_attempts(status);
        CREATE INDEX IF NOT EXISTS idx_payment_attempts_phone ON payment_attempts(phone);
        "#,
    )
}

/// Initialize the affiliate database schema (separate file from the main db)
pub fn init_affiliate_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- Affiliate pages: a short unique slug plus the four links the
        -- public page renders.
        CREATE TABLE IF NOT EXISTS affiliate_pages (
            id TEXT PRIMARY KEY,
            slug TEXT NOT NULL UNIQUE,
            main_link TEXT NOT NULL,
            button1_link TEXT NOT NULL,
            button2_link TEXT NOT NULL,
            button3_link TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );
        "#,
    )
}
