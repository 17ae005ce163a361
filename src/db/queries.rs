use chrono::Utc;
use rusqlite::{Connection, params};
use uuid::Uuid;

use crate::error::{AppError, Result, msg};
use crate::models::*;
use crate::payments::PaymentProvider;
use crate::plans::Plan;

use super::from_row::{AFFILIATE_PAGE_COLS, KEY_COLS, PAYMENT_ATTEMPT_COLS, query_one};

fn now() -> i64 {
    Utc::now().timestamp()
}

fn gen_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generate a key token: 16 random bytes, lowercase hex.
///
/// 128 bits of entropy; a collision surfaces as a primary key violation
/// rather than being checked for up front.
pub fn generate_key_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Slug alphabet without lookalike characters (no 0/o, 1/l, i).
const SLUG_CHARS: &str = "abcdefghjkmnpqrstuvwxyz23456789";
const SLUG_LEN: usize = 8;

/// Generate a short URL-safe slug for an affiliate page.
pub fn generate_slug() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let chars: Vec<char> = SLUG_CHARS.chars().collect();
    (0..SLUG_LEN)
        .map(|_| chars[rng.gen_range(0..chars.len())])
        .collect()
}

// ============ Keys ============

pub fn create_key(conn: &Connection, plan: Plan) -> Result<AccessKey> {
    create_key_at(conn, plan, now())
}

/// Create a key as of an explicit timestamp. Split out from [`create_key`]
/// so expiry arithmetic can be exercised against a fixed clock.
pub fn create_key_at(conn: &Connection, plan: Plan, created_at: i64) -> Result<AccessKey> {
    let token = generate_key_token();
    let expires_at = plan.expires_at(created_at);

    conn.execute(
        "INSERT INTO keys (key, plan, created_at, expires_at, status)
         VALUES (?1, ?2, ?3, ?4, 'active')",
        params![&token, plan.as_ref(), created_at, expires_at],
    )?;

    Ok(AccessKey {
        key: token,
        plan,
        created_at,
        expires_at,
        status: KeyStatus::Active,
    })
}

pub fn get_key(conn: &Connection, token: &str) -> Result<Option<AccessKey>> {
    query_one(
        conn,
        &format!("SELECT {} FROM keys WHERE key = ?1", KEY_COLS),
        &[&token],
    )
}

pub fn validate_key(conn: &Connection, token: &str) -> Result<Option<KeyValidation>> {
    validate_key_at(conn, token, now())
}

/// Look up a token and apply the lazy expiry transition as of `now`.
///
/// Returns None for an unknown token. A key strictly past its expiry is
/// flipped to expired here, on the first validation that observes it; the
/// write is conditioned on the current status so two racing validations
/// leave the row identical (the second UPDATE matches zero rows), and an
/// operator-disabled key stays disabled even once its time runs out.
pub fn validate_key_at(conn: &Connection, token: &str, now: i64) -> Result<Option<KeyValidation>> {
    let Some(key) = get_key(conn, token)? else {
        return Ok(None);
    };

    if now > key.expires_at {
        if key.status == KeyStatus::Active {
            mark_key_expired(conn, token)?;
        }
        return Ok(Some(KeyValidation::Expired));
    }

    match key.status {
        KeyStatus::Active => {
            let remaining_secs = key.remaining_secs(now);
            Ok(Some(KeyValidation::Valid {
                key,
                remaining_secs,
            }))
        }
        KeyStatus::Expired => Ok(Some(KeyValidation::Expired)),
        KeyStatus::Disabled => Ok(Some(KeyValidation::Disabled)),
    }
}

/// Flip an active key to expired. Returns whether this call performed the
/// write; false means the key was already expired.
pub fn mark_key_expired(conn: &Connection, token: &str) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE keys SET status = 'expired' WHERE key = ?1 AND status = 'active'",
        params![token],
    )?;
    Ok(affected > 0)
}

pub fn count_keys(conn: &Connection) -> Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM keys", [], |row| row.get(0))?;
    Ok(count)
}

pub fn count_active_keys(conn: &Connection) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM keys WHERE status = 'active'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn get_admin_key(conn: &Connection) -> Result<Option<AccessKey>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM keys WHERE plan = 'admin' ORDER BY created_at LIMIT 1",
            KEY_COLS
        ),
        &[],
    )
}

/// Create the admin key if none exists yet. Returns the new key on first
/// startup and None on every start after that.
pub fn ensure_admin_key(conn: &Connection) -> Result<Option<AccessKey>> {
    if get_admin_key(conn)?.is_some() {
        return Ok(None);
    }
    create_key(conn, Plan::Admin).map(Some)
}

// ============ Payment ledger ============

pub fn create_payment_attempt(
    conn: &Connection,
    provider: PaymentProvider,
    phone: &str,
    payer_name: &str,
    plan: Plan,
    amount: i64,
) -> Result<PaymentAttempt> {
    let id = gen_id();
    let now = now();

    conn.execute(
        "INSERT INTO payment_attempts (id, provider, phone, payer_name, plan, amount, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'pending', ?7, ?7)",
        params![&id, provider.as_ref(), phone, payer_name, plan.as_ref(), amount, now],
    )?;

    Ok(PaymentAttempt {
        id,
        provider,
        phone: phone.to_string(),
        payer_name: payer_name.to_string(),
        plan,
        amount,
        status: PaymentAttemptStatus::Pending,
        provider_ref: None,
        key: None,
        failure_reason: None,
        created_at: now,
        updated_at: now,
    })
}

pub fn complete_payment_attempt(
    conn: &Connection,
    id: &str,
    provider_ref: Option<&str>,
    key: &str,
) -> Result<()> {
    conn.execute(
        "UPDATE payment_attempts SET status = 'succeeded', provider_ref = ?2, key = ?3, updated_at = ?4
         WHERE id = ?1",
        params![id, provider_ref, key, now()],
    )?;
    Ok(())
}

pub fn fail_payment_attempt(conn: &Connection, id: &str, reason: &str) -> Result<()> {
    conn.execute(
        "UPDATE payment_attempts SET status = 'failed', failure_reason = ?2, updated_at = ?3
         WHERE id = ?1",
        params![id, reason, now()],
    )?;
    Ok(())
}

pub fn get_payment_attempt(conn: &Connection, id: &str) -> Result<Option<PaymentAttempt>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM payment_attempts WHERE id = ?1",
            PAYMENT_ATTEMPT_COLS
        ),
        &[&id],
    )
}

/// Attempts stuck in `pending`: the gateway call never came back. These are
/// the rows an operator checks against the provider statement.
pub fn count_pending_payment_attempts(conn: &Connection) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM payment_attempts WHERE status = 'pending'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

// ============ Affiliate pages ============

const SLUG_ATTEMPTS: usize = 3;

pub fn create_affiliate_page(
    conn: &Connection,
    input: &CreateAffiliatePage,
) -> Result<AffiliatePage> {
    let id = gen_id();
    let created_at = now();

    for _ in 0..SLUG_ATTEMPTS {
        let slug = generate_slug();
        let result = conn.execute(
            "INSERT INTO affiliate_pages (id, slug, main_link, button1_link, button2_link, button3_link, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &id,
                &slug,
                &input.main_affiliate_link,
                &input.button1_link,
                &input.button2_link,
                &input.button3_link,
                created_at
            ],
        );

        match result {
            Ok(_) => {
                return Ok(AffiliatePage {
                    id: id.clone(),
                    slug,
                    main_link: input.main_affiliate_link.clone(),
                    button1_link: input.button1_link.clone(),
                    button2_link: input.button2_link.clone(),
                    button3_link: input.button3_link.clone(),
                    created_at,
                });
            }
            Err(e) if is_unique_violation(&e) => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Err(AppError::Conflict(msg::SLUG_EXHAUSTED.into()))
}

pub fn get_affiliate_page_by_slug(conn: &Connection, slug: &str) -> Result<Option<AffiliatePage>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM affiliate_pages WHERE slug = ?1",
            AFFILIATE_PAGE_COLS
        ),
        &[&slug],
    )
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_token_shape() {
        let token = generate_key_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(token, token.to_lowercase());
    }

    #[test]
    fn test_key_tokens_are_unique() {
        let a = generate_key_token();
        let b = generate_key_token();
        assert_ne!(a, b);
    }

    #[test]
    fn test_slug_shape() {
        let slug = generate_slug();
        assert_eq!(slug.len(), SLUG_LEN);
        assert!(slug.chars().all(|c| SLUG_CHARS.contains(c)));
    }
}
