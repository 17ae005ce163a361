//! Row mapping trait and helpers for reducing boilerplate in queries.
//!
//! This module provides a `FromRow` trait that models can implement to
//! define how they are constructed from database rows, plus helper functions
//! for common query patterns.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::models::*;

/// Parse a string column into an enum type, converting parse errors to rusqlite errors.
///
/// This provides graceful error handling instead of panicking when database
/// contains invalid enum values (from corruption, migration errors, etc.).
fn parse_enum<T: std::str::FromStr>(row: &Row, col: usize, col_name: &str) -> rusqlite::Result<T> {
    row.get::<_, String>(col)?.parse::<T>().map_err(|_| {
        rusqlite::Error::InvalidColumnType(col, col_name.to_string(), rusqlite::types::Type::Text)
    })
}

/// Trait for constructing a type from a database row.
///
/// Implementing this trait allows using the `query_one` helper function,
/// reducing repetitive row mapping closures.
pub trait FromRow: Sized {
    /// Construct an instance from a database row.
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

// ============ SQL SELECT Constants ============

pub const KEY_COLS: &str = "key, plan, created_at, expires_at, status";

pub const PAYMENT_ATTEMPT_COLS: &str = "id, provider, phone, payer_name, plan, amount, status, provider_ref, key, failure_reason, created_at, updated_at";

pub const AFFILIATE_PAGE_COLS: &str =
    "id, slug, main_link, button1_link, button2_link, button3_link, created_at";

// ============ FromRow Implementations ============

impl FromRow for AccessKey {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(AccessKey {
            key: row.get(0)?,
            plan: parse_enum(row, 1, "plan")?,
            created_at: row.get(2)?,
            expires_at: row.get(3)?,
            status: parse_enum(row, 4, "status")?,
        })
    }
}

impl FromRow for PaymentAttempt {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(PaymentAttempt {
            id: row.get(0)?,
            provider: parse_enum(row, 1, "provider")?,
            phone: row.get(2)?,
            payer_name: row.get(3)?,
            plan: parse_enum(row, 4, "plan")?,
            amount: row.get(5)?,
            status: parse_enum(row, 6, "status")?,
            provider_ref: row.get(7)?,
            key: row.get(8)?,
            failure_reason: row.get(9)?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    }
}

impl FromRow for AffiliatePage {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(AffiliatePage {
            id: row.get(0)?,
            slug: row.get(1)?,
            main_link: row.get(2)?,
            button1_link: row.get(3)?,
            button2_link: row.get(4)?,
            button3_link: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}
