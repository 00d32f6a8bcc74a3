//! Row mapping trait and helpers for reducing boilerplate in queries.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::models::*;

/// Parse a string column into an enum type, converting parse errors to
/// rusqlite errors instead of panicking on invalid stored values.
fn parse_enum<T: std::str::FromStr>(row: &Row, col: usize, col_name: &str) -> rusqlite::Result<T> {
    row.get::<_, String>(col)?.parse::<T>().map_err(|_| {
        rusqlite::Error::InvalidColumnType(col, col_name.to_string(), rusqlite::types::Type::Text)
    })
}

/// Parse an optional string column into an optional enum.
fn parse_enum_opt<T: std::str::FromStr>(
    row: &Row,
    col: usize,
    col_name: &str,
) -> rusqlite::Result<Option<T>> {
    match row.get::<_, Option<String>>(col)? {
        Some(s) => s.parse::<T>().map(Some).map_err(|_| {
            rusqlite::Error::InvalidColumnType(
                col,
                col_name.to_string(),
                rusqlite::types::Type::Text,
            )
        }),
        None => Ok(None),
    }
}

/// Parse a JSON text column at the read boundary. NULL maps to the type's
/// default so absent blobs behave like empty ones.
fn parse_json<T>(row: &Row, col: usize) -> rusqlite::Result<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    match row.get::<_, Option<String>>(col)? {
        Some(raw) => serde_json::from_str(&raw).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                col,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        }),
        None => Ok(T::default()),
    }
}

/// Trait for constructing a type from a database row.
pub trait FromRow: Sized {
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

/// Query for multiple results.
pub fn query_all<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, T::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ============ SQL SELECT Constants ============

pub const USAGE_BALANCE_COLS: &str = "user_id, one_time_credits_balance, subscription_credits_balance, balance_details, created_at, updated_at";

pub const CREDIT_LOG_COLS: &str = "id, user_id, amount, one_time_balance_after, subscription_balance_after, log_type, notes, related_order_id, created_at";

pub const PRICING_PLAN_COLS: &str = "id, name, recurring_interval, benefits, created_at";

pub const ORDER_COLS: &str =
    "id, user_id, plan_id, order_type, amount_total_cents, subscription_id, created_at";

// ============ FromRow Implementations ============

impl FromRow for UsageBalance {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(UsageBalance {
            user_id: row.get(0)?,
            one_time_credits_balance: row.get(1)?,
            subscription_credits_balance: row.get(2)?,
            balance_details: parse_json(row, 3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}

impl FromRow for CreditLogEntry {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(CreditLogEntry {
            id: row.get(0)?,
            user_id: row.get(1)?,
            amount: row.get(2)?,
            one_time_balance_after: row.get(3)?,
            subscription_balance_after: row.get(4)?,
            log_type: parse_enum(row, 5, "log_type")?,
            notes: row.get(6)?,
            related_order_id: row.get(7)?,
            created_at: row.get(8)?,
        })
    }
}

impl FromRow for PricingPlan {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(PricingPlan {
            id: row.get(0)?,
            name: row.get(1)?,
            recurring_interval: parse_enum_opt(row, 2, "recurring_interval")?,
            benefits: parse_json(row, 3)?,
            created_at: row.get(4)?,
        })
    }
}

impl FromRow for Order {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Order {
            id: row.get(0)?,
            user_id: row.get(1)?,
            plan_id: row.get(2)?,
            order_type: parse_enum(row, 3, "order_type")?,
            amount_total_cents: row.get(4)?,
            subscription_id: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}
