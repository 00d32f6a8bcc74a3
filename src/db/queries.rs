use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

use super::from_row::{
    query_all, query_one, CREDIT_LOG_COLS, ORDER_COLS, PRICING_PLAN_COLS, USAGE_BALANCE_COLS,
};

pub(crate) fn now() -> i64 {
    Utc::now().timestamp()
}

pub(crate) fn gen_id() -> String {
    Uuid::new_v4().to_string()
}

// ============ Usage Balances ============

/// Provision a balance row for a user. Called at account/plan provisioning,
/// before any revocation can target the user.
pub fn create_usage_balance(conn: &Connection, input: &CreateUsageBalance) -> Result<UsageBalance> {
    let now = now();
    let details_json = serde_json::to_string(&input.balance_details)?;

    conn.execute(
        "INSERT INTO usage_balances (user_id, one_time_credits_balance, subscription_credits_balance, balance_details, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            &input.user_id,
            input.one_time_credits_balance,
            input.subscription_credits_balance,
            &details_json,
            now,
            now
        ],
    )?;

    Ok(UsageBalance {
        user_id: input.user_id.clone(),
        one_time_credits_balance: input.one_time_credits_balance,
        subscription_credits_balance: input.subscription_credits_balance,
        balance_details: input.balance_details.clone(),
        created_at: now,
        updated_at: now,
    })
}

pub fn get_usage_by_user(conn: &Connection, user_id: &str) -> Result<Option<UsageBalance>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM usage_balances WHERE user_id = ?1",
            USAGE_BALANCE_COLS
        ),
        &[&user_id],
    )
}

/// Read just the subscription balance for a user. Used by the
/// subscription-end path, which revokes whatever remains rather than a
/// plan-derived figure.
pub fn get_subscription_balance(conn: &Connection, user_id: &str) -> Result<Option<i64>> {
    conn.query_row(
        "SELECT subscription_credits_balance FROM usage_balances WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )
    .optional()
    .map_err(Into::into)
}

// ============ Pricing Plans ============

pub fn create_pricing_plan(conn: &Connection, input: &CreatePricingPlan) -> Result<PricingPlan> {
    let id = gen_id();
    let now = now();
    let benefits_json = serde_json::to_string(&input.benefits)?;

    conn.execute(
        "INSERT INTO pricing_plans (id, name, recurring_interval, benefits, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            &id,
            &input.name,
            input.recurring_interval.map(|i| i.as_ref().to_string()),
            &benefits_json,
            now
        ],
    )?;

    Ok(PricingPlan {
        id,
        name: input.name.clone(),
        recurring_interval: input.recurring_interval,
        benefits: input.benefits.clone(),
        created_at: now,
    })
}

pub fn get_plan_by_id(conn: &Connection, id: &str) -> Result<Option<PricingPlan>> {
    query_one(
        conn,
        &format!("SELECT {} FROM pricing_plans WHERE id = ?1", PRICING_PLAN_COLS),
        &[&id],
    )
}

// ============ Orders ============

pub fn create_order(conn: &Connection, input: &CreateOrder) -> Result<Order> {
    let id = gen_id();
    let now = now();

    conn.execute(
        "INSERT INTO orders (id, user_id, plan_id, order_type, amount_total_cents, subscription_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            &id,
            &input.user_id,
            &input.plan_id,
            input.order_type.as_ref(),
            input.amount_total_cents,
            &input.subscription_id,
            now
        ],
    )?;

    Ok(Order {
        id,
        user_id: input.user_id.clone(),
        plan_id: input.plan_id.clone(),
        order_type: input.order_type,
        amount_total_cents: input.amount_total_cents,
        subscription_id: input.subscription_id.clone(),
        created_at: now,
    })
}

pub fn get_order_by_id(conn: &Connection, id: &str) -> Result<Option<Order>> {
    query_one(
        conn,
        &format!("SELECT {} FROM orders WHERE id = ?1", ORDER_COLS),
        &[&id],
    )
}

// ============ Credit Logs ============

/// Credit log history for a user, newest first. The audit trail is
/// append-only; there are deliberately no update or delete queries.
pub fn list_credit_logs_for_user(conn: &Connection, user_id: &str) -> Result<Vec<CreditLogEntry>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM credit_logs WHERE user_id = ?1 ORDER BY created_at DESC, id",
            CREDIT_LOG_COLS
        ),
        &[&user_id],
    )
}
