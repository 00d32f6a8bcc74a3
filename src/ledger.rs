//! The ledger mutator: the single entry point through which revocations
//! touch the mutable per-user balances.
//!
//! All three revocation triggers (subscription end, one-time refund,
//! subscription refund) funnel through [`apply_revocation`] rather than
//! each implementing their own read-modify-write. The mutation runs inside
//! one IMMEDIATE transaction, so concurrent revocations for the same user,
//! or a revocation racing a credit grant, always observe a consistent
//! snapshot-then-write sequence with no lost updates.

use rusqlite::{params, Connection, TransactionBehavior};

use crate::db::queries;
use crate::error::Result;
use crate::models::CreditLogType;

/// Which of the two per-user balances a revocation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceKind {
    OneTime,
    Subscription,
}

/// One parameterized revocation, shared by every trigger path.
#[derive(Debug, Clone)]
pub struct RevocationRequest {
    pub user_id: String,
    pub target: BalanceKind,
    /// Amount to take back. Non-positive values make the call a no-op.
    pub amount_requested: i64,
    /// Clear the monthly allocation record. Independent of the arithmetic:
    /// this is the caller saying "this allocation is fully spent", not a
    /// figure derived from the balance.
    pub clear_monthly: bool,
    /// Clear the yearly allocation record.
    pub clear_yearly: bool,
    pub log_type: CreditLogType,
    pub notes: String,
    pub related_order_id: Option<String>,
}

/// What a revocation actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevocationOutcome {
    /// Nothing changed: non-positive request, no balance row for the user,
    /// or the balance was already zero. No log row was written.
    Noop,
    /// The balance was decremented by `amount` (clamped at zero, so this
    /// may be less than requested) and exactly one audit row was written.
    Applied { amount: i64 },
}

/// Atomically revoke credits from a user's balance and append the audit row.
///
/// Uses an IMMEDIATE transaction so the write lock is held from before the
/// balance read through the commit, serializing all mutations for the
/// database. On PostgreSQL the equivalent is `SELECT ... FOR UPDATE` on
/// the balance row.
///
/// A missing balance row is a silent no-op rather than an error: there is
/// nothing to revoke and nothing to log, and replayed provider events for
/// a since-removed account should not fail.
pub fn apply_revocation(
    conn: &mut Connection,
    req: &RevocationRequest,
) -> Result<RevocationOutcome> {
    if req.amount_requested <= 0 {
        return Ok(RevocationOutcome::Noop);
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let usage = match queries::get_usage_by_user(&tx, &req.user_id)? {
        Some(u) => u,
        None => return Ok(RevocationOutcome::Noop),
    };

    let (current, column) = match req.target {
        BalanceKind::OneTime => (usage.one_time_credits_balance, "one_time_credits_balance"),
        BalanceKind::Subscription => (
            usage.subscription_credits_balance,
            "subscription_credits_balance",
        ),
    };

    let new_balance = (current - req.amount_requested).max(0);
    let applied = current - new_balance;

    // Balance already at zero: skip the vacuous update and the zero-delta
    // audit row. This is also what makes replayed end-of-subscription
    // events safe: the second run finds nothing left to take.
    if applied == 0 {
        return Ok(RevocationOutcome::Noop);
    }

    let mut details = usage.balance_details.clone();
    if req.clear_monthly {
        details.monthly_allocation = None;
    }
    if req.clear_yearly {
        details.yearly_allocation = None;
    }
    let details_json = serde_json::to_string(&details)?;

    let now = queries::now();
    tx.execute(
        &format!(
            "UPDATE usage_balances SET {} = ?1, balance_details = ?2, updated_at = ?3 WHERE user_id = ?4",
            column
        ),
        params![new_balance, &details_json, now, &req.user_id],
    )?;

    let (one_time_after, subscription_after) = match req.target {
        BalanceKind::OneTime => (new_balance, usage.subscription_credits_balance),
        BalanceKind::Subscription => (usage.one_time_credits_balance, new_balance),
    };

    tx.execute(
        "INSERT INTO credit_logs (id, user_id, amount, one_time_balance_after, subscription_balance_after, log_type, notes, related_order_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            queries::gen_id(),
            &req.user_id,
            -applied,
            one_time_after,
            subscription_after,
            req.log_type.as_ref(),
            &req.notes,
            &req.related_order_id,
            now
        ],
    )?;

    tx.commit()?;

    Ok(RevocationOutcome::Applied { amount: applied })
}
