//! Provider-event entry points for credit revocation.
//!
//! Each handler is invoked once per incoming provider event. Delivery is
//! at-least-once and may be concurrent, so every handler gathers its
//! trigger-specific facts and then defers the actual mutation to
//! [`crate::ledger::apply_revocation`].
//!
//! Errors are recovered here, at the handler boundary: a persistence or
//! provider failure is logged and swallowed so the transport above can
//! always acknowledge the event. Crashing out of a webhook handler would
//! trigger destructive provider-side retry storms.

use rusqlite::Connection;

use crate::db::queries;
use crate::error::Result;
use crate::ledger::{apply_revocation, BalanceKind, RevocationRequest};
use crate::models::{CreditLogType, Order, RecurringInterval};
use crate::payments::{ChargeEvent, CustomerDirectory, SubscriptionEvent};

/// Metadata key under which the provider stores our user id, on both
/// subscription and customer objects.
const USER_ID_METADATA_KEY: &str = "user_id";

/// Amount and allocation markers resolved for a subscription revocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevokeContext {
    pub amount_to_revoke: i64,
    pub clear_monthly: bool,
    pub clear_yearly: bool,
}

impl RevokeContext {
    fn zero() -> Self {
        Self {
            amount_to_revoke: 0,
            clear_monthly: false,
            clear_yearly: false,
        }
    }
}

/// Resolve how much to revoke for a subscription-type plan, and which
/// allocation records to clear, from the plan's recurring interval and the
/// user's current allocation snapshot.
///
/// `None` means the plan could not be found and the caller should do
/// nothing. A zero context (missing usage row, one-time plan, or missing
/// allocation record) is not an error: there is nothing allocated to take
/// back.
pub fn subscription_revoke_context(
    conn: &Connection,
    plan_id: &str,
    user_id: &str,
) -> Result<Option<RevokeContext>> {
    let plan = match queries::get_plan_by_id(conn, plan_id)? {
        Some(p) => p,
        None => {
            tracing::error!(
                "Plan {} not found while computing revoke context",
                plan_id
            );
            return Ok(None);
        }
    };

    let usage = match queries::get_usage_by_user(conn, user_id)? {
        Some(u) => u,
        None => {
            tracing::warn!(
                "No usage row for user {} while computing revoke context",
                user_id
            );
            return Ok(Some(RevokeContext::zero()));
        }
    };

    let ctx = match plan.recurring_interval {
        Some(RecurringInterval::Year) => RevokeContext {
            // Yearly allocations record their grant as a monthly-equivalent
            // figure; that is the amount taken back per refunded period.
            amount_to_revoke: usage
                .balance_details
                .yearly_allocation
                .map(|a| a.monthly_credits)
                .unwrap_or(0),
            clear_monthly: false,
            clear_yearly: true,
        },
        Some(RecurringInterval::Month) => RevokeContext {
            amount_to_revoke: usage
                .balance_details
                .monthly_allocation
                .map(|a| a.monthly_credits)
                .unwrap_or(0),
            clear_monthly: true,
            clear_yearly: false,
        },
        None => RevokeContext::zero(),
    };

    Ok(Some(ctx))
}

/// Revoke whatever subscription credit balance remains when a subscription
/// ends.
///
/// The owning user is resolved from the subscription's own metadata first,
/// then from the provider's customer record. With neither source the event
/// is logged and dropped: revoking without knowing whose balance to touch
/// is worse than missing a revocation.
pub async fn revoke_remaining_subscription_credits_on_end<C: CustomerDirectory>(
    conn: &mut Connection,
    customers: &C,
    subscription: &SubscriptionEvent,
) {
    let customer_id = match subscription.customer.as_deref() {
        Some(id) => id,
        None => {
            tracing::error!(
                "Customer ID missing on subscription {}; cannot revoke",
                subscription.id
            );
            return;
        }
    };

    let mut user_id = subscription.metadata.get(USER_ID_METADATA_KEY).cloned();

    if user_id.is_none() {
        match customers.retrieve_customer(customer_id).await {
            Ok(customer) if !customer.deleted => {
                user_id = customer.metadata.get(USER_ID_METADATA_KEY).cloned();
            }
            Ok(_) => {} // deleted customer carries no usable metadata
            Err(e) => {
                tracing::error!(
                    "Error retrieving customer {} for subscription {}: {}",
                    customer_id,
                    subscription.id,
                    e
                );
            }
        }
    }

    let user_id = match user_id {
        Some(id) => id,
        None => {
            tracing::error!(
                "Could not determine user for subscription {} end event",
                subscription.id
            );
            return;
        }
    };

    if let Err(e) = revoke_full_subscription_balance(conn, &user_id, &subscription.id) {
        tracing::error!(
            "Error revoking remaining credits for subscription {}: {}",
            subscription.id,
            e
        );
    }
}

fn revoke_full_subscription_balance(
    conn: &mut Connection,
    user_id: &str,
    subscription_id: &str,
) -> Result<()> {
    // The end-of-subscription path takes the entire remaining balance, not
    // a plan-derived figure, and clears both allocation records: whatever
    // interval the plan had, any lingering allocation is stale now.
    let amount_to_revoke = queries::get_subscription_balance(conn, user_id)?.unwrap_or(0);

    if amount_to_revoke > 0 {
        apply_revocation(
            conn,
            &RevocationRequest {
                user_id: user_id.to_string(),
                target: BalanceKind::Subscription,
                amount_requested: amount_to_revoke,
                clear_monthly: true,
                clear_yearly: true,
                log_type: CreditLogType::SubscriptionEndedRevoke,
                notes: format!(
                    "Subscription {} ended; remaining credits revoked.",
                    subscription_id
                ),
                related_order_id: None,
            },
        )?;
    }

    tracing::info!(
        "Revoked remaining subscription credits on end for subscription {}, user {}",
        subscription_id,
        user_id
    );
    Ok(())
}

/// Revoke the one-time credits granted by a now-refunded order.
///
/// Only a full refund triggers revocation; partial refunds are logged and
/// skipped entirely. Credits are deliberately not pro-rated.
pub fn revoke_one_time_credits(
    conn: &mut Connection,
    charge: &ChargeEvent,
    original_order: &Order,
    refund_order_id: &str,
) {
    let is_full_refund = charge.amount_refunded.abs() == original_order.amount_total_cents;
    if !is_full_refund {
        tracing::info!(
            "Refund {} is not a full refund; skipping credit revocation. Refunded: {}, original total: {}",
            charge.id,
            charge.amount_refunded,
            original_order.amount_total_cents
        );
        return;
    }

    let plan = match queries::get_plan_by_id(conn, &original_order.plan_id) {
        Ok(Some(p)) => p,
        Ok(None) => {
            tracing::error!(
                "Plan {} not found during refund {}",
                original_order.plan_id,
                refund_order_id
            );
            return;
        }
        Err(e) => {
            tracing::error!(
                "Error fetching plan {} during refund {}: {}",
                original_order.plan_id,
                refund_order_id,
                e
            );
            return;
        }
    };

    let one_time_to_revoke = plan.benefits.one_time_credits.filter(|c| *c > 0).unwrap_or(0);
    if one_time_to_revoke == 0 {
        // Many plans legitimately grant zero one-time credits.
        tracing::info!(
            "No credits defined to revoke for plan {} on refund {}",
            plan.id,
            refund_order_id
        );
        return;
    }

    let request = RevocationRequest {
        user_id: original_order.user_id.clone(),
        target: BalanceKind::OneTime,
        amount_requested: one_time_to_revoke,
        // One-time credits have no allocation record to clear.
        clear_monthly: false,
        clear_yearly: false,
        log_type: CreditLogType::RefundRevoke,
        notes: format!("Full refund for order {}.", original_order.id),
        related_order_id: Some(original_order.id.clone()),
    };

    match apply_revocation(conn, &request) {
        Ok(_) => tracing::info!(
            "Revoked one-time credits for user {} related to refund {}",
            original_order.user_id,
            refund_order_id
        ),
        Err(e) => tracing::error!(
            "Error revoking credits for user {}, refund {}: {}",
            original_order.user_id,
            refund_order_id,
            e
        ),
    }
}

/// Revoke the subscription credits allocated for a now-refunded billing
/// period. Amount and allocation markers come entirely from
/// [`subscription_revoke_context`].
pub fn revoke_subscription_credits(
    conn: &mut Connection,
    charge: &ChargeEvent,
    original_order: &Order,
) {
    let result = revoke_subscription_order(conn, charge, original_order);
    if let Err(e) = result {
        tracing::error!(
            "Error revoking subscription credits for user {}, order {}: {}",
            original_order.user_id,
            original_order.id,
            e
        );
    }
}

fn revoke_subscription_order(
    conn: &mut Connection,
    charge: &ChargeEvent,
    original_order: &Order,
) -> Result<()> {
    let ctx = match subscription_revoke_context(
        conn,
        &original_order.plan_id,
        &original_order.user_id,
    )? {
        Some(ctx) => ctx,
        None => return Ok(()),
    };

    if ctx.amount_to_revoke > 0 {
        apply_revocation(
            conn,
            &RevocationRequest {
                user_id: original_order.user_id.clone(),
                target: BalanceKind::Subscription,
                amount_requested: ctx.amount_to_revoke,
                clear_monthly: ctx.clear_monthly,
                clear_yearly: ctx.clear_yearly,
                log_type: CreditLogType::RefundRevoke,
                notes: format!(
                    "Full refund for subscription order {}.",
                    original_order.id
                ),
                related_order_id: Some(original_order.id.clone()),
            },
        )?;

        tracing::info!(
            "Revoked subscription credits for user {} related to charge {}",
            original_order.user_id,
            charge.id
        );
    }

    Ok(())
}
