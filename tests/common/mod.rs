//! Test utilities and fixtures for creditbook integration tests

#![allow(dead_code)]

use rusqlite::Connection;
use std::collections::HashMap;

pub use creditbook::db::{create_pool, init_db, queries, DbPool};
pub use creditbook::error::{AppError, Result};
pub use creditbook::handlers::revokes::{
    revoke_one_time_credits, revoke_remaining_subscription_credits_on_end,
    revoke_subscription_credits, subscription_revoke_context, RevokeContext,
};
pub use creditbook::ledger::{
    apply_revocation, BalanceKind, RevocationOutcome, RevocationRequest,
};
pub use creditbook::models::*;
pub use creditbook::payments::{ChargeEvent, CustomerDirectory, CustomerRecord, SubscriptionEvent};

/// Install a test subscriber so handler logging shows up under RUST_LOG.
/// Safe to call from every test; only the first call wins.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Create an in-memory test database with schema initialized
pub fn setup_test_db() -> Connection {
    init_test_logging();
    let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    init_db(&conn).expect("Failed to initialize schema");
    conn
}

/// Provision a balance row for a test user
pub fn create_test_usage(
    conn: &Connection,
    user_id: &str,
    one_time: i64,
    subscription: i64,
    details: BalanceDetails,
) -> UsageBalance {
    let input = CreateUsageBalance {
        user_id: user_id.to_string(),
        one_time_credits_balance: one_time,
        subscription_credits_balance: subscription,
        balance_details: details,
    };
    queries::create_usage_balance(conn, &input).expect("Failed to create test usage balance")
}

/// Create a test pricing plan
pub fn create_test_plan(
    conn: &Connection,
    name: &str,
    recurring_interval: Option<RecurringInterval>,
    benefits: PlanBenefits,
) -> PricingPlan {
    let input = CreatePricingPlan {
        name: name.to_string(),
        recurring_interval,
        benefits,
    };
    queries::create_pricing_plan(conn, &input).expect("Failed to create test plan")
}

/// Create and persist a test order
pub fn create_test_order(
    conn: &Connection,
    user_id: &str,
    plan_id: &str,
    order_type: OrderType,
    amount_total_cents: i64,
    subscription_id: Option<&str>,
) -> Order {
    let input = CreateOrder {
        user_id: user_id.to_string(),
        plan_id: plan_id.to_string(),
        order_type,
        amount_total_cents,
        subscription_id: subscription_id.map(|s| s.to_string()),
    };
    queries::create_order(conn, &input).expect("Failed to create test order")
}

/// Balance details with only a monthly allocation record
pub fn monthly_details(monthly_credits: i64) -> BalanceDetails {
    BalanceDetails {
        monthly_allocation: Some(AllocationDetails { monthly_credits }),
        ..Default::default()
    }
}

/// Balance details with only a yearly allocation record
pub fn yearly_details(monthly_credits: i64) -> BalanceDetails {
    BalanceDetails {
        yearly_allocation: Some(AllocationDetails { monthly_credits }),
        ..Default::default()
    }
}

/// Fetch the balance row for assertions, panicking if it is missing
pub fn get_usage(conn: &Connection, user_id: &str) -> UsageBalance {
    queries::get_usage_by_user(conn, user_id)
        .expect("usage query failed")
        .expect("usage row should exist")
}

/// Fetch all credit log rows for a user
pub fn get_logs(conn: &Connection, user_id: &str) -> Vec<CreditLogEntry> {
    queries::list_credit_logs_for_user(conn, user_id).expect("credit log query failed")
}

/// A refunded-charge event with the given cumulative refunded amount
pub fn charge_event(id: &str, amount_refunded: i64) -> ChargeEvent {
    ChargeEvent {
        id: id.to_string(),
        amount_refunded,
        currency: Some("usd".to_string()),
    }
}

/// A subscription-ended event, optionally carrying a user id in metadata
pub fn subscription_event(
    id: &str,
    customer: Option<&str>,
    user_id: Option<&str>,
) -> SubscriptionEvent {
    let mut metadata = HashMap::new();
    if let Some(uid) = user_id {
        metadata.insert("user_id".to_string(), uid.to_string());
    }
    SubscriptionEvent {
        id: id.to_string(),
        customer: customer.map(|c| c.to_string()),
        status: Some("canceled".to_string()),
        metadata,
    }
}

/// In-memory CustomerDirectory standing in for the provider API.
#[derive(Debug, Default)]
pub struct MockCustomerDirectory {
    customers: HashMap<String, CustomerRecord>,
    fail: bool,
}

impl MockCustomerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A directory whose lookups always fail, as if the provider API were down.
    pub fn failing() -> Self {
        Self {
            customers: HashMap::new(),
            fail: true,
        }
    }

    pub fn with_customer(mut self, id: &str, user_id: Option<&str>, deleted: bool) -> Self {
        let mut metadata = HashMap::new();
        if let Some(uid) = user_id {
            metadata.insert("user_id".to_string(), uid.to_string());
        }
        self.customers.insert(
            id.to_string(),
            CustomerRecord {
                id: id.to_string(),
                deleted,
                metadata,
            },
        );
        self
    }
}

impl CustomerDirectory for MockCustomerDirectory {
    async fn retrieve_customer(&self, customer_id: &str) -> Result<CustomerRecord> {
        if self.fail {
            return Err(AppError::Provider("customer lookup unavailable".into()));
        }
        self.customers
            .get(customer_id)
            .cloned()
            .ok_or_else(|| AppError::Provider(format!("No such customer: {}", customer_id)))
    }
}
