use rusqlite::Connection;

/// Initialize the database schema
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- Per-user credit balances. One row per user.
        -- balance_details: JSON allocation snapshot (monthly/yearly records)
        CREATE TABLE IF NOT EXISTS usage_balances (
            user_id TEXT PRIMARY KEY,
            one_time_credits_balance INTEGER NOT NULL DEFAULT 0 CHECK (one_time_credits_balance >= 0),
            subscription_credits_balance INTEGER NOT NULL DEFAULT 0 CHECK (subscription_credits_balance >= 0),
            balance_details TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        -- Append-only audit trail of balance mutations.
        -- amount is signed: negative for revocations, and records the delta
        -- actually applied, never the amount requested.
        CREATE TABLE IF NOT EXISTS credit_logs (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            amount INTEGER NOT NULL,
            one_time_balance_after INTEGER NOT NULL,
            subscription_balance_after INTEGER NOT NULL,
            log_type TEXT NOT NULL,
            notes TEXT NOT NULL,
            related_order_id TEXT,
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_credit_logs_user ON credit_logs(user_id);
        CREATE INDEX IF NOT EXISTS idx_credit_logs_order ON credit_logs(related_order_id) WHERE related_order_id IS NOT NULL;

        -- Pricing plans (owned by plan administration; read-only here)
        CREATE TABLE IF NOT EXISTS pricing_plans (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            recurring_interval TEXT CHECK (recurring_interval IS NULL OR recurring_interval IN ('month', 'year')),
            benefits TEXT,
            created_at INTEGER NOT NULL
        );

        -- Orders (owned by the purchase flow; read-only here)
        -- amount_total_cents: integer minor units, no decimal strings
        CREATE TABLE IF NOT EXISTS orders (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            plan_id TEXT NOT NULL REFERENCES pricing_plans(id),
            order_type TEXT NOT NULL CHECK (order_type IN ('one_time', 'subscription')),
            amount_total_cents INTEGER NOT NULL,
            subscription_id TEXT,
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_orders_user ON orders(user_id);
        CREATE INDEX IF NOT EXISTS idx_orders_subscription ON orders(subscription_id) WHERE subscription_id IS NOT NULL;
        "#,
    )
}
