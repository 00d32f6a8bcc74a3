use serde::{Deserialize, Serialize};

/// Per-user credit balances. One row per user; the single shared mutable
/// resource in the system. Both balances are always >= 0 and change only
/// through the ledger mutator (revocations here, grants elsewhere).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageBalance {
    pub user_id: String,
    pub one_time_credits_balance: i64,
    pub subscription_credits_balance: i64,
    /// Structured allocation snapshot, stored as JSON in the database and
    /// validated at the read boundary.
    pub balance_details: BalanceDetails,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Allocation-detail snapshot for a user's recurring credit grants.
/// Zero, one, or both records may be present; each is cleared as a unit
/// when its interval is revoked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_allocation: Option<AllocationDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yearly_allocation: Option<AllocationDetails>,
    /// Keys owned by other subsystems sharing this column. Carried through
    /// every mutation untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationDetails {
    /// Credits granted per month under this allocation. A yearly allocation
    /// also records its grant here, as the monthly-equivalent figure
    /// allocated at subscription start.
    pub monthly_credits: i64,
}

/// Data required to provision a usage balance row
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUsageBalance {
    pub user_id: String,
    pub one_time_credits_balance: i64,
    pub subscription_credits_balance: i64,
    pub balance_details: BalanceDetails,
}
