use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// One immutable audit row per balance mutation.
///
/// `amount` is signed and records the delta actually applied, which may be
/// smaller in magnitude than the amount a revocation requested when the
/// balance was insufficient. Rows are never updated or deleted; together
/// with the balances-after columns they reconcile the full balance history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditLogEntry {
    pub id: String,
    pub user_id: String,
    /// Negative for revocations.
    pub amount: i64,
    pub one_time_balance_after: i64,
    pub subscription_balance_after: i64,
    pub log_type: CreditLogType,
    pub notes: String,
    /// Back-reference to the order that triggered the mutation, if any.
    pub related_order_id: Option<String>,
    pub created_at: i64,
}

/// Classification of a credit log entry. Extendable for grant types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CreditLogType {
    SubscriptionEndedRevoke,
    RefundRevoke,
}

impl std::fmt::Display for CreditLogType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}
