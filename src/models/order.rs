use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// A completed purchase. Owned by the purchase flow; this crate reads
/// orders to resolve the plan, user, and paid total for a refunded charge.
///
/// All amounts are integer minor units (cents). Refund comparisons are
/// exact integer equality - no decimal strings, no floating point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub plan_id: String,
    pub order_type: OrderType,
    pub amount_total_cents: i64,
    /// Provider subscription id for subscription orders.
    pub subscription_id: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderType {
    OneTime,
    Subscription,
}

/// Data required to create an order
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrder {
    pub user_id: String,
    pub plan_id: String,
    pub order_type: OrderType,
    pub amount_total_cents: i64,
    pub subscription_id: Option<String>,
}
