use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// A pricing plan. Owned by plan administration; this crate only reads the
/// benefit definition and recurring interval to compute revocation amounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingPlan {
    pub id: String,
    pub name: String,
    /// `None` for one-time purchase plans.
    pub recurring_interval: Option<RecurringInterval>,
    pub benefits: PlanBenefits,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RecurringInterval {
    Month,
    Year,
}

/// Benefit definition stored as JSON on the plan. Fields this crate does
/// not understand are ignored rather than rejected, so plans can carry
/// additional benefits for other subsystems.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanBenefits {
    /// Credits granted once at purchase for one-time plans.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub one_time_credits: Option<i64>,
    /// Credits granted per month for recurring plans.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_credits: Option<i64>,
}

/// Data required to create a pricing plan
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePricingPlan {
    pub name: String,
    pub recurring_interval: Option<RecurringInterval>,
    pub benefits: PlanBenefits,
}
