use std::collections::HashMap;

use reqwest::Client;
use serde::Deserialize;

use crate::error::{AppError, Result};

/// Lookup interface for the payment provider's customer records.
///
/// The subscription-end handler falls back to this when the subscription
/// itself carries no user id in its metadata. Tests substitute an
/// in-memory implementation.
#[allow(async_fn_in_trait)]
pub trait CustomerDirectory {
    async fn retrieve_customer(&self, customer_id: &str) -> Result<CustomerRecord>;
}

/// Customer record as returned by the provider.
///
/// Deleted customers come back as a tombstone with `deleted: true` and no
/// metadata; callers must not read identity out of them.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerRecord {
    pub id: String,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// customer.subscription.* payload, reduced to the fields this core reads.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionEvent {
    pub id: String,
    pub customer: Option<String>,
    pub status: Option<String>, // "active", "canceled", etc.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// charge.refunded payload, reduced to the fields this core reads.
/// `amount_refunded` is the cumulative refunded total in minor units.
#[derive(Debug, Clone, Deserialize)]
pub struct ChargeEvent {
    pub id: String,
    pub amount_refunded: i64,
    pub currency: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StripeClient {
    client: Client,
    secret_key: String,
}

impl StripeClient {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            secret_key: secret_key.into(),
        }
    }
}

impl CustomerDirectory for StripeClient {
    async fn retrieve_customer(&self, customer_id: &str) -> Result<CustomerRecord> {
        let response = self
            .client
            .get(format!(
                "https://api.stripe.com/v1/customers/{}",
                customer_id
            ))
            .basic_auth(&self.secret_key, None::<&str>)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Stripe API error: {}", e)))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Provider(format!(
                "Stripe API error: {}",
                error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to parse Stripe response: {}", e)))
    }
}
