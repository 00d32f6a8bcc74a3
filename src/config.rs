use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    /// Secret key for the Stripe API. Absent in deployments that only
    /// replay persisted events (e.g. backfills), in which case the
    /// customer-lookup fallback is unavailable.
    pub stripe_secret_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "creditbook.db".to_string()),
            stripe_secret_key: env::var("STRIPE_SECRET_KEY").ok(),
        }
    }
}
