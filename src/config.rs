//! Application configuration loaded from environment variables.
//!
//! Secrets (JWT key, Stripe keys) are injected as environment variables by
//! the deployment and read once at startup.

use std::env;

/// Length of the free premium trial granted at sign-up.
pub const TRIAL_DAYS: i64 = 14;

/// Name of the session cookie carrying the JWT.
pub const SESSION_COOKIE: &str = "clarity_token";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL for CORS and Stripe redirects
    pub frontend_url: String,
    /// GCP project ID hosting Firestore
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Stripe price for the premium subscription
    pub stripe_price_id: String,

    // --- Secrets ---
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Stripe secret API key
    pub stripe_secret_key: String,
    /// Stripe webhook endpoint signing secret (`whsec_...`)
    pub stripe_webhook_secret: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            stripe_price_id: env::var("STRIPE_PRICE_ID")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("STRIPE_PRICE_ID"))?,

            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            stripe_secret_key: env::var("STRIPE_SECRET_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("STRIPE_SECRET_KEY"))?,
            stripe_webhook_secret: env::var("STRIPE_WEBHOOK_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("STRIPE_WEBHOOK_SECRET"))?,
        })
    }

    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            stripe_price_id: "price_test".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            stripe_secret_key: "sk_test_dummy".to_string(),
            stripe_webhook_secret: "whsec_test_secret".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
