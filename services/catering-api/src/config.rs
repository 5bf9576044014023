//! Configuration for the Catering API service.

use catering_billing_core::BillingConfig;
use std::time::Duration;

/// Catering API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,
    /// Database URL
    pub database_url: String,
    /// Database pool size
    pub database_max_connections: u32,
    /// HS256 secret shared with the auth service that issues access tokens
    pub access_secret: String,
    /// Billing core configuration
    pub billing: BillingConfig,
    /// Run the daily expiry sweep
    pub sweep_enabled: bool,
    /// Request timeout
    pub request_timeout: Duration,
    /// Metrics enabled
    pub metrics_enabled: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Database
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let database_max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("DATABASE_MAX_CONNECTIONS"))?;

        // Server
        let http_port = std::env::var("HTTP_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("HTTP_PORT"))?;

        let access_secret =
            std::env::var("ACCESS_SECRET").map_err(|_| ConfigError::Missing("ACCESS_SECRET"))?;

        // Midtrans
        let server_key = std::env::var("MIDTRANS_SERVER_KEY")
            .map_err(|_| ConfigError::Missing("MIDTRANS_SERVER_KEY"))?;

        let production = std::env::var("MIDTRANS_PRODUCTION")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("MIDTRANS_PRODUCTION"))?;

        let payment_duration_minutes = std::env::var("MIDTRANS_PAYMENT_DURATION_MINUTES")
            .unwrap_or_else(|_| "1440".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("MIDTRANS_PAYMENT_DURATION_MINUTES"))?;

        let verify_signature = std::env::var("MIDTRANS_VERIFY_SIGNATURE")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("MIDTRANS_VERIFY_SIGNATURE"))?;

        // Catalog cache
        let cache_ttl_secs: u64 = std::env::var("MEAL_PLAN_CACHE_TTL_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("MEAL_PLAN_CACHE_TTL_SECS"))?;

        let sweep_enabled = std::env::var("SWEEP_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("SWEEP_ENABLED"))?;

        // Request timeout
        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("REQUEST_TIMEOUT_SECS"))?;

        // Metrics
        let metrics_enabled = std::env::var("METRICS_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);

        let billing = BillingConfig::new(server_key)
            .with_production(production)
            .with_payment_duration_minutes(payment_duration_minutes)
            .with_signature_verification(verify_signature)
            .with_catalog_cache_ttl(Duration::from_secs(cache_ttl_secs));

        Ok(Self {
            http_port,
            database_url,
            database_max_connections,
            access_secret,
            billing,
            sweep_enabled,
            request_timeout: Duration::from_secs(request_timeout_secs),
            metrics_enabled,
        })
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
