//! Billing configuration

use std::time::Duration;

const SANDBOX_SNAP_URL: &str = "https://app.sandbox.midtrans.com";
const PRODUCTION_SNAP_URL: &str = "https://app.midtrans.com";

/// Billing service configuration
#[derive(Debug, Clone)]
pub struct BillingConfig {
    /// Midtrans server key, used for basic auth and notification signatures
    pub server_key: String,
    /// Whether to talk to the production Snap endpoint
    pub production: bool,
    /// How long the hosted payment page stays valid
    pub payment_duration_minutes: u32,
    /// Verify `signature_key` on inbound notifications
    pub verify_signature: bool,
    /// Meal plan catalog cache TTL
    pub catalog_cache_ttl: Duration,
    /// Overrides the Snap base URL (tests point this at a mock server)
    pub snap_url_override: Option<String>,
}

impl BillingConfig {
    /// Create a new billing config for the sandbox environment
    pub fn new(server_key: impl Into<String>) -> Self {
        Self {
            server_key: server_key.into(),
            production: false,
            payment_duration_minutes: 1440,
            verify_signature: true,
            catalog_cache_ttl: Duration::from_secs(3600),
            snap_url_override: None,
        }
    }

    /// Switch between sandbox and production
    pub fn with_production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }

    /// Set hosted payment page expiry
    pub fn with_payment_duration_minutes(mut self, minutes: u32) -> Self {
        self.payment_duration_minutes = minutes;
        self
    }

    /// Enable or disable notification signature checks
    pub fn with_signature_verification(mut self, verify: bool) -> Self {
        self.verify_signature = verify;
        self
    }

    /// Set catalog cache TTL
    pub fn with_catalog_cache_ttl(mut self, ttl: Duration) -> Self {
        self.catalog_cache_ttl = ttl;
        self
    }

    /// Override the Snap base URL
    pub fn with_snap_url_override(mut self, url: impl Into<String>) -> Self {
        self.snap_url_override = Some(url.into());
        self
    }

    /// Snap base URL for the configured environment
    pub fn snap_base_url(&self) -> &str {
        match &self.snap_url_override {
            Some(url) => url,
            None if self.production => PRODUCTION_SNAP_URL,
            None => SANDBOX_SNAP_URL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_base_url_follows_environment() {
        let config = BillingConfig::new("key");
        assert_eq!(config.snap_base_url(), SANDBOX_SNAP_URL);

        let config = config.with_production(true);
        assert_eq!(config.snap_base_url(), PRODUCTION_SNAP_URL);

        let config = config.with_snap_url_override("http://127.0.0.1:9999");
        assert_eq!(config.snap_base_url(), "http://127.0.0.1:9999");
    }
}
