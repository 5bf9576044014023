//! Midtrans Snap payment provider implementation

use async_trait::async_trait;
use catering_types::PaymentSession;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::config::BillingConfig;
use crate::error::BillingError;
use crate::provider::{PaymentProvider, PaymentRequest};

const SNAP_TRANSACTIONS_PATH: &str = "/snap/v1/transactions";
const EXPIRY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Midtrans Snap payment provider
#[derive(Clone)]
pub struct MidtransProvider {
    client: Client,
    config: BillingConfig,
}

impl MidtransProvider {
    /// Create a new Midtrans provider
    pub fn new(config: BillingConfig) -> Self {
        let client = Client::new();
        Self { client, config }
    }

    /// Make authenticated JSON request to Snap
    async fn snap_request<B: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, BillingError> {
        let url = format!("{}{endpoint}", self.config.snap_base_url());

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.server_key, Option::<&str>::None)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Midtrans API request failed");
                BillingError::ProviderError(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Midtrans API error");
            return Err(BillingError::ProviderError(format!(
                "Midtrans API error: {status}"
            )));
        }

        response.json::<T>().await.map_err(|e| {
            error!(error = %e, "Failed to parse Midtrans response");
            BillingError::ProviderError(e.to_string())
        })
    }

    fn snap_body(&self, request: &PaymentRequest) -> SnapTransaction {
        SnapTransaction {
            transaction_details: TransactionDetails {
                order_id: request.order_id.clone(),
                gross_amount: request.gross_amount,
            },
            customer_details: CustomerDetails {
                first_name: request.customer.name.clone(),
                email: request.customer.email.clone(),
                phone: request.customer.phone.clone(),
            },
            item_details: request
                .items
                .iter()
                .map(|item| ItemDetails {
                    id: item.id.clone(),
                    price: item.price,
                    quantity: item.quantity,
                    name: item.name.clone(),
                })
                .collect(),
            expiry: Expiry {
                start_time: Utc::now().format(EXPIRY_TIME_FORMAT).to_string(),
                unit: "minutes",
                duration: self.config.payment_duration_minutes,
            },
            custom_field1: request.subscription_id.to_string(),
        }
    }
}

#[async_trait]
impl PaymentProvider for MidtransProvider {
    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    async fn create_transaction(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentSession, BillingError> {
        debug!(gross_amount = request.gross_amount, "Creating Snap transaction");

        let body = self.snap_body(request);
        let snap: SnapResponse = self.snap_request(SNAP_TRANSACTIONS_PATH, &body).await?;

        Ok(PaymentSession {
            token: snap.token,
            redirect_url: snap.redirect_url,
        })
    }
}

// Snap API request/response types

/// Snap transaction request
#[derive(Debug, Clone, Serialize)]
pub struct SnapTransaction {
    pub transaction_details: TransactionDetails,
    pub customer_details: CustomerDetails,
    pub item_details: Vec<ItemDetails>,
    pub expiry: Expiry,
    pub custom_field1: String,
}

/// Order reference and amount
#[derive(Debug, Clone, Serialize)]
pub struct TransactionDetails {
    pub order_id: String,
    pub gross_amount: i64,
}

/// Customer shown on the payment page
#[derive(Debug, Clone, Serialize)]
pub struct CustomerDetails {
    pub first_name: String,
    pub email: String,
    pub phone: String,
}

/// Snap line item
#[derive(Debug, Clone, Serialize)]
pub struct ItemDetails {
    pub id: String,
    pub price: i64,
    pub quantity: i32,
    pub name: String,
}

/// Payment page expiry
#[derive(Debug, Clone, Serialize)]
pub struct Expiry {
    pub start_time: String,
    pub unit: &'static str,
    pub duration: u32,
}

/// Snap transaction response
#[derive(Debug, Clone, Deserialize)]
pub struct SnapResponse {
    /// Snap token
    pub token: String,
    /// Hosted payment page
    pub redirect_url: String,
}
