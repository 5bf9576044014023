//! Payment provider abstraction

use async_trait::async_trait;
use catering_types::{PaymentSession, SubscriptionId};

use crate::BillingError;

/// Payment provider trait
///
/// Abstracts hosted-payment-page creation so the lifecycle manager does not
/// depend on a concrete gateway.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a transaction and return the hosted payment page
    async fn create_transaction(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentSession, BillingError>;
}

/// Transaction to open on the gateway
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    /// Gateway order reference
    pub order_id: String,
    /// Amount in whole currency units
    pub gross_amount: i64,
    /// Subscription being paid for
    pub subscription_id: SubscriptionId,
    /// Paying customer
    pub customer: CustomerDetails,
    /// Line items; prices sum to `gross_amount`
    pub items: Vec<LineItem>,
}

/// Customer contact details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Single line item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub id: String,
    pub name: String,
    pub price: i64,
    pub quantity: i32,
}
