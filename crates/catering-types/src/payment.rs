//! Payment gateway handles

use serde::{Deserialize, Serialize};

/// Hosted payment page returned by the gateway after a transaction is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSession {
    /// Gateway transaction token
    pub token: String,
    /// URL the customer is redirected to in order to pay
    pub redirect_url: String,
}
