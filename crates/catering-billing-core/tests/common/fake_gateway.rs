//! Recording payment gateway for testing

use async_trait::async_trait;
use catering_billing_core::{BillingError, PaymentProvider, PaymentRequest, PaymentSession};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Payment provider that records every request instead of calling Midtrans
#[derive(Default, Clone)]
pub struct FakeGateway {
    requests: Arc<Mutex<Vec<PaymentRequest>>>,
    fail: Arc<AtomicBool>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following call fail
    #[allow(dead_code)]
    pub fn fail_next_calls(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<PaymentRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentProvider for FakeGateway {
    async fn create_transaction(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentSession, BillingError> {
        self.requests.lock().unwrap().push(request.clone());

        if self.fail.load(Ordering::SeqCst) {
            return Err(BillingError::ProviderError(
                "Midtrans API error: 503 Service Unavailable".to_string(),
            ));
        }

        let token = format!("token-{}", request.order_id);
        Ok(PaymentSession {
            redirect_url: format!("https://app.sandbox.midtrans.com/snap/v4/redirection/{token}"),
            token,
        })
    }
}
