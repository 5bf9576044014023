//! Midtrans payment notification handling

use catering_types::LifecycleEvent;
use serde_json::Value;
use sha2::{Digest, Sha512};
use tracing::{debug, warn};

use crate::error::BillingError;

/// Gateway transaction statuses we understand
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Card payment captured
    Capture,
    /// Funds settled
    Settlement,
    /// Waiting for the customer
    Pending,
    /// Cancelled by the merchant or the gateway
    Cancel,
    /// Payment page expired
    Expire,
    /// Payment failed
    Failure,
    /// Anything else (`deny`, `refund`, ...)
    Other(String),
}

impl From<&str> for TransactionStatus {
    fn from(s: &str) -> Self {
        match s {
            "capture" => Self::Capture,
            "settlement" => Self::Settlement,
            "pending" => Self::Pending,
            "cancel" => Self::Cancel,
            "expire" => Self::Expire,
            "failure" => Self::Failure,
            other => Self::Other(other.to_string()),
        }
    }
}

impl TransactionStatus {
    /// Lifecycle event this status maps to; `None` means ignore
    pub fn event(&self) -> Option<LifecycleEvent> {
        match self {
            Self::Capture | Self::Settlement => Some(LifecycleEvent::PaymentSettled),
            Self::Cancel | Self::Expire | Self::Failure => Some(LifecycleEvent::PaymentVoided),
            Self::Pending => Some(LifecycleEvent::PaymentPending),
            Self::Other(_) => None,
        }
    }

    /// Raw gateway value
    pub fn as_str(&self) -> &str {
        match self {
            Self::Capture => "capture",
            Self::Settlement => "settlement",
            Self::Pending => "pending",
            Self::Cancel => "cancel",
            Self::Expire => "expire",
            Self::Failure => "failure",
            Self::Other(s) => s,
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed payment notification
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentNotification {
    /// Gateway order reference
    pub order_id: String,
    /// Transaction status
    pub transaction_status: TransactionStatus,
    /// HTTP-style status code reported by the gateway
    pub status_code: Option<String>,
    /// Amount as formatted by the gateway (e.g. `"774000.00"`)
    pub gross_amount: Option<String>,
    /// SHA-512 signature over the notification
    pub signature_key: Option<String>,
}

impl PaymentNotification {
    /// Extract a notification from an untyped JSON payload.
    ///
    /// `order_id` and `transaction_status` must be present and be strings;
    /// the signature fields are optional here and checked by
    /// [`NotificationVerifier`].
    pub fn from_value(payload: &Value) -> Result<Self, BillingError> {
        let order_id = required_str(payload, "order_id")?;
        let transaction_status = required_str(payload, "transaction_status")?;

        debug!(order_id = %order_id, transaction_status = %transaction_status, "Parsed payment notification");

        Ok(Self {
            order_id: order_id.to_string(),
            transaction_status: TransactionStatus::from(transaction_status),
            status_code: optional_str(payload, "status_code"),
            gross_amount: optional_str(payload, "gross_amount"),
            signature_key: optional_str(payload, "signature_key"),
        })
    }
}

fn required_str<'a>(payload: &'a Value, field: &str) -> Result<&'a str, BillingError> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| BillingError::InvalidPayload(format!("{field} must be a string")))
}

fn optional_str(payload: &Value, field: &str) -> Option<String> {
    payload.get(field).and_then(Value::as_str).map(str::to_string)
}

/// Verifies notification signatures with the merchant server key
#[derive(Clone)]
pub struct NotificationVerifier {
    server_key: String,
}

impl NotificationVerifier {
    /// Create a new verifier
    pub fn new(server_key: impl Into<String>) -> Self {
        Self {
            server_key: server_key.into(),
        }
    }

    /// `hex(SHA-512(order_id + status_code + gross_amount + server_key))`
    pub fn expected_signature(&self, order_id: &str, status_code: &str, gross_amount: &str) -> String {
        let mut hasher = Sha512::new();
        hasher.update(order_id.as_bytes());
        hasher.update(status_code.as_bytes());
        hasher.update(gross_amount.as_bytes());
        hasher.update(self.server_key.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Check a notification's `signature_key`
    pub fn verify(&self, notification: &PaymentNotification) -> Result<(), BillingError> {
        let (Some(status_code), Some(gross_amount)) =
            (&notification.status_code, &notification.gross_amount)
        else {
            return Err(BillingError::InvalidPayload(
                "status_code and gross_amount are required for signature verification".to_string(),
            ));
        };

        let signature = notification.signature_key.as_deref().ok_or_else(|| {
            warn!(order_id = %notification.order_id, "Notification without signature_key");
            BillingError::InvalidSignature
        })?;

        let expected = self.expected_signature(&notification.order_id, status_code, gross_amount);

        if !constant_time_eq(signature.as_bytes(), expected.as_bytes()) {
            warn!(order_id = %notification.order_id, "Notification signature verification failed");
            return Err(BillingError::InvalidSignature);
        }

        Ok(())
    }
}

/// Constant-time comparison
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            TransactionStatus::from("settlement").event(),
            Some(LifecycleEvent::PaymentSettled)
        );
        assert_eq!(
            TransactionStatus::from("capture").event(),
            Some(LifecycleEvent::PaymentSettled)
        );
        for voided in ["cancel", "expire", "failure"] {
            assert_eq!(
                TransactionStatus::from(voided).event(),
                Some(LifecycleEvent::PaymentVoided)
            );
        }
        assert_eq!(
            TransactionStatus::from("pending").event(),
            Some(LifecycleEvent::PaymentPending)
        );
        assert_eq!(TransactionStatus::from("deny").event(), None);
        assert_eq!(TransactionStatus::from("deny").as_str(), "deny");
    }

    #[test]
    fn test_from_value_requires_string_fields() {
        let ok = json!({"order_id": "SUBS-1", "transaction_status": "settlement"});
        let parsed = PaymentNotification::from_value(&ok).unwrap();
        assert_eq!(parsed.order_id, "SUBS-1");
        assert_eq!(parsed.transaction_status, TransactionStatus::Settlement);
        assert!(parsed.signature_key.is_none());

        let missing = json!({"transaction_status": "settlement"});
        assert!(PaymentNotification::from_value(&missing)
            .unwrap_err()
            .is_bad_request());

        let not_string = json!({"order_id": 42, "transaction_status": "settlement"});
        assert!(PaymentNotification::from_value(&not_string).is_err());

        let not_object = json!(["order_id", "transaction_status"]);
        assert!(PaymentNotification::from_value(&not_object).is_err());
    }

    #[test]
    fn test_signature_verification() {
        let verifier = NotificationVerifier::new("SB-Mid-server-test");
        let signature = verifier.expected_signature("SUBS-1", "200", "774000.00");
        assert_eq!(signature.len(), 128);

        let payload = json!({
            "order_id": "SUBS-1",
            "transaction_status": "settlement",
            "status_code": "200",
            "gross_amount": "774000.00",
            "signature_key": signature,
        });
        let notification = PaymentNotification::from_value(&payload).unwrap();
        assert!(verifier.verify(&notification).is_ok());

        let mut tampered = notification.clone();
        tampered.gross_amount = Some("1.00".to_string());
        assert!(matches!(
            verifier.verify(&tampered),
            Err(BillingError::InvalidSignature)
        ));

        let mut unsigned = notification;
        unsigned.signature_key = None;
        assert!(matches!(
            verifier.verify(&unsigned),
            Err(BillingError::InvalidSignature)
        ));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
    }
}
