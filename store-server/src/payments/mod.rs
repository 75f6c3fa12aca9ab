//! Payment Gateway Integration
//!
//! [`PaymentGateway`] covers the two things the pipeline needs from the
//! gateway: registering a payment intent for the authoritative amount at
//! checkout, and verifying callback signatures before an order is marked
//! paid. The signature scheme (HMAC-SHA256 over
//! `"{gateway_order_id}|{gateway_payment_id}"`, hex) is gateway math shared
//! by the real client and the mock — only intent creation differs.

pub mod mock;
pub mod razorpay;

use thiserror::Error;

pub use mock::MockGateway;
pub use razorpay::RazorpayGateway;

use crate::utils::AppError;

/// Payment intent registered with the gateway at checkout time
#[derive(Debug, Clone)]
pub struct GatewayIntent {
    pub gateway_order_id: String,
}

/// Gateway failure modes
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Timeout or transport failure — retryable
    #[error("Gateway unavailable: {0}")]
    Unavailable(String),

    /// Gateway rejected the request
    #[error("Gateway rejected request: {0}")]
    Rejected(String),

    /// Response arrived but could not be interpreted
    #[error("Malformed gateway response: {0}")]
    Malformed(String),
}

impl From<GatewayError> for AppError {
    fn from(e: GatewayError) -> Self {
        AppError::Internal(e.to_string())
    }
}

/// Compute the callback signature for an intent/payment pair.
///
/// Exposed so the mock gateway and tests can produce valid callbacks.
pub fn sign(secret: &str, gateway_order_id: &str, gateway_payment_id: &str) -> String {
    let key = ring::hmac::Key::new(ring::hmac::HMAC_SHA256, secret.as_bytes());
    let payload = format!("{gateway_order_id}|{gateway_payment_id}");
    let tag = ring::hmac::sign(&key, payload.as_bytes());
    hex::encode(tag.as_ref())
}

/// Payment gateway seam.
#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Register a payment intent for the given amount (₹) with the gateway.
    ///
    /// Called at checkout with the server-computed total; the returned
    /// `gateway_order_id` is what later callbacks are signed against.
    async fn create_intent(&self, amount: f64, receipt: &str)
    -> Result<GatewayIntent, GatewayError>;

    /// Webhook/callback signing secret.
    fn secret(&self) -> &str;

    /// Verify a callback signature in constant time.
    fn verify_signature(
        &self,
        gateway_order_id: &str,
        gateway_payment_id: &str,
        signature: &str,
    ) -> bool {
        let expected = sign(self.secret(), gateway_order_id, gateway_payment_id);
        ring::constant_time::verify_slices_are_equal(expected.as_bytes(), signature.as_bytes())
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSecret;

    #[async_trait::async_trait]
    impl PaymentGateway for FixedSecret {
        async fn create_intent(
            &self,
            _amount: f64,
            _receipt: &str,
        ) -> Result<GatewayIntent, GatewayError> {
            unreachable!()
        }

        fn secret(&self) -> &str {
            "test-secret"
        }
    }

    #[test]
    fn test_signature_round_trip() {
        let gw = FixedSecret;
        let sig = sign("test-secret", "order_1", "pay_1");
        assert!(gw.verify_signature("order_1", "pay_1", &sig));
    }

    #[test]
    fn test_signature_tamper_rejected() {
        let gw = FixedSecret;
        let sig = sign("test-secret", "order_1", "pay_1");
        // Signature bound to a different payment
        assert!(!gw.verify_signature("order_1", "pay_2", &sig));
        // Wrong secret
        let forged = sign("other-secret", "order_1", "pay_1");
        assert!(!gw.verify_signature("order_1", "pay_1", &forged));
        // Truncated
        assert!(!gw.verify_signature("order_1", "pay_1", &sig[..10]));
    }
}
