//! Mock gateway for development and tests
//!
//! Intents are local identifiers; the signing secret is fixed so tests can
//! produce valid callbacks with [`super::sign`].

use super::{GatewayError, GatewayIntent, PaymentGateway};

/// Default signing secret when no gateway credentials are configured
pub const MOCK_GATEWAY_SECRET: &str = "mock-gateway-secret";

#[derive(Debug)]
pub struct MockGateway {
    secret: String,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            secret: MOCK_GATEWAY_SECRET.to_string(),
        }
    }

    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PaymentGateway for MockGateway {
    async fn create_intent(
        &self,
        amount: f64,
        receipt: &str,
    ) -> Result<GatewayIntent, GatewayError> {
        use rand::Rng;
        let id = format!("order_MOCK{:010}", rand::thread_rng().gen_range(0..10_000_000_000u64));
        tracing::info!(gateway_order_id = %id, amount, receipt, "Mock gateway created intent");
        Ok(GatewayIntent {
            gateway_order_id: id,
        })
    }

    fn secret(&self) -> &str {
        &self.secret
    }
}
