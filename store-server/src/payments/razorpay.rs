//! Razorpay gateway client
//!
//! Intent creation via `POST /v1/orders` (amount in paise, basic auth).
//! Callback verification is the shared HMAC scheme in the parent module.

use reqwest::Client;
use serde_json::{Value, json};

use super::{GatewayError, GatewayIntent, PaymentGateway};
use crate::orders::money::to_paise;

const API_URL: &str = "https://api.razorpay.com/v1";

pub struct RazorpayGateway {
    client: Client,
    key_id: String,
    key_secret: String,
}

impl RazorpayGateway {
    pub fn new(key_id: String, key_secret: String) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| GatewayError::Unavailable(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            key_id,
            key_secret,
        })
    }
}

#[async_trait::async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_intent(
        &self,
        amount: f64,
        receipt: &str,
    ) -> Result<GatewayIntent, GatewayError> {
        let payload = json!({
            "amount": to_paise(amount),
            "currency": "INR",
            "receipt": receipt,
        });

        let response = self
            .client
            .post(format!("{API_URL}/orders"))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Unavailable("Gateway request timed out".to_string())
                } else {
                    GatewayError::Unavailable(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_server_error() {
            return Err(GatewayError::Unavailable(format!(
                "Gateway returned {status}"
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected(format!(
                "Gateway returned {status}: {body}"
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;

        body.get("id")
            .and_then(Value::as_str)
            .map(|id| GatewayIntent {
                gateway_order_id: id.to_string(),
            })
            .ok_or_else(|| GatewayError::Malformed("No order id in response".to_string()))
    }

    fn secret(&self) -> &str {
        &self.key_secret
    }
}
