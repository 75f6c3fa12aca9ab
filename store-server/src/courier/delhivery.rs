//! Delhivery HTTP client
//!
//! Wire format per the Delhivery CMU/tracking APIs:
//! - booking: POST `{base}/cmu/creation/api/v1/` with a shipments + pickup
//!   payload, waybill at `packages[0].waybill`
//! - tracking: GET `{base}/api/v1/packages/json/?waybill=` with scans at
//!   `ShipmentData[0].Shipment.Scans`
//! - label: GET `{base}/api/p/packing_slip?wbns=&pdf=true`

use chrono::{DateTime, NaiveDateTime};
use reqwest::Client;
use serde_json::{Value, json};

use super::{CourierClient, CourierError, ScanEvent, ShipmentRequest};
use crate::core::config::PickupLocation;
use crate::pricing::PRODUCT_NAME;

const PRODUCTION_URL: &str = "https://track.delhivery.com";
const STAGING_URL: &str = "https://staging-express.delhivery.com";

/// Real carrier client. Requests carry a bounded timeout; a timeout is a
/// booking failure, never a silent success.
pub struct DelhiveryCourier {
    client: Client,
    base_url: String,
    api_key: String,
    pickup: PickupLocation,
}

impl DelhiveryCourier {
    pub fn new(
        api_key: String,
        production: bool,
        pickup: PickupLocation,
    ) -> Result<Self, CourierError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| CourierError::Unavailable(format!("Failed to build HTTP client: {e}")))?;

        let base_url = if production {
            PRODUCTION_URL.to_string()
        } else {
            STAGING_URL.to_string()
        };

        Ok(Self {
            client,
            base_url,
            api_key,
            pickup,
        })
    }
}

fn transport_error(e: reqwest::Error) -> CourierError {
    if e.is_timeout() {
        CourierError::Unavailable("Carrier request timed out".to_string())
    } else {
        CourierError::Unavailable(e.to_string())
    }
}

/// Parse a carrier scan timestamp (RFC 3339 or naive ISO) to Unix millis.
fn parse_scan_time(raw: &str) -> i64 {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.timestamp_millis();
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive.and_utc().timestamp_millis();
    }
    tracing::warn!(raw = %raw, "Unparseable carrier scan timestamp");
    0
}

#[async_trait::async_trait]
impl CourierClient for DelhiveryCourier {
    async fn book(&self, request: &ShipmentRequest) -> Result<String, CourierError> {
        let payload = json!({
            "format": "json",
            "data": {
                "shipments": [{
                    "name": request.customer_name,
                    "add": request.address,
                    "pin": request.pincode,
                    "phone": request.phone_number,
                    "order": request.order_id,
                    "payment_mode": request.payment_mode.as_str(),
                    "products_desc": PRODUCT_NAME,
                    "cod_amount": request.cod_amount,
                    "weight": request.weight_kg * 1000.0,
                }],
                "pickup_location": {
                    "name": self.pickup.name,
                    "add": self.pickup.address,
                    "pin": self.pickup.pincode,
                    "phone": self.pickup.phone,
                }
            }
        });

        let response = self
            .client
            .post(format!("{}/cmu/creation/api/v1/", self.base_url))
            .header("Authorization", format!("Token {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_server_error() {
            return Err(CourierError::Unavailable(format!(
                "Carrier returned {status}"
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CourierError::Rejected(format!(
                "Carrier returned {status}: {body}"
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| CourierError::Malformed(e.to_string()))?;

        if let Some(waybill) = body
            .pointer("/packages/0/waybill")
            .and_then(Value::as_str)
            .filter(|w| !w.is_empty())
        {
            return Ok(waybill.to_string());
        }

        // Booking-level failure comes back 200 with per-package remarks
        let remarks = body
            .pointer("/packages/0/remarks")
            .map(Value::to_string)
            .unwrap_or_else(|| "no waybill in response".to_string());
        Err(CourierError::Rejected(remarks))
    }

    async fn track(&self, waybill: &str) -> Result<Vec<ScanEvent>, CourierError> {
        let response = self
            .client
            .get(format!(
                "{}/api/v1/packages/json/?waybill={}&token={}",
                self.base_url, waybill, self.api_key
            ))
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(CourierError::Unavailable(format!(
                "Carrier returned {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| CourierError::Malformed(e.to_string()))?;

        let scans = match body.pointer("/ShipmentData/0/Shipment/Scans") {
            Some(Value::Array(scans)) => scans,
            // No shipment data yet — not an error, just no events
            _ => return Ok(Vec::new()),
        };

        let events = scans
            .iter()
            .filter_map(|scan| {
                let detail = scan.get("ScanDetail")?;
                Some(ScanEvent {
                    timestamp: detail
                        .get("ScanDateTime")
                        .and_then(Value::as_str)
                        .map(parse_scan_time)
                        .unwrap_or(0),
                    location: detail
                        .get("ScannedLocation")
                        .and_then(Value::as_str)
                        .unwrap_or("")
                        .to_string(),
                    description: detail
                        .get("Scan")
                        .or_else(|| detail.get("Instructions"))
                        .and_then(Value::as_str)
                        .unwrap_or("")
                        .to_string(),
                })
            })
            .collect();

        Ok(events)
    }

    async fn label_url(&self, waybill: &str) -> Result<Option<String>, CourierError> {
        let response = self
            .client
            .get(format!(
                "{}/api/p/packing_slip?wbns={}&pdf=true",
                self.base_url, waybill
            ))
            .header("Authorization", format!("Token {}", self.api_key))
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Ok(None);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| CourierError::Malformed(e.to_string()))?;

        Ok(body
            .pointer("/packages/0/pdf_download_link")
            .and_then(Value::as_str)
            .map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scan_time() {
        assert!(parse_scan_time("2025-09-23T09:30:00+05:30") > 0);
        assert!(parse_scan_time("2025-09-23T09:30:00.000000") > 0);
        assert_eq!(parse_scan_time("not a date"), 0);
    }
}
