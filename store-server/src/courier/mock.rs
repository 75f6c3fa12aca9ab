//! Deterministic fake courier for development and tests
//!
//! Used whenever no carrier API key is configured. Waybills are "DL" + 9
//! digits so mock shipments are recognizable in the admin console.

use super::{CourierClient, CourierError, ScanEvent, ShipmentRequest};

#[derive(Debug, Default)]
pub struct MockCourier;

impl MockCourier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl CourierClient for MockCourier {
    async fn book(&self, request: &ShipmentRequest) -> Result<String, CourierError> {
        use rand::Rng;
        let awb = format!("DL{}", rand::thread_rng().gen_range(100_000_000..1_000_000_000));
        tracing::info!(
            order_id = %request.order_id,
            awb = %awb,
            "Mock courier booked shipment"
        );
        Ok(awb)
    }

    async fn track(&self, _waybill: &str) -> Result<Vec<ScanEvent>, CourierError> {
        Ok(vec![ScanEvent {
            timestamp: shared::util::now_millis(),
            location: "Mahabaleshwar".to_string(),
            description: "Picked Up".to_string(),
        }])
    }

    async fn label_url(&self, _waybill: &str) -> Result<Option<String>, CourierError> {
        Ok(Some(
            "https://www.delhivery.com/sample_label.pdf".to_string(),
        ))
    }
}
