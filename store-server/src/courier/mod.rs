//! Courier Integration
//!
//! [`CourierClient`] is the single seam to the carrier. The real HTTP client
//! ([`delhivery::DelhiveryCourier`]) and the deterministic fake
//! ([`mock::MockCourier`]) are chosen once at construction time from config;
//! business logic only ever sees the trait.

pub mod delhivery;
pub mod mock;

use serde::Serialize;
use thiserror::Error;

pub use delhivery::DelhiveryCourier;
pub use mock::MockCourier;

/// Carrier payment collection mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PaymentMode {
    Prepaid,
    Cod,
}

impl PaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Prepaid => "Prepaid",
            PaymentMode::Cod => "COD",
        }
    }
}

/// Booking request — built from the order's snapshot fields, never from
/// fresh client input.
#[derive(Debug, Clone)]
pub struct ShipmentRequest {
    pub order_id: String,
    pub customer_name: String,
    pub address: String,
    pub pincode: String,
    pub phone_number: String,
    pub weight_kg: f64,
    pub payment_mode: PaymentMode,
    /// Amount to collect on delivery; 0 for prepaid
    pub cod_amount: f64,
}

/// Raw carrier scan event, already flattened to the fields we keep
#[derive(Debug, Clone, PartialEq)]
pub struct ScanEvent {
    /// Unix millis
    pub timestamp: i64,
    pub location: String,
    pub description: String,
}

impl ScanEvent {
    /// Whether this scan reports successful delivery.
    ///
    /// Carrier status texts are free-form; "Undelivered"/"Not Delivered"
    /// attempts must not match.
    pub fn is_delivered(&self) -> bool {
        let d = self.description.to_lowercase();
        d.contains("delivered") && !d.contains("undelivered") && !d.contains("not delivered")
    }
}

/// Courier failure modes
#[derive(Debug, Error)]
pub enum CourierError {
    /// Carrier rejected the request — not retryable without changes
    #[error("Carrier rejected request: {0}")]
    Rejected(String),

    /// Timeout or transport failure — safe to retry later
    #[error("Carrier unavailable: {0}")]
    Unavailable(String),

    /// Response arrived but could not be interpreted
    #[error("Malformed carrier response: {0}")]
    Malformed(String),
}

/// Carrier API seam: booking, tracking, label retrieval.
#[async_trait::async_trait]
pub trait CourierClient: Send + Sync {
    /// Book a shipment; returns the carrier-assigned waybill (AWB).
    async fn book(&self, request: &ShipmentRequest) -> Result<String, CourierError>;

    /// Fetch raw scan events for a waybill, oldest first not guaranteed.
    async fn track(&self, waybill: &str) -> Result<Vec<ScanEvent>, CourierError>;

    /// Packing-slip PDF link for the dispatch console, when available.
    async fn label_url(&self, waybill: &str) -> Result<Option<String>, CourierError>;
}
