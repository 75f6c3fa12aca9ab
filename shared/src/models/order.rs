//! Order Model (订单)
//!
//! The order carries two independent status axes: `payment_status` (financial)
//! and `status` (logistics). They are advanced by different actors and must
//! never be collapsed into one field.

use serde::{Deserialize, Serialize};

/// Payment status — financial axis.
///
/// PENDING → PAID | FAILED. Both PAID and FAILED are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(PaymentStatus::Pending),
            "PAID" => Some(PaymentStatus::Paid),
            "FAILED" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Shipment status — logistics axis.
///
/// PROCESSING → SHIPPED → DELIVERED, forward-only in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentStatus {
    Processing,
    Shipped,
    Delivered,
}

impl ShipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Processing => "PROCESSING",
            ShipmentStatus::Shipped => "SHIPPED",
            ShipmentStatus::Delivered => "DELIVERED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PROCESSING" => Some(ShipmentStatus::Processing),
            "SHIPPED" => Some(ShipmentStatus::Shipped),
            "DELIVERED" => Some(ShipmentStatus::Delivered),
            _ => None,
        }
    }
}

impl Default for ShipmentStatus {
    fn default() -> Self {
        Self::Processing
    }
}

/// Order line item — snapshot taken at creation time.
///
/// `unit_price` is always the server-resolved price; whatever the client sent
/// for this line has already been discarded by the time this exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub unit_price: f64,
    pub quantity: i32,
    pub line_total: f64,
}

/// Order entity — the durable ledger record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Option<i64>,
    /// Customer-facing reference, unique, immutable ("ORD-xxxxxx")
    pub order_id: String,
    /// Billing document reference, unique, 1:1 with the order ("INV-xxxxxxxx")
    pub invoice_id: String,
    /// Client-supplied idempotency key (unique when present)
    pub client_token: Option<String>,
    pub customer_name: String,
    /// Format: country code + number, digits only (e.g. 919876543210)
    pub phone_number: String,
    pub address: String,
    pub city: Option<String>,
    pub pincode: String,
    pub items: Vec<OrderItem>,
    /// Server-computed; never taken from the client
    pub subtotal: f64,
    pub shipping_cost: f64,
    pub total_amount: f64,
    pub payment_status: PaymentStatus,
    pub status: ShipmentStatus,
    /// Gateway payment-intent reference created at checkout
    pub gateway_order_id: Option<String>,
    /// Gateway payment reference, set when the payment is confirmed
    pub gateway_payment_id: Option<String>,
    /// Carrier waybill (AWB); null until booked, set at most once
    pub tracking_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Cart line as submitted by the checkout UI.
///
/// `name` and `price` are accepted for wire compatibility with the storefront
/// but are never trusted: the catalog name and the price authority win.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub quantity: i32,
    #[serde(default)]
    pub product_ref: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

/// Create order payload (checkout submission)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub customer_name: String,
    pub phone_number: String,
    pub address: String,
    #[serde(default)]
    pub city: Option<String>,
    pub pincode: String,
    pub items: Vec<CartLine>,
    /// Idempotency key; retries bearing the same token return the same order
    #[serde(default)]
    pub client_token: Option<String>,
}

/// Payment gateway callback payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCallback {
    pub gateway_payment_id: String,
    /// HMAC-SHA256 over "{gateway_order_id}|{gateway_payment_id}", hex
    pub signature: String,
    /// Amount the gateway reports as captured; must match the ledger
    pub amount: f64,
}

/// Admin logistics-status override payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusOverride {
    pub status: ShipmentStatus,
    pub operator: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Normalized carrier scan event for customer display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingEvent {
    /// Unix millis
    pub timestamp: i64,
    pub location: String,
    pub description: String,
}

/// Public tracking view — the safe field subset returned without auth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicOrder {
    pub order_id: String,
    pub customer_name: String,
    pub status: ShipmentStatus,
    pub payment_status: PaymentStatus,
    pub items: Vec<OrderItem>,
    pub subtotal: f64,
    pub shipping_cost: f64,
    pub total_amount: f64,
    pub tracking_id: Option<String>,
    pub created_at: i64,
}

impl From<Order> for PublicOrder {
    fn from(o: Order) -> Self {
        Self {
            order_id: o.order_id,
            customer_name: o.customer_name,
            status: o.status,
            payment_status: o.payment_status,
            items: o.items,
            subtotal: o.subtotal,
            shipping_cost: o.shipping_cost,
            total_amount: o.total_amount,
            tracking_id: o.tracking_id,
            created_at: o.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for s in ["PENDING", "PAID", "FAILED"] {
            assert_eq!(PaymentStatus::parse(s).unwrap().as_str(), s);
        }
        for s in ["PROCESSING", "SHIPPED", "DELIVERED"] {
            assert_eq!(ShipmentStatus::parse(s).unwrap().as_str(), s);
        }
        assert!(PaymentStatus::parse("Confirmed").is_none());
    }

    #[test]
    fn test_public_order_hides_gateway_fields() {
        let json = serde_json::to_value(PublicOrder {
            order_id: "ORD-000001".into(),
            customer_name: "A".into(),
            status: ShipmentStatus::Processing,
            payment_status: PaymentStatus::Pending,
            items: vec![],
            subtotal: 0.0,
            shipping_cost: 0.0,
            total_amount: 0.0,
            tracking_id: None,
            created_at: 0,
        })
        .unwrap();
        assert!(json.get("gateway_order_id").is_none());
        assert!(json.get("client_token").is_none());
        assert!(json.get("phone_number").is_none());
    }
}
