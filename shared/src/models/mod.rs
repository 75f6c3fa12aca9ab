//! Domain Models

pub mod order;
pub mod store_config;

pub use order::{
    CartLine, CheckoutRequest, Order, OrderItem, PaymentCallback, PaymentStatus, PublicOrder,
    ShipmentStatus, StatusOverride, TrackingEvent,
};
pub use store_config::{PriceConfig, PriceUpdate};
