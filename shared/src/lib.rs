//! Shared domain types for the storefront backend
//!
//! # 模块结构
//!
//! - [`models`] - 订单、状态、配置等领域模型
//! - [`util`] - 时间戳和公开单号生成工具

pub mod models;
pub mod util;

// Re-export 公共类型
pub use models::order::{
    CartLine, CheckoutRequest, Order, OrderItem, PaymentCallback, PaymentStatus, PublicOrder,
    ShipmentStatus, StatusOverride, TrackingEvent,
};
pub use models::store_config::{PriceConfig, PriceUpdate};
