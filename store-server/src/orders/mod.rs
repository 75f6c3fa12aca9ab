//! Order Fulfillment Pipeline
//!
//! # 模块结构
//!
//! - [`checkout`] - 幂等下单协议（价格权威 + 运费计算）
//! - [`payment`] - 支付回调核验（exactly-once PAID）
//! - [`dispatch`] - 承运商预订（book-once 保证）
//! - [`tracking`] - 物流轨迹投影与送达对账
//! - [`status`] - 状态机转移表
//! - [`money`] - 金额精度工具

pub mod checkout;
pub mod dispatch;
pub mod money;
pub mod payment;
pub mod status;
pub mod tracking;

pub use dispatch::ShipmentDispatcher;
pub use tracking::DeliveryReconciler;
