//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`shipping`] - 运费报价（公开，下单前即可查询）
//! - [`orders`] - 下单、支付回调、公开跟踪 + 管理端操作
//! - [`store_config`] - 商品价格读取（公开）与设置（管理端）
//!
//! 管理端路由由 `auth::require_admin` 中间件统一保护（在 Server 组装时挂载）。

pub mod health;
pub mod orders;
pub mod shipping;
pub mod store_config;

use axum::Router;

use crate::core::ServerState;

/// 公开路由：健康检查、报价、下单、支付回调、订单跟踪
pub fn public_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(shipping::router())
        .merge(orders::public_router())
        .merge(store_config::public_router())
}

/// 管理端路由：订单列表、发货、面单、状态覆写、价格设置
pub fn admin_router() -> Router<ServerState> {
    Router::new()
        .merge(orders::admin_router())
        .merge(store_config::admin_router())
}
