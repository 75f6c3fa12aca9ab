//! Order API 模块
//!
//! 公开面：下单、支付回调、订单查询与物流轨迹。
//! 管理面：订单列表、发货、面单、状态覆写。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// 公开路由（下单与跟踪）
pub fn public_router() -> Router<ServerState> {
    Router::new()
        .route("/api/orders", post(handler::create))
        .route("/api/orders/{order_id}", get(handler::get_by_id))
        .route("/api/orders/{order_id}/tracking", get(handler::tracking))
        .route("/api/orders/{order_id}/payment", post(handler::confirm_payment))
}

/// 管理路由（由 require_admin 保护）
pub fn admin_router() -> Router<ServerState> {
    Router::new()
        .route("/api/orders", get(handler::list))
        .route("/api/orders/{order_id}/dispatch", post(handler::dispatch))
        .route("/api/orders/{order_id}/label", get(handler::label))
        .route("/api/orders/{order_id}/status", post(handler::override_status))
}
