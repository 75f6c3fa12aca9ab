//! Store Config API 模块 (商品价格)

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

/// 公开路由：商品页读取当前价格
pub fn public_router() -> Router<ServerState> {
    Router::new().route("/api/config/price", get(handler::get_price))
}

/// 管理路由：设置价格
pub fn admin_router() -> Router<ServerState> {
    Router::new().route("/api/config/price", put(handler::set_price))
}
