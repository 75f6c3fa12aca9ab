//! Shipping API 模块 (运费报价)

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/shipping/quote", get(handler::quote))
}
