//! Store Config API Handlers

use axum::{Json, extract::State};

use shared::models::{PriceConfig, PriceUpdate};

use crate::core::ServerState;
use crate::utils::AppResult;
use crate::utils::validation::validate_amount;

/// GET /api/config/price - 当前商品单价
pub async fn get_price(State(state): State<ServerState>) -> AppResult<Json<PriceConfig>> {
    let price = state.price_authority.resolve_unit_price().await?;
    Ok(Json(PriceConfig { price }))
}

/// PUT /api/config/price - 设置商品单价 (管理端)
pub async fn set_price(
    State(state): State<ServerState>,
    Json(payload): Json<PriceUpdate>,
) -> AppResult<Json<PriceConfig>> {
    validate_amount(payload.price, "price")?;
    let price = state.price_authority.set_unit_price(payload.price).await?;
    Ok(Json(PriceConfig { price }))
}
