//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use shared::models::{
    CheckoutRequest, Order, PaymentCallback, PublicOrder, StatusOverride, TrackingEvent,
};

use crate::core::ServerState;
use crate::db::repository::order;
use crate::orders::status::shipment_can_advance;
use crate::orders::{checkout, payment, tracking};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};

/// POST /api/orders - 下单（幂等）
///
/// Returns the full order including the gateway intent reference the
/// checkout widget needs. Totals are authoritative — whatever prices the
/// cart carried were discarded.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<Order>> {
    let order = checkout::create_order(
        &state.pool,
        &state.price_authority,
        state.gateway.as_ref(),
        payload,
    )
    .await?;
    Ok(Json(order))
}

/// GET /api/orders/{order_id} - 公开订单查询（跟踪页）
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(order_id): Path<String>,
) -> AppResult<Json<PublicOrder>> {
    let order = order::find_by_order_id(&state.pool, &order_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {order_id} not found")))?;
    Ok(Json(order.into()))
}

/// GET /api/orders/{order_id}/tracking - 物流轨迹
pub async fn tracking(
    State(state): State<ServerState>,
    Path(order_id): Path<String>,
) -> AppResult<Json<Vec<TrackingEvent>>> {
    let events =
        tracking::tracking_timeline(&state.pool, state.courier.as_ref(), &order_id).await?;
    Ok(Json(events))
}

/// POST /api/orders/{order_id}/payment - 支付回调核验
pub async fn confirm_payment(
    State(state): State<ServerState>,
    Path(order_id): Path<String>,
    Json(payload): Json<PaymentCallback>,
) -> AppResult<Json<PublicOrder>> {
    let order =
        payment::confirm_payment(&state.pool, state.gateway.as_ref(), &order_id, payload).await?;
    Ok(Json(order.into()))
}

// ========== Admin handlers ==========

/// Query params for listing orders
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i32,
    #[serde(default)]
    pub offset: i32,
}

fn default_limit() -> i32 {
    50
}

/// GET /api/orders - 订单列表（最新在前）
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let orders = order::find_all(&state.pool, query.limit, query.offset).await?;
    Ok(Json(orders))
}

/// Dispatch response: the carrier-assigned waybill
#[derive(Debug, Serialize)]
pub struct DispatchResponse {
    pub tracking_id: String,
}

/// POST /api/orders/{order_id}/dispatch - 预订承运商发货
pub async fn dispatch(
    State(state): State<ServerState>,
    Path(order_id): Path<String>,
) -> AppResult<Json<DispatchResponse>> {
    let tracking_id = state.dispatcher.dispatch(&order_id).await?;
    Ok(Json(DispatchResponse { tracking_id }))
}

/// Label response: packing-slip PDF link, when the carrier has one
#[derive(Debug, Serialize)]
pub struct LabelResponse {
    pub label_url: Option<String>,
}

/// GET /api/orders/{order_id}/label - 面单链接
pub async fn label(
    State(state): State<ServerState>,
    Path(order_id): Path<String>,
) -> AppResult<Json<LabelResponse>> {
    let label_url = state.dispatcher.label_url(&order_id).await?;
    Ok(Json(LabelResponse { label_url }))
}

/// POST /api/orders/{order_id}/status - 管理端状态覆写
///
/// The one path allowed to move logistics status outside the pipeline,
/// including backwards. Every call is written to the audit log with the
/// operator and whether it was a normal advance or an out-of-band override.
pub async fn override_status(
    State(state): State<ServerState>,
    Path(order_id): Path<String>,
    Json(payload): Json<StatusOverride>,
) -> AppResult<Json<Order>> {
    validate_required_text(&payload.operator, "operator", MAX_NAME_LEN)?;
    validate_optional_text(&payload.reason, "reason", MAX_NOTE_LEN)?;

    let before = order::find_by_order_id(&state.pool, &order_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {order_id} not found")))?;

    let updated = order::override_status(&state.pool, &order_id, payload.status).await?;

    tracing::info!(
        target: "audit",
        event = "status_override",
        order_id = %order_id,
        from = before.status.as_str(),
        to = payload.status.as_str(),
        forward_advance = shipment_can_advance(before.status, payload.status),
        operator = %payload.operator,
        reason = payload.reason.as_deref().unwrap_or(""),
    );

    Ok(Json(updated))
}
