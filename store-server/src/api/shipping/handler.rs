//! Shipping API Handlers

use axum::{
    Json,
    extract::Query,
};
use serde::Deserialize;

use crate::pricing::UNIT_WEIGHT_KG;
use crate::shipping::{self, ShippingQuote};
use crate::utils::AppResult;

/// Query params for a shipping quote
#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    pub pincode: String,
    /// Total shipment weight in kg; defaults to a single jar
    pub weight: Option<f64>,
}

/// GET /api/shipping/quote - 下单前运费报价
///
/// The checkout page calls this before asking for payment so a
/// non-serviceable destination is surfaced early.
pub async fn quote(Query(query): Query<QuoteQuery>) -> AppResult<Json<ShippingQuote>> {
    let weight = query.weight.unwrap_or(UNIT_WEIGHT_KG);
    let quote = shipping::quote(&query.pincode, weight)?;
    Ok(Json(quote))
}
