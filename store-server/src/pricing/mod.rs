//! Price Authority
//!
//! The single server-side source of truth for the unit price. Order totals
//! are always recomputed from here; any price field the client sends is
//! discarded before it can influence a ledger write.
//!
//! Injected into the checkout path via `ServerState` — never read as a
//! module global — so tests can pin a fixed price through the repository.

use sqlx::SqlitePool;

use crate::db::repository::store_config;
use crate::utils::{AppError, AppResult, validation::MAX_PRICE};

/// store_config key holding the current unit price
const PRICE_KEY: &str = "product_price";

/// Unit price served when no admin has set one yet (₹ per jar)
pub const DEFAULT_UNIT_PRICE: f64 = 249.0;

/// Catalog constant: net weight per jar. Shipment weight is always derived
/// from this, never taken from the client.
pub const UNIT_WEIGHT_KG: f64 = 0.4;

/// The single SKU this store sells
pub const PRODUCT_NAME: &str = "Handcrafted Strawberry Preserve";

/// Price Authority service — resolves and administers the unit price.
#[derive(Clone)]
pub struct PriceAuthority {
    pool: SqlitePool,
}

impl PriceAuthority {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Resolve the current unit price.
    ///
    /// Unset → [`DEFAULT_UNIT_PRICE`]. A stored value that fails to parse is
    /// treated as unset (logged); storage failure propagates.
    pub async fn resolve_unit_price(&self) -> AppResult<f64> {
        let raw = store_config::get(&self.pool, PRICE_KEY).await?;
        match raw {
            None => Ok(DEFAULT_UNIT_PRICE),
            Some(v) => match v.parse::<f64>() {
                Ok(price) if price.is_finite() && price > 0.0 => Ok(price),
                _ => {
                    tracing::warn!(value = %v, "Corrupt product_price in store_config, serving default");
                    Ok(DEFAULT_UNIT_PRICE)
                }
            },
        }
    }

    /// Set the unit price (admin only; the router guards the route).
    pub async fn set_unit_price(&self, price: f64) -> AppResult<f64> {
        if !price.is_finite() || price <= 0.0 {
            return Err(AppError::validation(format!(
                "price must be a positive number, got {price}"
            )));
        }
        if price > MAX_PRICE {
            return Err(AppError::validation(format!(
                "price exceeds maximum allowed ({MAX_PRICE}), got {price}"
            )));
        }

        let old = self.resolve_unit_price().await?;
        store_config::set(&self.pool, PRICE_KEY, &price.to_string()).await?;

        tracing::info!(
            target: "audit",
            event = "price_updated",
            old_price = old,
            new_price = price,
        );
        Ok(price)
    }
}
