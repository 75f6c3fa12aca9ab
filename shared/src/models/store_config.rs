//! Store Config Model (全局配置)

use serde::{Deserialize, Serialize};

/// Current product price as served to the storefront
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceConfig {
    pub price: f64,
}

/// Set product price payload (admin)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceUpdate {
    pub price: f64,
}
