//! Shipping Rate Engine
//!
//! Pure tariff computation: pincode → zone, weight → half-kilogram slabs,
//! cost = base + extra slabs × increment. No I/O; the checkout pipeline and
//! the public quote endpoint both call [`quote`].
//!
//! The pincode→zone mapping is a static prefix table. It stands in for a
//! carrier serviceability feed; swap the classification inside [`classify`]
//! when one is available — callers only see [`Zone`].

use rust_decimal::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::orders::money::{to_decimal, to_f64};
use crate::utils::AppError;

/// Billing granularity: weight is rounded up to 0.5 kg slabs
const SLAB_KG: f64 = 0.5;

/// Tariff tier derived from the destination pincode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Zone {
    /// Same-district delivery (pincode prefix 41)
    Local,
    /// Same-state delivery (first digit 4)
    Regional,
    /// Rest of the serviceable country
    National,
}

impl Zone {
    /// Base rate covering the first 0.5 kg slab
    fn base_rate(&self) -> f64 {
        match self {
            Zone::Local => 40.0,
            Zone::Regional => 55.0,
            Zone::National => 80.0,
        }
    }

    /// Increment billed per additional 0.5 kg slab
    fn slab_increment(&self) -> f64 {
        match self {
            Zone::Local => 30.0,
            Zone::Regional => 35.0,
            Zone::National => 45.0,
        }
    }
}

/// Rate computation failure modes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateError {
    /// Malformed pincode — the client must correct it
    #[error("Invalid destination pincode: {0}")]
    InvalidDestination(String),

    /// Well-formed pincode with no serviceable route
    #[error("Pincode {0} is not serviceable")]
    NotServiceable(String),

    /// Non-positive or non-finite weight
    #[error("Invalid shipment weight: {0}")]
    InvalidWeight(String),
}

impl From<RateError> for AppError {
    fn from(e: RateError) -> Self {
        match e {
            RateError::InvalidDestination(_) | RateError::InvalidWeight(_) => {
                AppError::Validation(e.to_string())
            }
            RateError::NotServiceable(_) => AppError::NotServiceable(e.to_string()),
        }
    }
}

/// Shipping quote with the slab that was actually billed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShippingQuote {
    pub cost: f64,
    pub charged_weight_kg: f64,
    pub zone: Zone,
}

/// Classify a pincode into a tariff tier.
///
/// Expects a validated 6-digit code. First digit 9 covers army and
/// unallocated ranges — no route exists for those.
fn classify(pincode: &str) -> Result<Zone, RateError> {
    if pincode.starts_with("41") {
        return Ok(Zone::Local);
    }
    match pincode.as_bytes()[0] {
        b'4' => Ok(Zone::Regional),
        b'1'..=b'8' => Ok(Zone::National),
        _ => Err(RateError::NotServiceable(pincode.to_string())),
    }
}

/// Validate pincode shape: exactly 6 ASCII digits, not starting with 0.
fn validate_pincode(pincode: &str) -> Result<(), RateError> {
    let well_formed = pincode.len() == 6
        && pincode.chars().all(|c| c.is_ascii_digit())
        && !pincode.starts_with('0');
    if !well_formed {
        return Err(RateError::InvalidDestination(pincode.to_string()));
    }
    Ok(())
}

/// Quote shipping cost for a destination and total shipment weight.
///
/// Weight is rounded **up** to the nearest 0.5 kg slab before billing:
/// 0.41 kg bills as 0.5 kg, 0.51 kg bills as 1.0 kg. The base rate covers the
/// first slab; each additional slab adds the zone's fixed increment.
pub fn quote(pincode: &str, total_weight_kg: f64) -> Result<ShippingQuote, RateError> {
    validate_pincode(pincode)?;
    let zone = classify(pincode)?;

    if !total_weight_kg.is_finite() || total_weight_kg <= 0.0 {
        return Err(RateError::InvalidWeight(format!("{total_weight_kg}")));
    }

    // Slab-round: weight / 0.5, ceiling — exact in decimal, never in f64
    let slabs = (to_decimal(total_weight_kg) / to_decimal(SLAB_KG))
        .ceil()
        .to_i64()
        .ok_or_else(|| RateError::InvalidWeight(format!("{total_weight_kg}")))?;
    let charged_weight_kg = to_f64(Decimal::from(slabs) * to_decimal(SLAB_KG));

    let extra_slabs = slabs - 1;
    let cost = to_f64(
        to_decimal(zone.base_rate())
            + Decimal::from(extra_slabs) * to_decimal(zone.slab_increment()),
    );

    Ok(ShippingQuote {
        cost,
        charged_weight_kg,
        zone,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCAL: &str = "412806";
    const REGIONAL: &str = "400001";
    const NATIONAL: &str = "110001";

    #[test]
    fn test_zone_classification() {
        assert_eq!(quote(LOCAL, 0.4).unwrap().zone, Zone::Local);
        assert_eq!(quote(REGIONAL, 0.4).unwrap().zone, Zone::Regional);
        assert_eq!(quote(NATIONAL, 0.4).unwrap().zone, Zone::National);
    }

    #[test]
    fn test_slab_rounding_boundaries() {
        // 0.41 bills the same as 0.50
        assert_eq!(quote(LOCAL, 0.41).unwrap(), quote(LOCAL, 0.50).unwrap());
        // 0.51 rounds up to the next slab
        assert_ne!(
            quote(LOCAL, 0.50).unwrap().cost,
            quote(LOCAL, 0.51).unwrap().cost
        );
        assert_eq!(quote(LOCAL, 0.51).unwrap().charged_weight_kg, 1.0);
        // Exact slab boundary does not round up
        assert_eq!(quote(LOCAL, 1.0).unwrap().charged_weight_kg, 1.0);
    }

    #[test]
    fn test_happy_path_two_jars() {
        // 2 × 0.4 kg = 0.8 kg → 1.0 kg charged → base 40 + one extra slab 30
        let q = quote(LOCAL, 0.8).unwrap();
        assert_eq!(q.charged_weight_kg, 1.0);
        assert_eq!(q.cost, 70.0);
    }

    #[test]
    fn test_base_rate_covers_first_slab() {
        assert_eq!(quote(LOCAL, 0.4).unwrap().cost, 40.0);
        assert_eq!(quote(NATIONAL, 0.5).unwrap().cost, 80.0);
        // 1.6 kg → 4 slabs → base + 3 increments
        assert_eq!(quote(NATIONAL, 1.6).unwrap().cost, 80.0 + 3.0 * 45.0);
    }

    #[test]
    fn test_invalid_destination() {
        for pin in ["12345", "1234567", "41280a", "", "012345"] {
            assert!(matches!(
                quote(pin, 0.4),
                Err(RateError::InvalidDestination(_))
            ));
        }
    }

    #[test]
    fn test_not_serviceable() {
        assert_eq!(
            quote("999999", 0.4),
            Err(RateError::NotServiceable("999999".to_string()))
        );
    }

    #[test]
    fn test_invalid_weight() {
        assert!(matches!(quote(LOCAL, 0.0), Err(RateError::InvalidWeight(_))));
        assert!(matches!(
            quote(LOCAL, -1.0),
            Err(RateError::InvalidWeight(_))
        ));
        assert!(matches!(
            quote(LOCAL, f64::NAN),
            Err(RateError::InvalidWeight(_))
        ));
    }
}
