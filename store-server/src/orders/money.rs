//! Money calculation utilities using rust_decimal for precision
//!
//! All monetary arithmetic is done with `Decimal` internally, then converted
//! to `f64` for storage/serialization. Never add or multiply raw f64 amounts.

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// line_total = unit_price × quantity
pub fn line_total(unit_price: f64, quantity: i32) -> f64 {
    to_f64(to_decimal(unit_price) * Decimal::from(quantity))
}

/// Sum of line totals
pub fn subtotal(line_totals: impl IntoIterator<Item = f64>) -> f64 {
    let total: Decimal = line_totals.into_iter().map(to_decimal).sum();
    to_f64(total)
}

/// total_amount = subtotal + shipping_cost
pub fn grand_total(subtotal: f64, shipping_cost: f64) -> f64 {
    to_f64(to_decimal(subtotal) + to_decimal(shipping_cost))
}

/// Rupees → paise (the gateway bills in the minor unit)
pub fn to_paise(amount: f64) -> i64 {
    (to_decimal(amount) * Decimal::ONE_HUNDRED)
        .round()
        .to_i64()
        .unwrap_or_default()
}

/// Compare two monetary values for equality (within 0.01 tolerance)
pub fn money_eq(a: f64, b: f64) -> bool {
    let diff = (to_decimal(a) - to_decimal(b)).abs();
    diff < MONEY_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total_precision() {
        // Classic floating point problem: 0.1 * 3 != 0.3
        assert_eq!(line_total(0.1, 3), 0.3);
        assert_eq!(line_total(249.0, 2), 498.0);
    }

    #[test]
    fn test_subtotal_and_grand_total() {
        let sub = subtotal([498.0, 0.3]);
        assert_eq!(sub, 498.3);
        assert_eq!(grand_total(498.0, 70.0), 568.0);
    }

    #[test]
    fn test_to_paise() {
        assert_eq!(to_paise(249.0), 24900);
        assert_eq!(to_paise(568.0), 56800);
        assert_eq!(to_paise(0.335), 34);
    }

    #[test]
    fn test_money_eq_tolerance() {
        assert!(money_eq(568.0, 568.0));
        assert!(money_eq(568.0, 568.004));
        assert!(!money_eq(568.0, 568.01));
        assert!(!money_eq(568.0, 567.0));
    }
}
