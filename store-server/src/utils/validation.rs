//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement, so every handler
//! validates before touching the repository layer.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Customer names
pub const MAX_NAME_LEN: usize = 200;

/// Street addresses
pub const MAX_ADDRESS_LEN: usize = 500;

/// Short identifiers: city, idempotency tokens, gateway references
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Notes / override reasons
pub const MAX_NOTE_LEN: usize = 500;

/// Per-line quantity cap
pub const MAX_QUANTITY: i32 = 9999;

/// Sanity cap for the admin-set unit price
pub const MAX_PRICE: f64 = 1_000_000.0;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate a phone number: 10-15 digits, nothing else.
///
/// Stored format is country code + number without '+' (e.g. 919876543210).
pub fn validate_phone(value: &str) -> Result<(), AppError> {
    if !(10..=15).contains(&value.len()) || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::validation(format!(
            "phone_number must be 10-15 digits, got {value:?}"
        )));
    }
    Ok(())
}

/// Validate a monetary amount is finite and non-negative.
pub fn validate_amount(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(AppError::validation(format!(
            "{field} must be a finite number"
        )));
    }
    if value < 0.0 {
        return Err(AppError::validation(format!(
            "{field} must be non-negative, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("ok", "f", 10).is_ok());
        assert!(validate_required_text("  ", "f", 10).is_err());
        assert!(validate_required_text("toolongtext", "f", 5).is_err());
    }

    #[test]
    fn test_phone() {
        assert!(validate_phone("919876543210").is_ok());
        assert!(validate_phone("98765").is_err());
        assert!(validate_phone("+919876543210").is_err());
    }
}
