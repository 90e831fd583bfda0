//! Input validation helpers
//!
//! Centralized text length constants, text checks, and monetary-amount
//! checks. All amounts are i64 minor units; upper bounds guard against
//! fat-finger entries, not arithmetic overflow.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: customer, seller, boat, etc.
pub const MAX_NAME_LEN: usize = 200;

/// Notes and free-text reasons
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: phone numbers, time strings, codes
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Maximum allowed amount per monetary operation (minor units; €100,000.00)
pub const MAX_AMOUNT: i64 = 10_000_000;

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

/// Validate a non-negative monetary amount (prepayments may be zero).
pub fn validate_amount(value: i64, field: &str) -> Result<(), AppError> {
    if value < 0 {
        return Err(AppError::validation(format!(
            "{field} must be non-negative, got {value}"
        )));
    }
    if value > MAX_AMOUNT {
        return Err(AppError::validation(format!(
            "{field} exceeds maximum allowed ({MAX_AMOUNT}), got {value}"
        )));
    }
    Ok(())
}

/// Validate a strictly positive monetary amount (top-ups, accepts).
pub fn validate_positive_amount(value: i64, field: &str) -> Result<(), AppError> {
    if value <= 0 {
        return Err(AppError::validation(format!(
            "{field} must be positive, got {value}"
        )));
    }
    if value > MAX_AMOUNT {
        return Err(AppError::validation(format!(
            "{field} exceeds maximum allowed ({MAX_AMOUNT}), got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_checks() {
        assert!(validate_required_text("Ana", "name", MAX_NAME_LEN).is_ok());
        assert!(validate_required_text("   ", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text(&"x".repeat(300), "name", MAX_NAME_LEN).is_err());
        assert!(validate_optional_text(&None, "note", MAX_NOTE_LEN).is_ok());
        assert!(validate_optional_text(&Some("y".repeat(600)), "note", MAX_NOTE_LEN).is_err());
    }

    #[test]
    fn amount_checks() {
        assert!(validate_amount(0, "prepayment").is_ok());
        assert!(validate_amount(-1, "prepayment").is_err());
        assert!(validate_positive_amount(0, "amount").is_err());
        assert!(validate_positive_amount(1, "amount").is_ok());
        assert!(validate_positive_amount(MAX_AMOUNT + 1, "amount").is_err());
    }
}
