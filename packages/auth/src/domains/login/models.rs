//! Input validation for the login flow.
//!
//! Violations are `AuthError::Validation` and must never reach the
//! retry engine or the RPC layer.

use lazy_static::lazy_static;
use regex::Regex;

use crate::common::AuthError;

lazy_static! {
    // Indian mobile numbers: 10 digits, leading 6-9
    static ref MOBILE_REGEX: Regex = Regex::new(r"^[6-9]\d{9}$").unwrap();

    // 6-digit OTP codes
    static ref OTP_REGEX: Regex = Regex::new(r"^\d{6}$").unwrap();
}

/// Validate and normalize a mobile number.
pub fn validate_mobile(raw: &str) -> Result<String, AuthError> {
    let trimmed = raw.trim();
    if trimmed.len() != 10 || !MOBILE_REGEX.is_match(trimmed) {
        return Err(AuthError::Validation(
            "Please enter a valid 10-digit mobile number".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Validate and normalize an OTP code.
pub fn validate_otp(raw: &str) -> Result<String, AuthError> {
    let trimmed = raw.trim();
    if trimmed.len() != 6 || !OTP_REGEX.is_match(trimmed) {
        return Err(AuthError::Validation(
            "Please enter a valid 6-digit OTP".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}
