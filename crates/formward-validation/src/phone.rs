//! Phone number validation

use once_cell::sync::Lazy;
use regex::Regex;

/// Default phone pattern: optional `+`, a 3-digit area code (optionally in
/// parentheses), then 3 and 4-6 digits with optional `-`, `.` or space
/// separators.
pub const PHONE_PATTERN: &str = r"^\+?\(?[0-9]{3}\)?[-\s.]?[0-9]{3}[-\s.]?[0-9]{4,6}$";

pub(crate) static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(PHONE_PATTERN).expect("phone pattern is a valid regex"));

/// Validates a phone number against [`PHONE_PATTERN`].
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

/// Digits only, for display or comparison.
pub fn phone_digits(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}
