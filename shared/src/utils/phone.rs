//! Phone number utility functions
//!
//! This module provides phone number validation and manipulation utilities
//! supporting E.164 format, dial-prefix normalization, and country calling
//! code extraction used by the country-level throttle rules.

use once_cell::sync::Lazy;
use regex::Regex;

/// Regular expression for valid E.164 format
/// E.164 format: + followed by 1-3 digit country code (no leading 0) and up to 14 total digits
static E164_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+[1-9]\d{6,14}$").unwrap());

/// Regular expression for a bare dial prefix ("63" or "+63")
static PREFIX_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[1-9]\d{0,2}$").unwrap());

/// Validates if a phone number is in valid E.164 format
///
/// E.164 format requirements:
/// - Starts with '+'
/// - Country code (1-3 digits, cannot start with 0)
/// - Only digits after '+', at most 15 in total
///
/// # Arguments
///
/// * `phone` - Phone number to validate
///
/// # Returns
///
/// * `bool` - True if valid E.164 format, false otherwise
pub fn is_valid_phone_format(phone: &str) -> bool {
    E164_REGEX.is_match(phone)
}

/// Validates a bare country calling code as submitted by the client
pub fn is_valid_calling_code(prefix: &str) -> bool {
    PREFIX_REGEX.is_match(prefix)
}

/// Normalize a dial prefix and national number into E.164
///
/// Strips spaces, dashes, dots and parentheses from the national number and
/// a leading trunk zero if present, then prepends the calling code.
///
/// # Arguments
///
/// * `prefix` - Country calling code, with or without leading '+'
/// * `number` - National number as typed by the user
///
/// # Returns
///
/// * `Option<String>` - Normalized E.164 phone number, or None if invalid
pub fn normalize_from_parts(prefix: &str, number: &str) -> Option<String> {
    if !is_valid_calling_code(prefix) {
        return None;
    }
    let code = prefix.trim_start_matches('+');

    let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
    // Trunk zero is not carried into international format
    let national = digits.strip_prefix('0').unwrap_or(&digits);
    if national.is_empty() {
        return None;
    }

    let candidate = format!("+{}{}", code, national);
    if is_valid_phone_format(&candidate) {
        Some(candidate)
    } else {
        None
    }
}

/// Canonical country calling code for a phone number, as "+NNN"
///
/// Resolution is by longest known code first, falling back to the single
/// leading digit for numbering-plan codes that are not in the table. The
/// table covers the codes the throttle policy is expected to see; exactness
/// beyond that is not required because country-level rules compare prefixes,
/// not route calls.
///
/// # Arguments
///
/// * `phone` - Full phone number in E.164 format
///
/// # Returns
///
/// * `Option<String>` - Calling code including '+', or None for invalid input
pub fn country_calling_code(phone: &str) -> Option<String> {
    if !is_valid_phone_format(phone) {
        return None;
    }
    let digits = &phone[1..];

    // Three- and two-digit codes that matter to the country-level policies
    const KNOWN_CODES: &[&str] = &[
        "880", "881", "882", "960", "963", "967", "970", "992", "998", "20", "27", "30", "31",
        "33", "34", "44", "49", "52", "55", "60", "61", "62", "63", "64", "65", "66", "81", "82",
        "84", "86", "90", "91", "92", "93", "94", "95", "98",
    ];

    for code in KNOWN_CODES {
        if digits.starts_with(code) {
            return Some(format!("+{}", code));
        }
    }
    // Single-digit plans (NANP +1, Russia/Kazakhstan +7) and anything unknown
    Some(format!("+{}", &digits[..1]))
}

/// Mask phone number for logging (show only last 4 digits)
pub fn mask_phone(phone: &str) -> String {
    if phone.len() <= 4 {
        return "*".repeat(phone.len());
    }
    format!("***{}", &phone[phone.len() - 4..])
}
