//! Email address utility functions
//!
//! Normalization, syntactic validation, domain extraction for the blocklist
//! rule, and masking for logs.

use once_cell::sync::Lazy;
use regex::Regex;

/// Permissive syntactic check; ownership is proven by the code flow, so the
/// regex only has to reject garbage the delivery provider would bounce.
static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

/// Validates an email address syntactically
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Normalize an email address for use as a record key
///
/// Trims surrounding whitespace and lowercases. Verification records and
/// uniqueness checks key on the normalized form so that case variants of one
/// mailbox share a single verification cycle.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Domain part of a normalized email address
///
/// # Arguments
///
/// * `email` - Normalized email address
///
/// # Returns
///
/// * `Option<&str>` - The part after '@', or None if there is no '@'
pub fn email_domain(email: &str) -> Option<&str> {
    email.rsplit_once('@').map(|(_, domain)| domain)
}

/// Mask email for logging (first character plus domain)
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        // chars(), not a byte slice: the first character may be multibyte
        Some((local, domain)) => match local.chars().next() {
            Some(first) => format!("{}***@{}", first, domain),
            None => "***".to_string(),
        },
        None => "***".to_string(),
    }
}
