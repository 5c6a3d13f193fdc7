//! Verification code configuration module

use serde::{Deserialize, Serialize};

/// One-time code configuration for both channels
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerificationConfig {
    /// Number of decimal digits in an email code
    #[serde(default = "default_email_code_length")]
    pub email_code_length: usize,

    /// Number of decimal digits in a phone code
    #[serde(default = "default_phone_code_length")]
    pub phone_code_length: usize,

    /// Minutes before an outstanding code expires
    #[serde(default = "default_code_expiration_minutes")]
    pub code_expiration_minutes: i64,

    /// Attempt ceiling for one email code cycle
    #[serde(default = "default_email_max_attempts")]
    pub email_max_attempts: u32,

    /// Attempt ceiling for one phone code cycle
    #[serde(default = "default_phone_max_attempts")]
    pub phone_max_attempts: u32,

    /// Whether phone codes are generated and checked by the SMS provider
    /// rather than stored locally
    #[serde(default)]
    pub provider_hosted_sms_codes: bool,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            email_code_length: default_email_code_length(),
            phone_code_length: default_phone_code_length(),
            code_expiration_minutes: default_code_expiration_minutes(),
            email_max_attempts: default_email_max_attempts(),
            phone_max_attempts: default_phone_max_attempts(),
            provider_hosted_sms_codes: false,
        }
    }
}

fn default_email_code_length() -> usize {
    6
}

fn default_phone_code_length() -> usize {
    6
}

fn default_code_expiration_minutes() -> i64 {
    30
}

fn default_email_max_attempts() -> u32 {
    100
}

fn default_phone_max_attempts() -> u32 {
    50
}
