//! Continuation token configuration module

use serde::{Deserialize, Serialize};

/// Configuration for the signed continuation token minted by finalize
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
    /// HMAC signing secret
    #[serde(default = "default_secret")]
    pub secret: String,

    /// Hours until the continuation token expires
    #[serde(default = "default_expiry_hours")]
    pub expiry_hours: i64,

    /// Issuer claim
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// Audience claim
    #[serde(default = "default_audience")]
    pub audience: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: default_secret(),
            expiry_hours: default_expiry_hours(),
            issuer: default_issuer(),
            audience: default_audience(),
        }
    }
}

fn default_secret() -> String {
    "development-secret-please-change-in-production".to_string()
}

fn default_expiry_hours() -> i64 {
    24
}

fn default_issuer() -> String {
    "signup-gateway".to_string()
}

fn default_audience() -> String {
    "account-creator".to_string()
}
