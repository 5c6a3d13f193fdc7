//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `throttle` - Layered rate-limiting thresholds and blocklists
//! - `verification` - One-time code issuance and attempt limits
//! - `token` - Signed continuation token settings

pub mod throttle;
pub mod token;
pub mod verification;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use throttle::{DelayedCountryConfig, HighFrequencyCountryConfig, ThrottleConfig};
pub use token::TokenConfig;
pub use verification::VerificationConfig;

/// Complete gateway configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    /// Rate-limiting configuration
    #[serde(default)]
    pub throttle: ThrottleConfig,

    /// Verification code configuration
    #[serde(default)]
    pub verification: VerificationConfig,

    /// Continuation token configuration
    #[serde(default)]
    pub token: TokenConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            throttle: ThrottleConfig::default(),
            verification: VerificationConfig::default(),
            token: TokenConfig::default(),
        }
    }
}
