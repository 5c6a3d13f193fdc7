//! Shared utilities and common types for the signup gateway
//!
//! This crate provides functionality used across the gateway crates:
//! - Configuration types
//! - Utility functions (phone/email normalization and validation)

pub mod config;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{GatewayConfig, ThrottleConfig, TokenConfig, VerificationConfig};
pub use utils::{email, phone};
