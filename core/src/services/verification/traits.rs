//! Delivery provider abstractions for verification codes.
//!
//! Providers are infrastructure collaborators, so their errors are plain
//! strings; the service wraps them into classified errors at the call site.

use std::collections::HashMap;

use async_trait::async_trait;

/// Email delivery provider
#[async_trait]
pub trait EmailDelivery: Send + Sync {
    /// Send a templated message and return the provider's message id.
    ///
    /// # Arguments
    /// * `to` - Normalized recipient address
    /// * `template` - Provider-side template name
    /// * `vars` - Template substitution variables
    async fn send_email(
        &self,
        to: &str,
        template: &str,
        vars: &HashMap<String, String>,
    ) -> Result<String, String>;
}

/// SMS delivery provider
///
/// Two operating modes: locally-generated codes go out through `send_sms`,
/// while provider-hosted verification uses `send_sms_code` and
/// `check_sms_code` and never sees the code locally until a match.
#[async_trait]
pub trait SmsDelivery: Send + Sync {
    /// Send a plain message and return the provider's message id
    async fn send_sms(&self, to: &str, body: &str) -> Result<String, String>;

    /// Ask the provider to generate and deliver a code it hosts itself
    async fn send_sms_code(&self, to: &str) -> Result<String, String>;

    /// Ask the provider whether a submitted code matches its hosted one
    async fn check_sms_code(&self, to: &str, code: &str) -> Result<bool, String>;
}
