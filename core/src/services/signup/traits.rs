//! Upstream collaborator abstractions for the signup orchestrator.
//!
//! Like the delivery providers, these are infrastructure seams; errors are
//! plain strings and the service classifies them at the call site.

use async_trait::async_trait;

/// On-chain registry lookups for addresses and usernames already bound to
/// existing accounts
#[async_trait]
pub trait ChainDirectory: Send + Sync {
    async fn is_email_registered(&self, email: &str) -> Result<bool, String>;

    async fn is_phone_registered(&self, phone: &str) -> Result<bool, String>;

    async fn is_username_taken(&self, username: &str) -> Result<bool, String>;
}

/// Off-chain user directory for accounts created or pending locally
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn email_in_use(&self, email: &str) -> Result<bool, String>;

    async fn phone_in_use(&self, phone: &str) -> Result<bool, String>;

    async fn username_in_use(&self, username: &str) -> Result<bool, String>;
}

/// Captcha backend
#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    /// Whether the client-submitted captcha token is valid for this IP
    async fn verify(&self, token: &str, ip: &str) -> Result<bool, String>;
}
