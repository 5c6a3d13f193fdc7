//! Signed continuation token issued after a successful finalize.

use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sg_shared::config::TokenConfig;

use crate::domain::clock::Clock;
use crate::errors::{CoreError, CoreResult};

/// Claims carried by a continuation token.
///
/// The token binds the verified email and phone to the chosen username so
/// the downstream account-creation step needs no further proof of ownership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinuationClaims {
    /// Chosen username
    pub sub: String,
    /// Verified email address
    pub email: String,
    /// Verified E.164 phone number
    pub phone: String,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
    /// Token id
    pub jti: String,
}

/// HS256 issuer/verifier for continuation tokens
pub struct SignupTokenService {
    config: TokenConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl SignupTokenService {
    pub fn new(config: TokenConfig, clock: Arc<dyn Clock>) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.validate_exp = true;

        Self {
            config,
            encoding_key,
            decoding_key,
            validation,
            clock,
        }
    }

    /// Issue a continuation token for a completed signup
    pub fn issue(&self, username: &str, email: &str, phone: &str) -> CoreResult<String> {
        let now = self.clock.now();
        let claims = ContinuationClaims {
            sub: username.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.config.expiry_hours)).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            CoreError::Internal {
                message: format!("token encoding failed: {}", e),
            }
        })
    }

    /// Verify signature, issuer, audience and expiry, returning the claims
    pub fn verify(&self, token: &str) -> CoreResult<ContinuationClaims> {
        decode::<ContinuationClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| CoreError::Internal {
                message: format!("token verification failed: {}", e),
            })
    }
}
