//! Signup orchestrator
//!
//! Wire-facing service that validates input, drives both verification
//! channels, and finalizes a signup into a signed continuation token.

pub mod service;
pub mod traits;
pub mod types;

#[cfg(test)]
mod tests;

pub use service::SignupService;
pub use traits::{CaptchaVerifier, ChainDirectory, UserDirectory};
pub use types::{
    CheckCodeResponse, CheckEmailCodeRequest, CheckPhoneCodeRequest, CheckUsernameRequest,
    CheckUsernameResponse, CreateUserRequest, CreateUserResponse, RequestEmailCodeRequest,
    RequestEmailCodeResponse, RequestSmsRequest, RequestSmsResponse,
};
