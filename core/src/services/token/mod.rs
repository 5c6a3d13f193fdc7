//! Continuation token service

mod service;

pub use service::{ContinuationClaims, SignupTokenService};
