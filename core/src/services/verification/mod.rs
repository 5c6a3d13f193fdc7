//! Verification service
//!
//! Issues one-time codes over email and SMS and checks submitted codes,
//! enforcing the throttle policy and the persist-after-delivery ordering.

pub mod code;
pub mod service;
pub mod traits;
pub mod types;


pub use code::{codes_match, CodeGenerator};
pub use service::VerificationService;
pub use traits::{EmailDelivery, SmsDelivery};
pub use types::IssueOutcome;
