//! Service layer: throttle policy, verification, tokens, and the signup
//! orchestrator that ties them together.

pub mod signup;
pub mod throttle;
pub mod token;
pub mod verification;

pub use signup::SignupService;
pub use throttle::{Gate, SubmitGate, ThrottlePolicy};
pub use token::{ContinuationClaims, SignupTokenService};
pub use verification::{CodeGenerator, IssueOutcome, VerificationService};
