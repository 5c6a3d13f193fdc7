//! # Signup Gateway Core
//!
//! Domain logic for the account signup gateway: per-channel one-time-code
//! verification, the layered throttle policy that guards it, and the
//! finalize step that turns two verified channels into a signed
//! continuation token.
//!
//! ## Architecture
//!
//! - `domain` - entities, the clock seam, and the time-window value type
//! - `repositories` - store traits plus in-memory implementations
//! - `services` - throttle policy, verification, tokens, signup orchestrator
//! - `errors` - classified error kinds and their wire mapping
//!
//! All collaborators (stores, delivery providers, directories, captcha,
//! clock) are injected traits, so the whole flow is testable without
//! network or wall-clock time.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

pub use domain::clock::{Clock, ManualClock, SystemClock};
pub use domain::entities::abuse_log::{AbuseAction, AbuseLogEntry};
pub use domain::entities::verification_record::{Channel, VerificationRecord, VerificationState};
pub use domain::time_window::TimeWindow;
pub use errors::{ApiError, CoreError, CoreResult, ErrorKind};
pub use repositories::{AbuseLogRepository, VerificationStore};
pub use services::signup::SignupService;
pub use services::throttle::{Gate, SubmitGate, ThrottlePolicy};
pub use services::token::{ContinuationClaims, SignupTokenService};
pub use services::verification::{IssueOutcome, VerificationService};
