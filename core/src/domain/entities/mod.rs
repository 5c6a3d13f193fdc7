//! Domain entities representing core business objects.

pub mod abuse_log;
pub mod verification_record;

// Re-export commonly used types
pub use abuse_log::{AbuseAction, AbuseLogEntry};
pub use verification_record::{Channel, VerificationRecord, VerificationState};
