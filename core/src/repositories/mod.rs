pub mod abuse_log;
pub mod verification;

pub use abuse_log::{record_with_retry, AbuseLogRepository, MockAbuseLogRepository};
pub use verification::{MockVerificationStore, VerificationStore};
