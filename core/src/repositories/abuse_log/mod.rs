pub mod r#trait {
    pub use super::trait_::*;
}
#[path = "trait.rs"]
mod trait_;
pub mod mock;

pub use mock::MockAbuseLogRepository;
pub use r#trait::AbuseLogRepository;

use std::time::Duration;

use crate::domain::entities::abuse_log::AbuseLogEntry;

/// Delay before the single retry of a failed evidence write
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Append an entry, retrying once after a fixed delay.
///
/// Evidence writes are non-critical side effects: a failed append must
/// never fail the primary operation, so after the one retry the error is
/// logged and swallowed.
pub async fn record_with_retry<A: AbuseLogRepository + ?Sized>(log: &A, entry: AbuseLogEntry) {
    let first = log.record(entry.clone()).await;
    let Err(err) = first else {
        return;
    };

    tracing::warn!(
        action = entry.action.as_str(),
        error = %err,
        event = "abuse_log_write_retry",
        "Abuse log write failed, retrying once"
    );
    tokio::time::sleep(RETRY_DELAY).await;

    if let Err(err) = log.record(entry.clone()).await {
        tracing::error!(
            action = entry.action.as_str(),
            error = %err,
            event = "abuse_log_write_dropped",
            "Abuse log write failed permanently"
        );
    }
}
