//! Abuse log repository trait.
//!
//! The log is append-only: entries are recorded once and queried only by
//! the count/window predicates the throttle policy needs. Retention is a
//! separate sweep outside this crate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::abuse_log::{AbuseAction, AbuseLogEntry};
use crate::errors::CoreResult;

/// Persistence contract for abuse-log evidence
#[async_trait]
pub trait AbuseLogRepository: Send + Sync {
    /// Append one entry
    async fn record(&self, entry: AbuseLogEntry) -> CoreResult<()>;

    /// Count entries from an IP since `since`, skipping excluded actions
    async fn count_by_ip(
        &self,
        ip: &str,
        since: DateTime<Utc>,
        exclude: &[AbuseAction],
    ) -> CoreResult<u64>;

    /// Count entries for a hashed address identity since `since`, skipping
    /// excluded actions
    async fn count_by_identity(
        &self,
        identity: &str,
        since: DateTime<Utc>,
        exclude: &[AbuseAction],
    ) -> CoreResult<u64>;

    /// Entries for a country calling code since `since`, newest first
    async fn recent_by_country_prefix(
        &self,
        prefix: &str,
        since: DateTime<Utc>,
    ) -> CoreResult<Vec<AbuseLogEntry>>;
}
