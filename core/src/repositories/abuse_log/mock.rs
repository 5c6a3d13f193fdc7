//! In-memory implementation of AbuseLogRepository for testing

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::entities::abuse_log::{AbuseAction, AbuseLogEntry};
use crate::errors::{CoreError, CoreResult};

use super::trait_::AbuseLogRepository;

/// Mock abuse log for testing
pub struct MockAbuseLogRepository {
    entries: Arc<RwLock<Vec<AbuseLogEntry>>>,
    /// Fail this many `record` calls before succeeding (retry testing)
    fail_next_records: Arc<RwLock<u32>>,
}

impl MockAbuseLogRepository {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
            fail_next_records: Arc::new(RwLock::new(0)),
        }
    }

    pub async fn fail_next(&self, count: u32) {
        *self.fail_next_records.write().await = count;
    }

    pub async fn entries(&self) -> Vec<AbuseLogEntry> {
        self.entries.read().await.clone()
    }

    /// Seed an entry directly, bypassing the failure counter
    pub async fn seed(&self, entry: AbuseLogEntry) {
        self.entries.write().await.push(entry);
    }
}

impl Default for MockAbuseLogRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AbuseLogRepository for MockAbuseLogRepository {
    async fn record(&self, entry: AbuseLogEntry) -> CoreResult<()> {
        {
            let mut remaining = self.fail_next_records.write().await;
            if *remaining > 0 {
                *remaining -= 1;
                return Err(CoreError::store("mock abuse log write failure"));
            }
        }
        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn count_by_ip(
        &self,
        ip: &str,
        since: DateTime<Utc>,
        exclude: &[AbuseAction],
    ) -> CoreResult<u64> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|e| e.ip == ip && e.created_at >= since && !exclude.contains(&e.action))
            .count() as u64)
    }

    async fn count_by_identity(
        &self,
        identity: &str,
        since: DateTime<Utc>,
        exclude: &[AbuseAction],
    ) -> CoreResult<u64> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|e| {
                e.identity.as_deref() == Some(identity)
                    && e.created_at >= since
                    && !exclude.contains(&e.action)
            })
            .count() as u64)
    }

    async fn recent_by_country_prefix(
        &self,
        prefix: &str,
        since: DateTime<Utc>,
    ) -> CoreResult<Vec<AbuseLogEntry>> {
        let entries = self.entries.read().await;
        let mut matching: Vec<AbuseLogEntry> = entries
            .iter()
            .filter(|e| e.country_prefix.as_deref() == Some(prefix) && e.created_at >= since)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }
}
