//! In-memory implementation of VerificationStore for testing

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::entities::verification_record::{Channel, VerificationRecord};
use crate::errors::{CoreError, CoreResult};

use super::trait_::VerificationStore;

/// Mock verification store for testing
///
/// A single lock over the whole map, so per-address write serialization
/// holds trivially.
pub struct MockVerificationStore {
    records: Arc<RwLock<HashMap<(Channel, String), VerificationRecord>>>,
    pub fail_writes: bool,
}

impl MockVerificationStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            fail_writes: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            fail_writes: true,
        }
    }

    /// Number of records currently held
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

impl Default for MockVerificationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VerificationStore for MockVerificationStore {
    async fn find(
        &self,
        channel: Channel,
        address: &str,
    ) -> CoreResult<Option<VerificationRecord>> {
        let records = self.records.read().await;
        Ok(records.get(&(channel, address.to_string())).cloned())
    }

    async fn find_or_create(
        &self,
        channel: Channel,
        address: &str,
    ) -> CoreResult<(VerificationRecord, bool)> {
        let mut records = self.records.write().await;
        let key = (channel, address.to_string());
        if let Some(existing) = records.get(&key) {
            return Ok((existing.clone(), false));
        }
        let record = VerificationRecord::new(channel, address);
        records.insert(key, record.clone());
        Ok((record, true))
    }

    async fn find_by_ref_code(&self, ref_code: &str) -> CoreResult<Option<VerificationRecord>> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .find(|r| r.ref_code.as_deref() == Some(ref_code))
            .cloned())
    }

    async fn save(&self, record: &VerificationRecord) -> CoreResult<()> {
        if self.fail_writes {
            return Err(CoreError::store("mock store write failure"));
        }
        let mut records = self.records.write().await;
        records.insert(
            (record.channel, record.address.clone()),
            record.clone(),
        );
        Ok(())
    }

    async fn delete(&self, channel: Channel, address: &str) -> CoreResult<()> {
        let mut records = self.records.write().await;
        records.remove(&(channel, address.to_string()));
        Ok(())
    }
}
