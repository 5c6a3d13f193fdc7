//! Verification record store trait.
//!
//! The store is the only shared mutable resource besides the abuse log.
//! Implementations must serialize writes for a single `(channel, address)`
//! key (row-level locking or conditional updates); operations on different
//! addresses are fully independent. Last-writer-wins between racing
//! requests is acceptable, but `attempts`/`sent_count` must stay monotonic
//! under the policy, which per-address serialization guarantees.

use async_trait::async_trait;

use crate::domain::entities::verification_record::{Channel, VerificationRecord};
use crate::errors::CoreResult;

/// Persistence contract for [`VerificationRecord`]s
#[async_trait]
pub trait VerificationStore: Send + Sync {
    /// Find the record for an address, if one exists
    async fn find(&self, channel: Channel, address: &str)
        -> CoreResult<Option<VerificationRecord>>;

    /// Find the record for an address, creating an empty one if absent.
    ///
    /// Atomic with respect to concurrent callers for the same address: two
    /// racing calls must observe one row, never create duplicates.
    ///
    /// # Returns
    ///
    /// * `Ok((record, created))` - the record and whether it was just created
    async fn find_or_create(
        &self,
        channel: Channel,
        address: &str,
    ) -> CoreResult<(VerificationRecord, bool)>;

    /// Look up a record by its abuse-log correlation code
    async fn find_by_ref_code(&self, ref_code: &str) -> CoreResult<Option<VerificationRecord>>;

    /// Persist a mutated record
    async fn save(&self, record: &VerificationRecord) -> CoreResult<()>;

    /// Delete the record for an address; no error if absent
    async fn delete(&self, channel: Channel, address: &str) -> CoreResult<()>;
}
