//! Append-only abuse log entries used as throttling evidence.
//!
//! Entries are written once and only ever queried by count/window
//! predicates; a separate retention sweep deletes old rows. Addresses are
//! stored as hashed identities, with `ref_code` correlating an entry back
//! to its verification record for the country-level policies.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Gateway action an abuse-log entry witnesses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbuseAction {
    RequestEmailCode,
    RequestSms,
    CheckEmailCode,
    CheckPhoneCode,
    CreateUser,
    /// Excluded from the per-IP qualifying-action count
    CheckUsername,
}

impl AbuseAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AbuseAction::RequestEmailCode => "request_email_code",
            AbuseAction::RequestSms => "request_sms",
            AbuseAction::CheckEmailCode => "check_email_code",
            AbuseAction::CheckPhoneCode => "check_phone_code",
            AbuseAction::CreateUser => "create_user",
            AbuseAction::CheckUsername => "check_username",
        }
    }
}

/// One appended piece of throttling evidence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbuseLogEntry {
    pub id: Uuid,

    /// Action that was performed
    pub action: AbuseAction,

    /// Caller IP
    pub ip: String,

    /// Hashed address identity, when the action targeted an address
    pub identity: Option<String>,

    /// Country calling code for phone actions (e.g. "+63")
    pub country_prefix: Option<String>,

    /// Correlates with `VerificationRecord::ref_code` (phone channel)
    pub ref_code: Option<String>,

    /// Free-form extension data; kept small and string-typed
    pub metadata: HashMap<String, String>,

    pub created_at: DateTime<Utc>,
}

impl AbuseLogEntry {
    pub fn new(action: AbuseAction, ip: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            action,
            ip: ip.into(),
            identity: None,
            country_prefix: None,
            ref_code: None,
            metadata: HashMap::new(),
            created_at,
        }
    }

    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    pub fn with_country_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.country_prefix = Some(prefix.into());
        self
    }

    pub fn with_ref_code(mut self, ref_code: impl Into<String>) -> Self {
        self.ref_code = Some(ref_code.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
