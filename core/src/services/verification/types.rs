//! Outcome types for the verification service.

/// Result of a code-issuance request that passed or was silently dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueOutcome {
    /// A code was generated and delivered; `ref_code` is the opaque
    /// reference echoed back to the caller
    Issued { ref_code: String },

    /// The address is blocklisted: nothing was delivered or persisted, but
    /// the caller must still answer success-shaped
    SilentlyDropped,
}

impl IssueOutcome {
    pub fn ref_code(&self) -> Option<&str> {
        match self {
            IssueOutcome::Issued { ref_code } => Some(ref_code),
            IssueOutcome::SilentlyDropped => None,
        }
    }
}
