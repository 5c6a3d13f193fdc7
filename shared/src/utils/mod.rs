//! Utility functions shared across the gateway crates

pub mod email;
pub mod phone;

use sha2::{Digest, Sha256};

/// Hash an address (email or phone) for use as a throttling identity
///
/// The abuse log stores identities rather than raw addresses so that
/// throttling evidence never contains personal data in the clear.
///
/// # Arguments
///
/// * `address` - Normalized email or E.164 phone number
///
/// # Returns
///
/// * `String` - Hexadecimal representation of the SHA-256 hash
pub fn hash_identity(address: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(address.as_bytes());
    let result = hasher.finalize();
    format!("{:x}", result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_identity() {
        let hash = hash_identity("new@example.com");
        // SHA-256 hex representation is 64 characters
        assert_eq!(hash.len(), 64);
        // Deterministic
        assert_eq!(hash, hash_identity("new@example.com"));
        // Different input, different hash
        assert_ne!(hash, hash_identity("other@example.com"));
    }
}
