//! One-time code generation and comparison.

use constant_time_eq::constant_time_eq;
use rand::rngs::OsRng;
use rand::Rng;

/// Numeric one-time code generator backed by the OS CSPRNG.
///
/// Each digit is drawn independently, so leading zeros are as likely as any
/// other digit and the code space is the full 10^length.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeGenerator;

impl CodeGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate a numeric code of the given length
    pub fn generate(&self, length: usize) -> String {
        let mut rng = OsRng;
        (0..length)
            .map(|_| char::from(b'0' + rng.gen_range(0..=9u8)))
            .collect()
    }
}

/// Constant-time comparison of a submitted code against the stored one.
///
/// A record without a stored code never matches.
pub fn codes_match(stored: Option<&str>, submitted: &str) -> bool {
    match stored {
        Some(stored) => constant_time_eq(stored.as_bytes(), submitted.as_bytes()),
        None => false,
    }
}
