//! Per-channel verification record entity.
//!
//! One record exists per normalized address and channel. It carries the
//! outstanding one-time code, the attempt counter for the current code
//! cycle, and the rolling 24h send window, and is the single source of
//! truth the throttle policy and state machine read from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::time_window::TimeWindow;

/// Verification channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Email,
    Phone,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Phone => "phone",
        }
    }

    /// Wire form field this channel's address is reported against
    pub fn field_name(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Phone => "phoneNumber",
        }
    }
}

/// Observable state of one address's verification cycle
///
/// `Unstarted → CodeIssued → Verified`, with resend looping on
/// `CodeIssued`, lazy expiry to `CodeExpired` (the next request starts a
/// fresh cycle), and `Locked` once the attempt ceiling is hit (terminal
/// until the record is deleted).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationState {
    Unstarted,
    CodeIssued,
    Verified,
    CodeExpired,
    Locked,
}

/// Verification record for one address on one channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    /// Normalized email or E.164 phone number; unique per channel
    pub address: String,

    /// Channel this record belongs to
    pub channel: Channel,

    /// Outstanding code, present while a cycle is live; None for
    /// provider-hosted phone cycles until the provider confirms a match
    pub code: Option<String>,

    /// When the current cycle was started
    pub code_generated_at: Option<DateTime<Utc>>,

    /// Verification attempts within the current cycle
    pub attempts: u32,

    /// Codes issued within the current send window
    pub sent_count: u32,

    /// Start of the current rolling send window
    pub first_sent_at: Option<DateTime<Utc>>,

    /// Most recent issue-or-verify action; drives the 60s cooldown
    pub last_attempt_at: Option<DateTime<Utc>>,

    /// When a submitted code last matched; witness only, finalize re-checks
    /// raw code equality and never trusts this field alone
    pub verified_at: Option<DateTime<Utc>>,

    /// Correlates this record with its abuse-log entries (phone channel)
    pub ref_code: Option<String>,
}

impl VerificationRecord {
    /// Create an empty record for a previously-unseen address
    pub fn new(channel: Channel, address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            channel,
            code: None,
            code_generated_at: None,
            attempts: 0,
            sent_count: 0,
            first_sent_at: None,
            last_attempt_at: None,
            verified_at: None,
            ref_code: None,
        }
    }

    /// Whether a code cycle is currently live (locally or provider-hosted)
    pub fn has_outstanding_cycle(&self) -> bool {
        self.code_generated_at.is_some()
    }

    /// Whether a locally-stored code is outstanding
    pub fn has_outstanding_code(&self) -> bool {
        self.code.is_some()
    }

    /// Whether the current cycle has outlived the expiry window
    pub fn is_cycle_expired(&self, now: DateTime<Utc>, expiry: TimeWindow) -> bool {
        matches!(self.code_generated_at, Some(t) if !expiry.within(t, now))
    }

    /// Whether the 60s cooldown still covers the last action
    pub fn in_cooldown(&self, now: DateTime<Utc>, cooldown: TimeWindow) -> bool {
        matches!(self.last_attempt_at, Some(t) if cooldown.within(t, now))
    }

    /// Whether the rolling send cap forbids another issuance
    pub fn send_cap_reached(&self, now: DateTime<Utc>, cap: u32, window: TimeWindow) -> bool {
        self.sent_count >= cap && matches!(self.first_sent_at, Some(t) if window.within(t, now))
    }

    /// Whether the attempt ceiling for this cycle has been hit
    pub fn attempts_exhausted(&self, max_attempts: u32) -> bool {
        self.attempts >= max_attempts
    }

    /// Start a fresh code cycle.
    ///
    /// Resets the attempt counter (this is the only place it resets), stamps
    /// the cycle start, and rolls the send window: increment inside the
    /// window, restart at 1 outside it. `code` is None for provider-hosted
    /// phone cycles.
    pub fn begin_cycle(&mut self, code: Option<String>, now: DateTime<Utc>, window: TimeWindow) {
        self.code = code;
        self.code_generated_at = Some(now);
        self.attempts = 0;
        self.last_attempt_at = Some(now);
        self.verified_at = None;

        if matches!(self.first_sent_at, Some(t) if window.within(t, now)) {
            self.sent_count += 1;
        } else {
            self.first_sent_at = Some(now);
            self.sent_count = 1;
        }
    }

    /// Count a verification attempt; called unconditionally before the
    /// submitted code is compared
    pub fn register_attempt(&mut self, now: DateTime<Utc>) {
        self.attempts += 1;
        self.last_attempt_at = Some(now);
    }

    /// Kill the current cycle: the code is dead, a new one must be requested
    pub fn expire_cycle(&mut self) {
        self.code = None;
        self.code_generated_at = None;
        self.attempts = 0;
    }

    /// Record a successful match. The code is retained as the completion
    /// witness that finalize compares against.
    pub fn mark_verified(&mut self, now: DateTime<Utc>) {
        self.verified_at = Some(now);
    }

    /// Adopt a provider-confirmed code as if it had been locally generated,
    /// so later local comparisons within this cycle stay consistent
    pub fn adopt_code(&mut self, code: &str) {
        self.code = Some(code.to_string());
    }

    /// Current state of this record's cycle
    pub fn state(
        &self,
        now: DateTime<Utc>,
        expiry: TimeWindow,
        max_attempts: u32,
    ) -> VerificationState {
        if self.verified_at.is_some() {
            VerificationState::Verified
        } else if self.code_generated_at.is_none() {
            VerificationState::Unstarted
        } else if self.attempts_exhausted(max_attempts) {
            VerificationState::Locked
        } else if self.is_cycle_expired(now, expiry) {
            VerificationState::CodeExpired
        } else {
            VerificationState::CodeIssued
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn expiry() -> TimeWindow {
        TimeWindow::minutes(30)
    }

    fn send_window() -> TimeWindow {
        TimeWindow::hours(24)
    }

    #[test]
    fn test_new_record_is_unstarted() {
        let record = VerificationRecord::new(Channel::Email, "new@example.com");
        assert_eq!(record.attempts, 0);
        assert_eq!(record.sent_count, 0);
        assert!(!record.has_outstanding_cycle());
        assert_eq!(
            record.state(Utc::now(), expiry(), 100),
            VerificationState::Unstarted
        );
    }

    #[test]
    fn test_begin_cycle_resets_attempts_and_stamps_time() {
        let now = Utc::now();
        let mut record = VerificationRecord::new(Channel::Email, "new@example.com");
        record.attempts = 7;

        record.begin_cycle(Some("123456".to_string()), now, send_window());

        assert_eq!(record.attempts, 0);
        assert_eq!(record.code_generated_at, Some(now));
        assert_eq!(record.last_attempt_at, Some(now));
        assert_eq!(record.code.as_deref(), Some("123456"));
        assert_eq!(record.sent_count, 1);
        assert_eq!(record.first_sent_at, Some(now));
        assert_eq!(record.state(now, expiry(), 100), VerificationState::CodeIssued);
    }

    #[test]
    fn test_send_window_rolls_inside_and_resets_outside() {
        let start = Utc::now();
        let mut record = VerificationRecord::new(Channel::Email, "new@example.com");

        record.begin_cycle(Some("111111".to_string()), start, send_window());
        record.begin_cycle(
            Some("222222".to_string()),
            start + Duration::hours(1),
            send_window(),
        );
        assert_eq!(record.sent_count, 2);
        assert_eq!(record.first_sent_at, Some(start));

        // 24h + 1s after the window opened: reset to 1/now
        let later = start + Duration::hours(24) + Duration::seconds(1);
        record.begin_cycle(Some("333333".to_string()), later, send_window());
        assert_eq!(record.sent_count, 1);
        assert_eq!(record.first_sent_at, Some(later));
    }

    #[test]
    fn test_register_attempt_only_increments() {
        let now = Utc::now();
        let mut record = VerificationRecord::new(Channel::Phone, "+14155552671");
        record.begin_cycle(Some("123456".to_string()), now, send_window());

        for i in 1..=5 {
            record.register_attempt(now + Duration::seconds(i));
            assert_eq!(record.attempts, i as u32);
        }
    }

    #[test]
    fn test_cycle_expiry_boundary() {
        let issued = Utc::now();
        let mut record = VerificationRecord::new(Channel::Email, "new@example.com");
        record.begin_cycle(Some("123456".to_string()), issued, send_window());

        // Exactly 30 minutes: still live
        assert!(!record.is_cycle_expired(issued + Duration::minutes(30), expiry()));
        // 30 minutes + 1s: dead
        let late = issued + Duration::minutes(30) + Duration::seconds(1);
        assert!(record.is_cycle_expired(late, expiry()));
        assert_eq!(record.state(late, expiry(), 100), VerificationState::CodeExpired);

        record.expire_cycle();
        assert_eq!(record.code, None);
        assert_eq!(record.attempts, 0);
        assert_eq!(record.state(late, expiry(), 100), VerificationState::Unstarted);
    }

    #[test]
    fn test_locked_once_attempts_exhausted() {
        let now = Utc::now();
        let mut record = VerificationRecord::new(Channel::Phone, "+14155552671");
        record.begin_cycle(Some("123456".to_string()), now, send_window());

        for _ in 0..50 {
            record.register_attempt(now);
        }
        assert!(record.attempts_exhausted(50));
        assert_eq!(record.state(now, expiry(), 50), VerificationState::Locked);
    }

    #[test]
    fn test_verified_retains_code() {
        let now = Utc::now();
        let mut record = VerificationRecord::new(Channel::Email, "new@example.com");
        record.begin_cycle(Some("123456".to_string()), now, send_window());
        record.register_attempt(now);
        record.mark_verified(now);

        assert_eq!(record.state(now, expiry(), 100), VerificationState::Verified);
        // Finalize still needs the raw code for its equality re-check
        assert_eq!(record.code.as_deref(), Some("123456"));
    }

    #[test]
    fn test_cooldown_boundary() {
        let now = Utc::now();
        let cooldown = TimeWindow::seconds(60);
        let mut record = VerificationRecord::new(Channel::Email, "new@example.com");
        record.begin_cycle(Some("123456".to_string()), now, send_window());

        assert!(record.in_cooldown(now + Duration::seconds(59), cooldown));
        assert!(!record.in_cooldown(now + Duration::seconds(61), cooldown));
    }

    #[test]
    fn test_provider_hosted_cycle_adopts_code() {
        let now = Utc::now();
        let mut record = VerificationRecord::new(Channel::Phone, "+14155552671");
        record.begin_cycle(None, now, send_window());

        assert!(record.has_outstanding_cycle());
        assert!(!record.has_outstanding_code());
        assert_eq!(record.state(now, expiry(), 50), VerificationState::CodeIssued);

        record.adopt_code("987654");
        assert_eq!(record.code.as_deref(), Some("987654"));
    }

    #[test]
    fn test_send_cap_boundary() {
        let start = Utc::now();
        let mut record = VerificationRecord::new(Channel::Email, "new@example.com");
        for i in 0..5 {
            record.begin_cycle(
                Some("123456".to_string()),
                start + Duration::minutes(i * 2),
                send_window(),
            );
        }
        assert_eq!(record.sent_count, 5);
        assert!(record.send_cap_reached(start + Duration::hours(1), 5, send_window()));
        // Past the window the cap no longer applies
        assert!(!record.send_cap_reached(
            start + Duration::hours(24) + Duration::seconds(1),
            5,
            send_window()
        ));
    }
}
