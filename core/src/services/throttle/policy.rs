//! Layered throttle policy implementation.
//!
//! Rules run in a fixed order and the first failing rule aborts the whole
//! request with a classified error. Every rule is a pure read; nothing here
//! mutates a record or the abuse log, so a rejected request leaves no
//! side effects behind.

use std::sync::Arc;

use sg_shared::config::ThrottleConfig;
use sg_shared::utils::{email, hash_identity, phone};

use crate::domain::clock::Clock;
use crate::domain::entities::abuse_log::{AbuseAction, AbuseLogEntry};
use crate::domain::entities::verification_record::{Channel, VerificationRecord};
use crate::domain::time_window::TimeWindow;
use crate::errors::{CoreResult, ErrorKind};
use crate::repositories::{AbuseLogRepository, VerificationStore};

/// Actions the per-identity leg of rule 1 does not count. These are
/// throttled per address by the cooldown, the send cap, and the attempt
/// ceilings, and the identity is the address hash; counting them here would
/// make the identity limit fire before the send cap can ever be reached.
const IDENTITY_COUNT_EXEMPT: &[AbuseAction] = &[
    AbuseAction::RequestEmailCode,
    AbuseAction::RequestSms,
    AbuseAction::CheckEmailCode,
    AbuseAction::CheckPhoneCode,
];

/// Outcome of the issuance-side policy when no rule rejects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// All rules passed; issue the code
    Proceed,
    /// Blocklist short-circuit: answer success-shaped, deliver nothing.
    /// Deliberate, so probing clients cannot map the blocklist.
    SilentDrop,
}

/// Outcome of the verify-side policy when the attempt ceiling allows it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitGate {
    Proceed,
    /// The outstanding code outlived its window; the caller must kill the
    /// cycle and report it expired
    Expired,
}

/// Fixed-order rate-limiting rules evaluated before issuing or verifying
pub struct ThrottlePolicy<V, A>
where
    V: VerificationStore,
    A: AbuseLogRepository,
{
    store: Arc<V>,
    abuse_log: Arc<A>,
    config: ThrottleConfig,
    clock: Arc<dyn Clock>,
}

impl<V, A> ThrottlePolicy<V, A>
where
    V: VerificationStore,
    A: AbuseLogRepository,
{
    pub fn new(
        store: Arc<V>,
        abuse_log: Arc<A>,
        config: ThrottleConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            abuse_log,
            config,
            clock,
        }
    }

    /// Rolling window the send cap is counted over; the record's cycle
    /// bookkeeping must use the same window
    pub fn send_window(&self) -> TimeWindow {
        TimeWindow::hours(self.config.send_window_hours)
    }

    /// Evaluate the issuance rules for one "request a new code" call.
    ///
    /// Order is part of the contract:
    /// 1. global per-IP and per-identity action limits
    /// 2. per-address 60s cooldown
    /// 3. rolling daily send cap
    /// 4. high-frequency country policy (phone only)
    /// 5. delayed-send country list (phone only)
    /// 6. static blocklists, which silently drop instead of rejecting
    ///
    /// When both country rules would fire, rule 4 wins and classifies as
    /// `request_too_much`; rule 5 classifies as `wait_one_minute`.
    pub async fn check_request_code(
        &self,
        record: &VerificationRecord,
        ip: &str,
    ) -> CoreResult<Gate> {
        let now = self.clock.now();
        let field = record.channel.field_name();
        let prefix = match record.channel {
            Channel::Phone => phone::country_calling_code(&record.address),
            Channel::Email => None,
        };

        // Rule 1: global action limits
        let action_window = TimeWindow::hours(self.config.action_window_hours);
        let ip_actions = self
            .abuse_log
            .count_by_ip(ip, action_window.start(now), &[AbuseAction::CheckUsername])
            .await?;
        if ip_actions >= self.config.ip_action_limit {
            tracing::warn!(
                ip = ip,
                actions = ip_actions,
                event = "throttle_ip_actions",
                "IP exceeded the qualifying-action limit"
            );
            return Err(ErrorKind::ActionsLimit.for_field(field).into());
        }

        let identity = hash_identity(&record.address);
        let identity_actions = self
            .abuse_log
            .count_by_identity(&identity, action_window.start(now), IDENTITY_COUNT_EXEMPT)
            .await?;
        if identity_actions >= self.config.identity_action_limit {
            tracing::warn!(
                identity = %identity,
                actions = identity_actions,
                event = "throttle_identity_actions",
                "Address identity exceeded the action limit"
            );
            return Err(ErrorKind::ActionsLimit.for_field(field).into());
        }

        // Rule 2: per-address cooldown
        if record.in_cooldown(now, TimeWindow::seconds(self.config.cooldown_seconds)) {
            return Err(ErrorKind::WaitOneMinute.for_field(field).into());
        }

        // Rule 3: rolling daily send cap
        if record.send_cap_reached(
            now,
            self.config.daily_send_cap,
            TimeWindow::hours(self.config.send_window_hours),
        ) {
            return Err(ErrorKind::RequestTooMuch.for_field(field).into());
        }

        // Rules 4 and 5: country-level SMS defenses
        if let Some(prefix) = &prefix {
            self.check_high_frequency_country(prefix, &identity).await?;
            self.check_delayed_country(prefix).await?;
        }

        // Rule 6: static blocklists
        if self.is_blocklisted(record, prefix.as_deref()) {
            tracing::info!(
                channel = record.channel.as_str(),
                event = "throttle_blocklist_drop",
                "Blocklisted address silently dropped"
            );
            return Ok(Gate::SilentDrop);
        }

        Ok(Gate::Proceed)
    }

    /// Evaluate the verify-side rules for one "submit a code" call.
    ///
    /// The attempt ceiling is checked first and is terminal for the cycle;
    /// expiry is reported as a gate so the caller can clear the dead cycle
    /// before answering.
    pub fn check_submit_code(
        &self,
        record: &VerificationRecord,
        max_attempts: u32,
        expiry: TimeWindow,
    ) -> CoreResult<SubmitGate> {
        if record.attempts_exhausted(max_attempts) {
            let kind = match record.channel {
                Channel::Email => ErrorKind::EmailTooMany,
                Channel::Phone => ErrorKind::PhoneTooMany,
            };
            tracing::warn!(
                channel = record.channel.as_str(),
                attempts = record.attempts,
                event = "throttle_attempts_exhausted",
                "Attempt ceiling reached for the current code cycle"
            );
            return Err(kind.for_field("code").into());
        }

        if record.is_cycle_expired(self.clock.now(), expiry) {
            return Ok(SubmitGate::Expired);
        }

        Ok(SubmitGate::Proceed)
    }

    /// Rule 4: blunt SMS pumping concentrated on one country calling code.
    ///
    /// Fires when the most recent same-prefix send left a still-outstanding
    /// code and happened within the last 60 seconds, or when the in-window
    /// send count meets the threshold and the matching record saw an
    /// attempt within the last hour.
    async fn check_high_frequency_country(&self, prefix: &str, identity: &str) -> CoreResult<()> {
        let now = self.clock.now();
        let hf = &self.config.high_frequency;

        let entries = self
            .abuse_log
            .recent_by_country_prefix(prefix, TimeWindow::hours(hf.window_hours).start(now))
            .await?;
        let sends: Vec<&AbuseLogEntry> = entries
            .iter()
            .filter(|e| e.action == AbuseAction::RequestSms)
            .collect();

        // The most recent send from another number in this country
        let latest_other = sends
            .iter()
            .find(|e| e.identity.as_deref() != Some(identity));
        if let Some(latest) = latest_other {
            if TimeWindow::seconds(60).within(latest.created_at, now) {
                if let Some(other) = self.find_entry_record(latest).await? {
                    if other.has_outstanding_code() {
                        tracing::warn!(
                            prefix = prefix,
                            event = "throttle_country_burst",
                            "Back-to-back sends with an outstanding code in one country"
                        );
                        return Err(ErrorKind::RequestTooMuch.for_field("phoneNumber").into());
                    }
                }
            }
        }

        if sends.len() >= hf.threshold {
            if let Some(latest) = sends.first() {
                if let Some(matching) = self.find_entry_record(latest).await? {
                    let recent = TimeWindow::hours(hf.recent_attempt_hours);
                    if matches!(matching.last_attempt_at, Some(t) if recent.within(t, now)) {
                        tracing::warn!(
                            prefix = prefix,
                            sends = sends.len(),
                            event = "throttle_country_pressure",
                            "Country calling code over the request threshold"
                        );
                        return Err(ErrorKind::RequestTooMuch.for_field("phoneNumber").into());
                    }
                }
            }
        }

        Ok(())
    }

    /// Rule 5: coarse per-country delay for listed high-fraud regions.
    ///
    /// One send per listed country per timeout regardless of number, and a
    /// non-completed verification anywhere in the country extends the block.
    async fn check_delayed_country(&self, prefix: &str) -> CoreResult<()> {
        let dc = &self.config.delayed_countries;
        if !dc.prefixes.iter().any(|p| p == prefix) {
            return Ok(());
        }

        let now = self.clock.now();
        let entries = self
            .abuse_log
            .recent_by_country_prefix(
                prefix,
                TimeWindow::hours(dc.pending_timeout_hours).start(now),
            )
            .await?;
        let sends: Vec<&AbuseLogEntry> = entries
            .iter()
            .filter(|e| e.action == AbuseAction::RequestSms)
            .collect();

        if let Some(latest) = sends.first() {
            if TimeWindow::hours(dc.send_timeout_hours).within(latest.created_at, now) {
                tracing::warn!(
                    prefix = prefix,
                    event = "throttle_delayed_country_send",
                    "Delayed country already received a send within the timeout"
                );
                return Err(ErrorKind::WaitOneMinute.for_field("phoneNumber").into());
            }
        }

        for entry in &sends {
            if let Some(record) = self.find_entry_record(entry).await? {
                if record.has_outstanding_code() && record.verified_at.is_none() {
                    tracing::warn!(
                        prefix = prefix,
                        event = "throttle_delayed_country_pending",
                        "Delayed country has a non-completed verification"
                    );
                    return Err(ErrorKind::WaitOneMinute.for_field("phoneNumber").into());
                }
            }
        }

        Ok(())
    }

    /// Rule 6 predicate
    fn is_blocklisted(&self, record: &VerificationRecord, prefix: Option<&str>) -> bool {
        match record.channel {
            Channel::Email => match email::email_domain(&record.address) {
                Some(domain) => self
                    .config
                    .email_domain_blocklist
                    .iter()
                    .any(|blocked| blocked.eq_ignore_ascii_case(domain)),
                None => false,
            },
            Channel::Phone => match prefix {
                Some(prefix) => self
                    .config
                    .phone_prefix_blocklist
                    .iter()
                    .any(|blocked| blocked == prefix),
                None => false,
            },
        }
    }

    /// Resolve the verification record an abuse-log entry correlates with
    async fn find_entry_record(
        &self,
        entry: &AbuseLogEntry,
    ) -> CoreResult<Option<VerificationRecord>> {
        match &entry.ref_code {
            Some(ref_code) => self.store.find_by_ref_code(ref_code).await,
            None => Ok(None),
        }
    }
}
