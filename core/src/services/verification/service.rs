//! Verification service: code issuance and code checking for both channels.
//!
//! The ordering contract for issuance is load, gate, deliver, persist; a
//! record is only mutated after the provider acknowledged the send, so a
//! failed delivery burns nothing from the caller's quota. Checking runs the
//! verify-side gates, counts the attempt before comparing, and compares in
//! constant time.

use std::collections::HashMap;
use std::sync::Arc;

use sg_shared::config::VerificationConfig;
use sg_shared::utils::{email, hash_identity, phone};
use uuid::Uuid;

use crate::domain::clock::Clock;
use crate::domain::entities::abuse_log::{AbuseAction, AbuseLogEntry};
use crate::domain::entities::verification_record::{Channel, VerificationRecord};
use crate::domain::time_window::TimeWindow;
use crate::errors::{CoreError, CoreResult, ErrorKind};
use crate::repositories::{record_with_retry, AbuseLogRepository, VerificationStore};
use crate::services::throttle::{Gate, SubmitGate, ThrottlePolicy};

use super::code::{codes_match, CodeGenerator};
use super::traits::{EmailDelivery, SmsDelivery};
use super::types::IssueOutcome;

/// Code issuance and verification over injected stores and providers
pub struct VerificationService<V, A, E, S>
where
    V: VerificationStore,
    A: AbuseLogRepository,
    E: EmailDelivery,
    S: SmsDelivery,
{
    store: Arc<V>,
    abuse_log: Arc<A>,
    throttle: Arc<ThrottlePolicy<V, A>>,
    email_delivery: Arc<E>,
    sms_delivery: Arc<S>,
    generator: CodeGenerator,
    config: VerificationConfig,
    clock: Arc<dyn Clock>,
}

impl<V, A, E, S> VerificationService<V, A, E, S>
where
    V: VerificationStore,
    A: AbuseLogRepository,
    E: EmailDelivery,
    S: SmsDelivery,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<V>,
        abuse_log: Arc<A>,
        throttle: Arc<ThrottlePolicy<V, A>>,
        email_delivery: Arc<E>,
        sms_delivery: Arc<S>,
        config: VerificationConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            abuse_log,
            throttle,
            email_delivery,
            sms_delivery,
            generator: CodeGenerator::new(),
            config,
            clock,
        }
    }

    fn send_window(&self) -> TimeWindow {
        self.throttle.send_window()
    }

    fn expiry(&self) -> TimeWindow {
        TimeWindow::minutes(self.config.code_expiration_minutes)
    }

    fn max_attempts(&self, channel: Channel) -> u32 {
        match channel {
            Channel::Email => self.config.email_max_attempts,
            Channel::Phone => self.config.phone_max_attempts,
        }
    }

    /// Issue a verification code to a normalized email address.
    ///
    /// `locale` selects the message template language and defaults to
    /// English when absent.
    pub async fn request_email_code(
        &self,
        address: &str,
        locale: Option<&str>,
        ip: &str,
    ) -> CoreResult<IssueOutcome> {
        let (mut record, _created) = self.store.find_or_create(Channel::Email, address).await?;

        match self.throttle.check_request_code(&record, ip).await? {
            Gate::SilentDrop => return Ok(IssueOutcome::SilentlyDropped),
            Gate::Proceed => {}
        }

        let code = self.generator.generate(self.config.email_code_length);
        let mut vars = HashMap::new();
        vars.insert("code".to_string(), code.clone());
        vars.insert("locale".to_string(), locale.unwrap_or("en").to_string());

        self.email_delivery
            .send_email(address, "verification_code", &vars)
            .await
            .map_err(|e| {
                tracing::error!(
                    to = %email::mask_email(address),
                    error = %e,
                    event = "email_delivery_failed",
                    "Verification email could not be delivered"
                );
                CoreError::delivery("email", e)
            })?;

        // Provider acknowledged; only now does the record change
        let now = self.clock.now();
        record.begin_cycle(Some(code), now, self.send_window());
        self.store.save(&record).await?;

        let ref_code = Uuid::new_v4().to_string();
        record_with_retry(
            &*self.abuse_log,
            AbuseLogEntry::new(AbuseAction::RequestEmailCode, ip, now)
                .with_identity(hash_identity(address)),
        )
        .await;

        tracing::info!(
            to = %email::mask_email(address),
            sent_count = record.sent_count,
            event = "email_code_issued",
            "Verification code emailed"
        );
        Ok(IssueOutcome::Issued { ref_code })
    }

    /// Issue a verification code to a normalized E.164 phone number.
    ///
    /// In provider-hosted mode the provider generates and keeps the code;
    /// the local record tracks only the cycle.
    pub async fn request_phone_code(&self, address: &str, ip: &str) -> CoreResult<IssueOutcome> {
        let (mut record, _created) = self.store.find_or_create(Channel::Phone, address).await?;

        match self.throttle.check_request_code(&record, ip).await? {
            Gate::SilentDrop => return Ok(IssueOutcome::SilentlyDropped),
            Gate::Proceed => {}
        }

        let code = if self.config.provider_hosted_sms_codes {
            self.sms_delivery
                .send_sms_code(address)
                .await
                .map_err(|e| self.sms_delivery_error(address, e))?;
            None
        } else {
            let code = self.generator.generate(self.config.phone_code_length);
            let body = format!("Your verification code is {}", code);
            self.sms_delivery
                .send_sms(address, &body)
                .await
                .map_err(|e| self.sms_delivery_error(address, e))?;
            Some(code)
        };

        let now = self.clock.now();
        let ref_code = Uuid::new_v4().to_string();
        record.begin_cycle(code, now, self.send_window());
        record.ref_code = Some(ref_code.clone());
        self.store.save(&record).await?;

        let mut entry = AbuseLogEntry::new(AbuseAction::RequestSms, ip, now)
            .with_identity(hash_identity(address))
            .with_ref_code(ref_code.clone());
        if let Some(prefix) = phone::country_calling_code(address) {
            entry = entry.with_country_prefix(prefix);
        }
        record_with_retry(&*self.abuse_log, entry).await;

        tracing::info!(
            to = %phone::mask_phone(address),
            sent_count = record.sent_count,
            event = "sms_code_issued",
            "Verification code sent by SMS"
        );
        Ok(IssueOutcome::Issued { ref_code })
    }

    /// Check a submitted code against the email record's outstanding code
    pub async fn submit_email_code(&self, address: &str, code: &str, ip: &str) -> CoreResult<()> {
        self.submit(Channel::Email, address, code, ip).await
    }

    /// Check a submitted code against the phone record's outstanding code
    pub async fn submit_phone_code(&self, address: &str, code: &str, ip: &str) -> CoreResult<()> {
        self.submit(Channel::Phone, address, code, ip).await
    }

    async fn submit(
        &self,
        channel: Channel,
        address: &str,
        submitted: &str,
        ip: &str,
    ) -> CoreResult<()> {
        let Some(mut record) = self.store.find(channel, address).await? else {
            let kind = match channel {
                Channel::Email => ErrorKind::UnknownEmail,
                Channel::Phone => ErrorKind::UnknownPhone,
            };
            return Err(kind.into());
        };

        if !record.has_outstanding_cycle() {
            // Nothing was ever issued for this record
            return Err(self.invalid_code_error(channel).into());
        }

        match self
            .throttle
            .check_submit_code(&record, self.max_attempts(channel), self.expiry())?
        {
            SubmitGate::Expired => {
                record.expire_cycle();
                self.store.save(&record).await?;
                let kind = match channel {
                    Channel::Email => ErrorKind::EmailCodeExpired,
                    Channel::Phone => ErrorKind::PhoneCodeExpired,
                };
                return Err(kind.for_field("code").into());
            }
            SubmitGate::Proceed => {}
        }

        // The attempt counts whether or not the code matches
        let now = self.clock.now();
        record.register_attempt(now);
        self.store.save(&record).await?;

        let action = match channel {
            Channel::Email => AbuseAction::CheckEmailCode,
            Channel::Phone => AbuseAction::CheckPhoneCode,
        };
        let mut entry =
            AbuseLogEntry::new(action, ip, now).with_identity(hash_identity(address));
        if channel == Channel::Phone {
            if let Some(ref_code) = &record.ref_code {
                entry = entry.with_ref_code(ref_code.clone());
            }
            if let Some(prefix) = phone::country_calling_code(address) {
                entry = entry.with_country_prefix(prefix);
            }
        }
        record_with_retry(&*self.abuse_log, entry).await;

        let matched = if record.has_outstanding_code() {
            codes_match(record.code.as_deref(), submitted)
        } else if channel == Channel::Phone && self.config.provider_hosted_sms_codes {
            let matched = self
                .sms_delivery
                .check_sms_code(address, submitted)
                .await
                .map_err(|e| self.sms_delivery_error(address, e))?;
            if matched {
                record.adopt_code(submitted);
            }
            matched
        } else {
            false
        };

        if !matched {
            tracing::warn!(
                channel = channel.as_str(),
                attempts = record.attempts,
                event = "code_mismatch",
                "Submitted verification code did not match"
            );
            return Err(self.invalid_code_error(channel).into());
        }

        record.mark_verified(now);
        self.store.save(&record).await?;

        tracing::info!(
            channel = channel.as_str(),
            event = "code_verified",
            "Verification code accepted"
        );
        Ok(())
    }

    fn invalid_code_error(&self, channel: Channel) -> crate::errors::ApiError {
        match channel {
            Channel::Email => ErrorKind::EmailCodeInvalid.for_field("code"),
            Channel::Phone => ErrorKind::PhoneCodeInvalid.for_field("code"),
        }
    }

    fn sms_delivery_error(&self, address: &str, message: String) -> CoreError {
        tracing::error!(
            to = %phone::mask_phone(address),
            error = %message,
            event = "sms_delivery_failed",
            "SMS provider call failed"
        );
        CoreError::delivery("sms", message)
    }

    /// Load a record for finalize-side inspection
    pub async fn find_record(
        &self,
        channel: Channel,
        address: &str,
    ) -> CoreResult<Option<VerificationRecord>> {
        self.store.find(channel, address).await
    }

    /// Drop both channel records once the account exists; idempotent
    pub async fn complete_signup(&self, email_address: &str, phone_number: &str) -> CoreResult<()> {
        self.store.delete(Channel::Email, email_address).await?;
        self.store.delete(Channel::Phone, phone_number).await?;
        tracing::info!(
            email = %email::mask_email(email_address),
            phone = %phone::mask_phone(phone_number),
            event = "verification_records_cleared",
            "Verification records removed after signup"
        );
        Ok(())
    }
}
