//! Signup orchestrator.
//!
//! Front door for the whole flow: validates and normalizes wire input,
//! drives the verification service for the two code channels, and runs the
//! finalize sequence that ends in a signed continuation token.
//!
//! Finalize never trusts prior per-channel check results. It re-checks raw
//! code equality against both stored records without counting attempts, so
//! a token can only be minted while both submitted codes still match.

use std::sync::Arc;

use sg_shared::utils::{email, hash_identity, phone};

use crate::domain::clock::Clock;
use crate::domain::entities::abuse_log::{AbuseAction, AbuseLogEntry};
use crate::domain::entities::verification_record::Channel;
use crate::errors::{CoreError, CoreResult, ErrorKind};
use crate::repositories::{record_with_retry, AbuseLogRepository, VerificationStore};
use crate::services::token::SignupTokenService;
use crate::services::verification::{codes_match, IssueOutcome, VerificationService};
use crate::services::verification::{EmailDelivery, SmsDelivery};

use super::traits::{CaptchaVerifier, ChainDirectory, UserDirectory};
use super::types::{
    CheckCodeResponse, CheckEmailCodeRequest, CheckPhoneCodeRequest, CheckUsernameRequest,
    CheckUsernameResponse, CreateUserRequest, CreateUserResponse, RequestEmailCodeRequest,
    RequestEmailCodeResponse, RequestSmsRequest, RequestSmsResponse,
};

/// Signup flow orchestrator over injected stores, providers and directories
pub struct SignupService<V, A, E, S, C, U, P>
where
    V: VerificationStore,
    A: AbuseLogRepository,
    E: EmailDelivery,
    S: SmsDelivery,
    C: ChainDirectory,
    U: UserDirectory,
    P: CaptchaVerifier,
{
    abuse_log: Arc<A>,
    verification: Arc<VerificationService<V, A, E, S>>,
    chain: Arc<C>,
    users: Arc<U>,
    captcha: Arc<P>,
    tokens: Arc<SignupTokenService>,
    clock: Arc<dyn Clock>,
}

impl<V, A, E, S, C, U, P> SignupService<V, A, E, S, C, U, P>
where
    V: VerificationStore,
    A: AbuseLogRepository,
    E: EmailDelivery,
    S: SmsDelivery,
    C: ChainDirectory,
    U: UserDirectory,
    P: CaptchaVerifier,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        abuse_log: Arc<A>,
        verification: Arc<VerificationService<V, A, E, S>>,
        chain: Arc<C>,
        users: Arc<U>,
        captcha: Arc<P>,
        tokens: Arc<SignupTokenService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            abuse_log,
            verification,
            chain,
            users,
            captcha,
            tokens,
            clock,
        }
    }

    /// Issue a verification code to the given email address
    pub async fn request_email_code(
        &self,
        req: RequestEmailCodeRequest,
        ip: &str,
    ) -> CoreResult<RequestEmailCodeResponse> {
        let raw = req.email.trim();
        if raw.is_empty() {
            return Err(ErrorKind::FieldRequired.for_field("email").into());
        }
        let address = email::normalize_email(raw);
        if !email::is_valid_email(&address) {
            return Err(ErrorKind::EmailInvalid.into());
        }

        match self
            .verification
            .request_email_code(&address, req.locale.as_deref(), ip)
            .await?
        {
            IssueOutcome::Issued { ref_code } => {
                Ok(RequestEmailCodeResponse::issued(address, ref_code))
            }
            IssueOutcome::SilentlyDropped => Ok(RequestEmailCodeResponse::dropped()),
        }
    }

    /// Issue a verification code to the given phone number by SMS
    pub async fn request_sms(
        &self,
        req: RequestSmsRequest,
        ip: &str,
    ) -> CoreResult<RequestSmsResponse> {
        if req.phone_recaptcha.trim().is_empty() {
            return Err(ErrorKind::FieldRequired.for_field("phone_recaptcha").into());
        }
        if req.phone_number.trim().is_empty() {
            return Err(ErrorKind::FieldRequired.for_field("phoneNumber").into());
        }

        let passed = self
            .captcha
            .verify(req.phone_recaptcha.trim(), ip)
            .await
            .map_err(|e| CoreError::upstream("captcha", e))?;
        if !passed {
            return Err(ErrorKind::RecaptchaInvalid
                .for_field("phone_recaptcha")
                .into());
        }

        let Some(address) = phone::normalize_from_parts(req.prefix.trim(), &req.phone_number)
        else {
            return Err(ErrorKind::PhoneInvalid.into());
        };

        match self.verification.request_phone_code(&address, ip).await? {
            IssueOutcome::Issued { ref_code } => Ok(RequestSmsResponse::issued(address, ref_code)),
            IssueOutcome::SilentlyDropped => Ok(RequestSmsResponse::dropped()),
        }
    }

    /// Check a submitted email code
    pub async fn check_email_code(
        &self,
        req: CheckEmailCodeRequest,
        ip: &str,
    ) -> CoreResult<CheckCodeResponse> {
        if req.email.trim().is_empty() {
            return Err(ErrorKind::FieldRequired.for_field("email").into());
        }
        if req.email_code.trim().is_empty() {
            return Err(ErrorKind::FieldRequired.for_field("emailCode").into());
        }

        let address = email::normalize_email(&req.email);
        self.verification
            .submit_email_code(&address, req.email_code.trim(), ip)
            .await?;
        Ok(CheckCodeResponse::ok())
    }

    /// Check a submitted phone code
    pub async fn check_phone_code(
        &self,
        req: CheckPhoneCodeRequest,
        ip: &str,
    ) -> CoreResult<CheckCodeResponse> {
        if req.phone_number.trim().is_empty() {
            return Err(ErrorKind::FieldRequired.for_field("phoneNumber").into());
        }
        if req.phone_code.trim().is_empty() {
            return Err(ErrorKind::FieldRequired.for_field("phoneCode").into());
        }

        let address = req.phone_number.trim();
        if !phone::is_valid_phone_format(address) {
            return Err(ErrorKind::PhoneInvalid.into());
        }

        self.verification
            .submit_phone_code(address, req.phone_code.trim(), ip)
            .await?;
        Ok(CheckCodeResponse::ok())
    }

    /// Probe whether a username is still free.
    ///
    /// Deliberately outside the per-IP action count so polling an
    /// availability box cannot exhaust a client's quota.
    pub async fn check_username(
        &self,
        req: CheckUsernameRequest,
        ip: &str,
    ) -> CoreResult<CheckUsernameResponse> {
        let username = req.username.trim();
        if username.is_empty() {
            return Err(ErrorKind::FieldRequired.for_field("username").into());
        }

        let taken = self
            .users
            .username_in_use(username)
            .await
            .map_err(|e| CoreError::upstream("users", e))?
            || self
                .chain
                .is_username_taken(username)
                .await
                .map_err(|e| CoreError::upstream("chain", e))?;

        record_with_retry(
            &*self.abuse_log,
            AbuseLogEntry::new(AbuseAction::CheckUsername, ip, self.clock.now()),
        )
        .await;

        Ok(CheckUsernameResponse {
            success: true,
            available: !taken,
        })
    }

    /// Finalize a signup and mint the continuation token.
    ///
    /// Sequence: required fields, captcha, address uniqueness, raw code
    /// equality against both records, username uniqueness, token. The
    /// equality re-check counts no attempt and ignores the verified flag.
    pub async fn create_user(
        &self,
        req: CreateUserRequest,
        ip: &str,
    ) -> CoreResult<CreateUserResponse> {
        let required: [(&str, &'static str); 6] = [
            (&req.recaptcha, "recaptcha"),
            (&req.email, "email"),
            (&req.email_code, "emailCode"),
            (&req.phone_number, "phoneNumber"),
            (&req.phone_code, "phoneCode"),
            (&req.username, "username"),
        ];
        for (value, field) in required {
            if value.trim().is_empty() {
                return Err(ErrorKind::FieldRequired.for_field(field).into());
            }
        }

        let passed = self
            .captcha
            .verify(req.recaptcha.trim(), ip)
            .await
            .map_err(|e| CoreError::upstream("captcha", e))?;
        if !passed {
            return Err(ErrorKind::RecaptchaInvalid.into());
        }

        let email_address = email::normalize_email(&req.email);
        if !email::is_valid_email(&email_address) {
            return Err(ErrorKind::EmailInvalid.into());
        }
        let phone_number = req.phone_number.trim();
        if !phone::is_valid_phone_format(phone_number) {
            return Err(ErrorKind::PhoneInvalid.into());
        }
        let username = req.username.trim();

        if self.email_taken(&email_address).await? {
            return Err(ErrorKind::EmailUsed.into());
        }
        if self.phone_taken(phone_number).await? {
            return Err(ErrorKind::PhoneUsed.into());
        }

        let email_record = self
            .verification
            .find_record(Channel::Email, &email_address)
            .await?
            .ok_or(ErrorKind::UnknownEmail)?;
        let phone_record = self
            .verification
            .find_record(Channel::Phone, phone_number)
            .await?
            .ok_or(ErrorKind::UnknownPhone)?;

        if !codes_match(email_record.code.as_deref(), req.email_code.trim()) {
            return Err(ErrorKind::EmailCodeInvalid.into());
        }
        if !codes_match(phone_record.code.as_deref(), req.phone_code.trim()) {
            return Err(ErrorKind::PhoneCodeInvalid.into());
        }

        if self.username_taken(username).await? {
            return Err(ErrorKind::UserExist.into());
        }

        let token = self.tokens.issue(username, &email_address, phone_number)?;

        record_with_retry(
            &*self.abuse_log,
            AbuseLogEntry::new(AbuseAction::CreateUser, ip, self.clock.now())
                .with_identity(hash_identity(&email_address)),
        )
        .await;

        tracing::info!(
            email = %email::mask_email(&email_address),
            phone = %phone::mask_phone(phone_number),
            event = "signup_finalized",
            "Signup finalized and continuation token issued"
        );

        Ok(CreateUserResponse {
            success: true,
            token,
        })
    }

    /// Drop both verification records once the account actually exists
    pub async fn complete_signup(&self, email_address: &str, phone_number: &str) -> CoreResult<()> {
        let address = email::normalize_email(email_address);
        self.verification
            .complete_signup(&address, phone_number.trim())
            .await
    }

    async fn email_taken(&self, address: &str) -> CoreResult<bool> {
        let local = self
            .users
            .email_in_use(address)
            .await
            .map_err(|e| CoreError::upstream("users", e))?;
        if local {
            return Ok(true);
        }
        self.chain
            .is_email_registered(address)
            .await
            .map_err(|e| CoreError::upstream("chain", e))
    }

    async fn phone_taken(&self, number: &str) -> CoreResult<bool> {
        let local = self
            .users
            .phone_in_use(number)
            .await
            .map_err(|e| CoreError::upstream("users", e))?;
        if local {
            return Ok(true);
        }
        self.chain
            .is_phone_registered(number)
            .await
            .map_err(|e| CoreError::upstream("chain", e))
    }

    async fn username_taken(&self, username: &str) -> CoreResult<bool> {
        let local = self
            .users
            .username_in_use(username)
            .await
            .map_err(|e| CoreError::upstream("users", e))?;
        if local {
            return Ok(true);
        }
        self.chain
            .is_username_taken(username)
            .await
            .map_err(|e| CoreError::upstream("chain", e))
    }
}
