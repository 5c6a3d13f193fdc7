//! Client-facing error kinds
//!
//! Each kind carries a stable string that is part of the existing client
//! contract: the boundary layer maps it to a localized message, so the
//! strings here must never change once shipped. The kind also knows which
//! form field it usually belongs to and its HTTP status.

use serde::Serialize;
use thiserror::Error;

/// Stable, client-mappable error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Per-address cooldown: one issue-or-verify action per 60 seconds
    WaitOneMinute,
    /// Daily send cap reached, or country-level request pressure too high
    RequestTooMuch,
    /// Global per-IP or per-identity action limit reached
    ActionsLimit,
    /// Submitted email code does not match the outstanding one
    EmailCodeInvalid,
    /// Submitted phone code does not match the outstanding one
    PhoneCodeInvalid,
    /// The outstanding email code passed its 30 minute lifetime
    EmailCodeExpired,
    /// The outstanding phone code passed its 30 minute lifetime
    PhoneCodeExpired,
    /// Attempt ceiling reached for the current email code cycle
    EmailTooMany,
    /// Attempt ceiling reached for the current phone code cycle
    PhoneTooMany,
    /// No verification record exists for the email address
    UnknownEmail,
    /// No verification record exists for the phone number
    UnknownPhone,
    /// Email already bound to a fully-created account
    EmailUsed,
    /// Phone number already bound to a fully-created account
    PhoneUsed,
    /// Username already taken on chain or locally
    UserExist,
    /// Syntactically invalid email address
    EmailInvalid,
    /// Syntactically invalid phone number or dial prefix
    PhoneInvalid,
    /// A required form field is missing or empty
    FieldRequired,
    /// Captcha verification failed
    RecaptchaInvalid,
}

impl ErrorKind {
    /// Stable wire string for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::WaitOneMinute => "error_api_wait_one_minute",
            ErrorKind::RequestTooMuch => "error_api_request_too_much",
            ErrorKind::ActionsLimit => "error_api_actions_limit",
            ErrorKind::EmailCodeInvalid => "error_api_email_code_invalid",
            ErrorKind::PhoneCodeInvalid => "error_api_phone_code_invalid",
            ErrorKind::EmailCodeExpired => "error_api_email_code_expired",
            ErrorKind::PhoneCodeExpired => "error_api_phone_code_expired",
            ErrorKind::EmailTooMany => "error_api_email_too_many",
            ErrorKind::PhoneTooMany => "error_api_phone_too_many",
            ErrorKind::UnknownEmail => "error_api_unknown_email",
            ErrorKind::UnknownPhone => "error_api_unknown_phone_number",
            ErrorKind::EmailUsed => "error_api_email_used",
            ErrorKind::PhoneUsed => "error_api_phone_used",
            ErrorKind::UserExist => "error_api_user_exist",
            ErrorKind::EmailInvalid => "error_api_email_invalid",
            ErrorKind::PhoneInvalid => "error_api_phone_invalid",
            ErrorKind::FieldRequired => "error_api_field_required",
            ErrorKind::RecaptchaInvalid => "error_api_recaptcha_invalid",
        }
    }

    /// The form field this kind is usually reported against
    pub fn default_field(&self) -> &'static str {
        match self {
            ErrorKind::WaitOneMinute
            | ErrorKind::RequestTooMuch
            | ErrorKind::ActionsLimit
            | ErrorKind::UnknownEmail
            | ErrorKind::EmailUsed
            | ErrorKind::EmailInvalid => "email",
            ErrorKind::UnknownPhone | ErrorKind::PhoneUsed | ErrorKind::PhoneInvalid => {
                "phoneNumber"
            }
            ErrorKind::EmailCodeInvalid => "emailCode",
            ErrorKind::PhoneCodeInvalid => "phoneCode",
            ErrorKind::EmailCodeExpired
            | ErrorKind::PhoneCodeExpired
            | ErrorKind::EmailTooMany
            | ErrorKind::PhoneTooMany => "code",
            ErrorKind::UserExist => "username",
            ErrorKind::FieldRequired => "form",
            ErrorKind::RecaptchaInvalid => "recaptcha",
        }
    }

    /// HTTP status for this kind (policy and validation errors are all 4xx)
    pub fn status(&self) -> u16 {
        400
    }

    /// Build an [`ApiError`] reported against an explicit form field
    pub fn for_field(self, field: &'static str) -> ApiError {
        ApiError { kind: self, field }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified, client-visible rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind} (field: {field})")]
pub struct ApiError {
    /// Stable error kind
    pub kind: ErrorKind,
    /// Form field the error is reported against
    pub field: &'static str,
}

impl From<ErrorKind> for ApiError {
    fn from(kind: ErrorKind) -> Self {
        ApiError {
            kind,
            field: kind.default_field(),
        }
    }
}

/// Wire shape of a rejected request:
/// `{"error": {"type": ..., "field": ..., "status": ...}}`
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    #[serde(rename = "type")]
    pub kind: String,
    pub field: String,
    pub status: u16,
}

impl ApiError {
    pub fn status(&self) -> u16 {
        self.kind.status()
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            error: ErrorDetail {
                kind: self.kind.as_str().to_string(),
                field: self.field.to_string(),
                status: self.status(),
            },
        }
    }
}
