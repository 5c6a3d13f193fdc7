//! Wire request and response shapes for the signup operations.
//!
//! Field names are part of the external contract and use the client's
//! casing; the serde renames below are load-bearing.

use serde::{Deserialize, Serialize};

/// Request body for issuing an email verification code
#[derive(Debug, Clone, Deserialize)]
pub struct RequestEmailCodeRequest {
    pub email: String,

    /// Message template language; defaults to English
    #[serde(default)]
    pub locale: Option<String>,
}

/// Response for an email code request.
///
/// Untagged so the blocklist drop serializes as `{"success":true,
/// "token":null}`, indistinguishable in shape from an ordinary success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestEmailCodeResponse {
    Issued {
        success: bool,
        /// Normalized address the code went to
        email: String,
        /// Opaque request reference
        xref: String,
    },
    Dropped {
        success: bool,
        token: Option<String>,
    },
}

impl RequestEmailCodeResponse {
    pub fn issued(email: String, xref: String) -> Self {
        Self::Issued {
            success: true,
            email,
            xref,
        }
    }

    pub fn dropped() -> Self {
        Self::Dropped {
            success: true,
            token: None,
        }
    }
}

/// Request body for issuing an SMS verification code
#[derive(Debug, Clone, Deserialize)]
pub struct RequestSmsRequest {
    /// National number as typed by the user
    #[serde(rename = "phoneNumber")]
    pub phone_number: String,

    /// Country calling code, with or without leading '+'
    pub prefix: String,

    /// Captcha token for the SMS flow
    pub phone_recaptcha: String,
}

/// Response for an SMS code request; untagged for the same reason as the
/// email variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestSmsResponse {
    Issued {
        success: bool,
        /// Normalized E.164 number the code went to
        #[serde(rename = "phoneNumber")]
        phone_number: String,
        /// Opaque request reference
        #[serde(rename = "ref")]
        ref_code: String,
    },
    Dropped {
        success: bool,
        token: Option<String>,
    },
}

impl RequestSmsResponse {
    pub fn issued(phone_number: String, ref_code: String) -> Self {
        Self::Issued {
            success: true,
            phone_number,
            ref_code,
        }
    }

    pub fn dropped() -> Self {
        Self::Dropped {
            success: true,
            token: None,
        }
    }
}

/// Request body for checking an email code
#[derive(Debug, Clone, Deserialize)]
pub struct CheckEmailCodeRequest {
    pub email: String,

    #[serde(rename = "emailCode")]
    pub email_code: String,
}

/// Request body for checking a phone code
#[derive(Debug, Clone, Deserialize)]
pub struct CheckPhoneCodeRequest {
    #[serde(rename = "phoneNumber")]
    pub phone_number: String,

    #[serde(rename = "phoneCode")]
    pub phone_code: String,
}

/// Response for either code check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckCodeResponse {
    pub success: bool,
}

impl CheckCodeResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Request body for the username availability probe
#[derive(Debug, Clone, Deserialize)]
pub struct CheckUsernameRequest {
    pub username: String,
}

/// Response for the username availability probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckUsernameResponse {
    pub success: bool,
    pub available: bool,
}

/// Request body for finalizing a signup
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,

    pub email: String,

    #[serde(rename = "emailCode")]
    pub email_code: String,

    #[serde(rename = "phoneNumber")]
    pub phone_number: String,

    #[serde(rename = "phoneCode")]
    pub phone_code: String,

    pub recaptcha: String,
}

/// Response carrying the signed continuation token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateUserResponse {
    pub success: bool,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dropped_response_shape() {
        let json = serde_json::to_string(&RequestEmailCodeResponse::dropped()).unwrap();
        assert_eq!(json, r#"{"success":true,"token":null}"#);

        let json = serde_json::to_string(&RequestSmsResponse::dropped()).unwrap();
        assert_eq!(json, r#"{"success":true,"token":null}"#);
    }

    #[test]
    fn test_issued_response_field_names() {
        let json = serde_json::to_string(&RequestSmsResponse::issued(
            "+639171234567".to_string(),
            "abc-123".to_string(),
        ))
        .unwrap();
        assert_eq!(
            json,
            r#"{"success":true,"phoneNumber":"+639171234567","ref":"abc-123"}"#
        );

        let json = serde_json::to_string(&RequestEmailCodeResponse::issued(
            "a@example.com".to_string(),
            "xyz-789".to_string(),
        ))
        .unwrap();
        assert_eq!(
            json,
            r#"{"success":true,"email":"a@example.com","xref":"xyz-789"}"#
        );
    }

    #[test]
    fn test_create_user_request_field_names() {
        let req: CreateUserRequest = serde_json::from_str(
            r#"{
                "username": "alice",
                "email": "a@example.com",
                "emailCode": "123456",
                "phoneNumber": "+639171234567",
                "phoneCode": "654321",
                "recaptcha": "tok"
            }"#,
        )
        .unwrap();
        assert_eq!(req.email_code, "123456");
        assert_eq!(req.phone_code, "654321");
        assert_eq!(req.phone_number, "+639171234567");
    }
}
