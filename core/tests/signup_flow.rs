//! Integration test driving the public API through a complete signup.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use sg_core::repositories::{MockAbuseLogRepository, MockVerificationStore};
use sg_core::services::signup::types::{
    CheckEmailCodeRequest, CheckPhoneCodeRequest, CreateUserRequest, RequestEmailCodeRequest,
    RequestSmsRequest,
};
use sg_core::services::signup::{CaptchaVerifier, ChainDirectory, UserDirectory};
use sg_core::services::verification::{EmailDelivery, SmsDelivery};
use sg_core::{
    Clock, ErrorKind, SignupService, SignupTokenService, SystemClock, ThrottlePolicy,
    VerificationService,
};
use sg_shared::config::GatewayConfig;

const IP: &str = "203.0.113.20";

/// Captures the last code passed to either provider
#[derive(Default)]
struct CapturingDelivery {
    last_email_code: Mutex<Option<String>>,
    last_sms_code: Mutex<Option<String>>,
}

#[async_trait]
impl EmailDelivery for CapturingDelivery {
    async fn send_email(
        &self,
        _to: &str,
        _template: &str,
        vars: &HashMap<String, String>,
    ) -> Result<String, String> {
        *self.last_email_code.lock().unwrap() = vars.get("code").cloned();
        Ok("msg-1".to_string())
    }
}

#[async_trait]
impl SmsDelivery for CapturingDelivery {
    async fn send_sms(&self, _to: &str, body: &str) -> Result<String, String> {
        let code: String = body.chars().filter(|c| c.is_ascii_digit()).collect();
        *self.last_sms_code.lock().unwrap() = Some(code);
        Ok("msg-2".to_string())
    }

    async fn send_sms_code(&self, _to: &str) -> Result<String, String> {
        Ok("pending".to_string())
    }

    async fn check_sms_code(&self, _to: &str, _code: &str) -> Result<bool, String> {
        Ok(false)
    }
}

struct EmptyDirectories;

#[async_trait]
impl ChainDirectory for EmptyDirectories {
    async fn is_email_registered(&self, _email: &str) -> Result<bool, String> {
        Ok(false)
    }

    async fn is_phone_registered(&self, _phone: &str) -> Result<bool, String> {
        Ok(false)
    }

    async fn is_username_taken(&self, _username: &str) -> Result<bool, String> {
        Ok(false)
    }
}

#[async_trait]
impl UserDirectory for EmptyDirectories {
    async fn email_in_use(&self, _email: &str) -> Result<bool, String> {
        Ok(false)
    }

    async fn phone_in_use(&self, _phone: &str) -> Result<bool, String> {
        Ok(false)
    }

    async fn username_in_use(&self, _username: &str) -> Result<bool, String> {
        Ok(false)
    }
}

struct AcceptAllCaptcha;

#[async_trait]
impl CaptchaVerifier for AcceptAllCaptcha {
    async fn verify(&self, _token: &str, _ip: &str) -> Result<bool, String> {
        Ok(true)
    }
}

type Gateway = SignupService<
    MockVerificationStore,
    MockAbuseLogRepository,
    CapturingDelivery,
    CapturingDelivery,
    EmptyDirectories,
    EmptyDirectories,
    AcceptAllCaptcha,
>;

fn gateway(delivery: Arc<CapturingDelivery>) -> (Gateway, Arc<SignupTokenService>) {
    let config = GatewayConfig::default();
    let store = Arc::new(MockVerificationStore::new());
    let log = Arc::new(MockAbuseLogRepository::new());
    let clock = Arc::new(SystemClock) as Arc<dyn Clock>;

    let policy = Arc::new(ThrottlePolicy::new(
        store.clone(),
        log.clone(),
        config.throttle,
        clock.clone(),
    ));
    let verification = Arc::new(VerificationService::new(
        store,
        log.clone(),
        policy,
        delivery.clone(),
        delivery,
        config.verification,
        clock.clone(),
    ));
    let tokens = Arc::new(SignupTokenService::new(config.token, clock.clone()));

    let service = SignupService::new(
        log,
        verification,
        Arc::new(EmptyDirectories),
        Arc::new(EmptyDirectories),
        Arc::new(AcceptAllCaptcha),
        tokens.clone(),
        clock,
    );
    (service, tokens)
}

#[tokio::test]
async fn full_signup_flow_yields_valid_continuation_token() {
    let delivery = Arc::new(CapturingDelivery::default());
    let (service, tokens) = gateway(delivery.clone());

    service
        .request_email_code(
            RequestEmailCodeRequest {
                email: "carol@example.com".to_string(),
                locale: Some("en".to_string()),
            },
            IP,
        )
        .await
        .unwrap();
    let email_code = delivery.last_email_code.lock().unwrap().clone().unwrap();

    service
        .check_email_code(
            CheckEmailCodeRequest {
                email: "carol@example.com".to_string(),
                email_code: email_code.clone(),
            },
            IP,
        )
        .await
        .unwrap();

    service
        .request_sms(
            RequestSmsRequest {
                phone_number: "(415) 555-2671".to_string(),
                prefix: "+1".to_string(),
                phone_recaptcha: "tok".to_string(),
            },
            IP,
        )
        .await
        .unwrap();
    let phone_code = delivery.last_sms_code.lock().unwrap().clone().unwrap();

    service
        .check_phone_code(
            CheckPhoneCodeRequest {
                phone_number: "+14155552671".to_string(),
                phone_code: phone_code.clone(),
            },
            IP,
        )
        .await
        .unwrap();

    let resp = service
        .create_user(
            CreateUserRequest {
                username: "carol".to_string(),
                email: "carol@example.com".to_string(),
                email_code,
                phone_number: "+14155552671".to_string(),
                phone_code,
                recaptcha: "tok".to_string(),
            },
            IP,
        )
        .await
        .unwrap();

    let claims = tokens.verify(&resp.token).unwrap();
    assert_eq!(claims.sub, "carol");
    assert_eq!(claims.email, "carol@example.com");
    assert_eq!(claims.phone, "+14155552671");

    service
        .complete_signup("carol@example.com", "+14155552671")
        .await
        .unwrap();
}

#[tokio::test]
async fn immediate_resend_is_rejected() {
    let delivery = Arc::new(CapturingDelivery::default());
    let (service, _) = gateway(delivery);

    let req = || RequestEmailCodeRequest {
        email: "dave@example.com".to_string(),
        locale: None,
    };
    service.request_email_code(req(), IP).await.unwrap();

    let err = service.request_email_code(req(), IP).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::WaitOneMinute));
}
