//! Orchestrator tests covering the wire-facing operations end to end.

use std::sync::Arc;

use chrono::{Duration, Utc};

use sg_shared::config::{ThrottleConfig, TokenConfig, VerificationConfig};

use crate::domain::clock::{Clock, ManualClock};
use crate::domain::entities::abuse_log::AbuseAction;
use crate::domain::entities::verification_record::Channel;
use crate::errors::{CoreError, ErrorKind};
use crate::repositories::{MockAbuseLogRepository, MockVerificationStore, VerificationStore};
use crate::services::signup::types::{
    CheckEmailCodeRequest, CheckPhoneCodeRequest, CheckUsernameRequest, CreateUserRequest,
    RequestEmailCodeRequest, RequestEmailCodeResponse, RequestSmsRequest, RequestSmsResponse,
};
use crate::services::signup::SignupService;
use crate::services::throttle::ThrottlePolicy;
use crate::services::token::SignupTokenService;
use crate::services::verification::tests::mocks::{MockEmailDelivery, MockSmsDelivery};
use crate::services::verification::VerificationService;

use super::mocks::{MockCaptcha, MockChainDirectory, MockUserDirectory};

const IP: &str = "198.51.100.7";

type TestSignupService = SignupService<
    MockVerificationStore,
    MockAbuseLogRepository,
    MockEmailDelivery,
    MockSmsDelivery,
    MockChainDirectory,
    MockUserDirectory,
    MockCaptcha,
>;

struct Fixture {
    store: Arc<MockVerificationStore>,
    log: Arc<MockAbuseLogRepository>,
    email: Arc<MockEmailDelivery>,
    sms: Arc<MockSmsDelivery>,
    chain: Arc<MockChainDirectory>,
    users: Arc<MockUserDirectory>,
    tokens: Arc<SignupTokenService>,
    clock: Arc<ManualClock>,
    service: TestSignupService,
}

fn build(captcha: MockCaptcha) -> Fixture {
    let store = Arc::new(MockVerificationStore::new());
    let log = Arc::new(MockAbuseLogRepository::new());
    let email = Arc::new(MockEmailDelivery::new());
    let sms = Arc::new(MockSmsDelivery::new());
    let chain = Arc::new(MockChainDirectory::new());
    let users = Arc::new(MockUserDirectory::new());
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let dyn_clock = clock.clone() as Arc<dyn Clock>;

    let policy = Arc::new(ThrottlePolicy::new(
        store.clone(),
        log.clone(),
        ThrottleConfig::default(),
        dyn_clock.clone(),
    ));
    let verification = Arc::new(VerificationService::new(
        store.clone(),
        log.clone(),
        policy,
        email.clone(),
        sms.clone(),
        VerificationConfig::default(),
        dyn_clock.clone(),
    ));
    let tokens = Arc::new(SignupTokenService::new(
        TokenConfig::default(),
        dyn_clock.clone(),
    ));
    let service = SignupService::new(
        log.clone(),
        verification,
        chain.clone(),
        users.clone(),
        Arc::new(captcha),
        tokens.clone(),
        dyn_clock,
    );

    Fixture {
        store,
        log,
        email,
        sms,
        chain,
        users,
        tokens,
        clock,
        service,
    }
}

fn fixture() -> Fixture {
    build(MockCaptcha::accepting())
}

fn kind_of(err: CoreError) -> ErrorKind {
    err.kind().unwrap()
}

/// Drive both channels through issue and check, returning the two codes
async fn verify_both_channels(f: &Fixture) -> (String, String) {
    let resp = f
        .service
        .request_email_code(
            RequestEmailCodeRequest {
                email: "Alice@Example.com".to_string(),
                locale: None,
            },
            IP,
        )
        .await
        .unwrap();
    // Input is normalized before anything touches the store
    assert!(matches!(
        &resp,
        RequestEmailCodeResponse::Issued { email, .. } if email == "alice@example.com"
    ));
    let email_code = f.email.last_code().unwrap();
    f.clock.advance(Duration::seconds(5));

    f.service
        .check_email_code(
            CheckEmailCodeRequest {
                email: "alice@example.com".to_string(),
                email_code: email_code.clone(),
            },
            IP,
        )
        .await
        .unwrap();
    f.clock.advance(Duration::seconds(5));

    let resp = f
        .service
        .request_sms(
            RequestSmsRequest {
                phone_number: "917 123 4567".to_string(),
                prefix: "63".to_string(),
                phone_recaptcha: "captcha-tok".to_string(),
            },
            IP,
        )
        .await
        .unwrap();
    assert!(matches!(
        &resp,
        RequestSmsResponse::Issued { phone_number, .. } if phone_number == "+639171234567"
    ));
    let phone_code = f.sms.last_code().unwrap();
    f.clock.advance(Duration::seconds(5));

    f.service
        .check_phone_code(
            CheckPhoneCodeRequest {
                phone_number: "+639171234567".to_string(),
                phone_code: phone_code.clone(),
            },
            IP,
        )
        .await
        .unwrap();

    (email_code, phone_code)
}

fn create_request(email_code: &str, phone_code: &str) -> CreateUserRequest {
    CreateUserRequest {
        username: "alice".to_string(),
        email: "alice@example.com".to_string(),
        email_code: email_code.to_string(),
        phone_number: "+639171234567".to_string(),
        phone_code: phone_code.to_string(),
        recaptcha: "captcha-tok".to_string(),
    }
}

#[tokio::test]
async fn test_full_flow_mints_verifiable_token() {
    let f = fixture();
    let (email_code, phone_code) = verify_both_channels(&f).await;

    let resp = f
        .service
        .create_user(create_request(&email_code, &phone_code), IP)
        .await
        .unwrap();
    assert!(resp.success);

    let claims = f.tokens.verify(&resp.token).unwrap();
    assert_eq!(claims.sub, "alice");
    assert_eq!(claims.email, "alice@example.com");
    assert_eq!(claims.phone, "+639171234567");

    let actions: Vec<AbuseAction> = f.log.entries().await.iter().map(|e| e.action).collect();
    assert!(actions.contains(&AbuseAction::CreateUser));
}

#[tokio::test]
async fn test_finalize_recheck_counts_no_attempt() {
    let f = fixture();
    let (email_code, _) = verify_both_channels(&f).await;

    let before = f
        .store
        .find(Channel::Phone, "+639171234567")
        .await
        .unwrap()
        .unwrap()
        .attempts;

    let err = f
        .service
        .create_user(create_request(&email_code, "000000"), IP)
        .await
        .unwrap_err();
    assert_eq!(kind_of(err), ErrorKind::PhoneCodeInvalid);

    // Pure equality re-check; the attempt counter never moves
    let after = f
        .store
        .find(Channel::Phone, "+639171234567")
        .await
        .unwrap()
        .unwrap()
        .attempts;
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_finalize_works_without_prior_checks() {
    // Codes were issued but never submitted through the check operations;
    // finalize relies on raw equality, not on the verified flag
    let f = fixture();

    f.service
        .request_email_code(
            RequestEmailCodeRequest {
                email: "alice@example.com".to_string(),
                locale: None,
            },
            IP,
        )
        .await
        .unwrap();
    let email_code = f.email.last_code().unwrap();

    f.service
        .request_sms(
            RequestSmsRequest {
                phone_number: "917 123 4567".to_string(),
                prefix: "63".to_string(),
                phone_recaptcha: "captcha-tok".to_string(),
            },
            IP,
        )
        .await
        .unwrap();
    let phone_code = f.sms.last_code().unwrap();

    let resp = f
        .service
        .create_user(create_request(&email_code, &phone_code), IP)
        .await
        .unwrap();
    assert!(resp.success);
}

#[tokio::test]
async fn test_missing_fields_rejected_with_field_name() {
    let f = fixture();

    let mut req = create_request("123456", "654321");
    req.email_code = "  ".to_string();

    match f.service.create_user(req, IP).await.unwrap_err() {
        CoreError::Api(api) => {
            assert_eq!(api.kind, ErrorKind::FieldRequired);
            assert_eq!(api.field, "emailCode");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_captcha_rejection() {
    let f = build(MockCaptcha::rejecting());

    let err = f
        .service
        .create_user(create_request("123456", "654321"), IP)
        .await
        .unwrap_err();
    assert_eq!(kind_of(err), ErrorKind::RecaptchaInvalid);

    let err = f
        .service
        .request_sms(
            RequestSmsRequest {
                phone_number: "917 123 4567".to_string(),
                prefix: "63".to_string(),
                phone_recaptcha: "captcha-tok".to_string(),
            },
            IP,
        )
        .await
        .unwrap_err();
    assert_eq!(kind_of(err), ErrorKind::RecaptchaInvalid);
}

#[tokio::test]
async fn test_addresses_already_bound_to_accounts() {
    let f = fixture();
    let (email_code, phone_code) = verify_both_channels(&f).await;

    f.users.register_email("alice@example.com");
    let err = f
        .service
        .create_user(create_request(&email_code, &phone_code), IP)
        .await
        .unwrap_err();
    assert_eq!(kind_of(err), ErrorKind::EmailUsed);

    let f = fixture();
    let (email_code, phone_code) = verify_both_channels(&f).await;

    f.chain.register_phone("+639171234567");
    let err = f
        .service
        .create_user(create_request(&email_code, &phone_code), IP)
        .await
        .unwrap_err();
    assert_eq!(kind_of(err), ErrorKind::PhoneUsed);
}

#[tokio::test]
async fn test_username_collision_after_code_checks() {
    let f = fixture();
    let (email_code, phone_code) = verify_both_channels(&f).await;

    f.chain.register_username("alice");
    let err = f
        .service
        .create_user(create_request(&email_code, &phone_code), IP)
        .await
        .unwrap_err();
    assert_eq!(kind_of(err), ErrorKind::UserExist);
}

#[tokio::test]
async fn test_finalize_without_records() {
    let f = fixture();

    let err = f
        .service
        .create_user(create_request("123456", "654321"), IP)
        .await
        .unwrap_err();
    assert_eq!(kind_of(err), ErrorKind::UnknownEmail);
}

#[tokio::test]
async fn test_invalid_inputs() {
    let f = fixture();

    let err = f
        .service
        .request_email_code(
            RequestEmailCodeRequest {
                email: "not-an-email".to_string(),
                locale: None,
            },
            IP,
        )
        .await
        .unwrap_err();
    assert_eq!(kind_of(err), ErrorKind::EmailInvalid);

    let err = f
        .service
        .request_sms(
            RequestSmsRequest {
                phone_number: "abc".to_string(),
                prefix: "63".to_string(),
                phone_recaptcha: "captcha-tok".to_string(),
            },
            IP,
        )
        .await
        .unwrap_err();
    assert_eq!(kind_of(err), ErrorKind::PhoneInvalid);
}

#[tokio::test]
async fn test_blocklisted_email_gets_success_shaped_response() {
    let store = Arc::new(MockVerificationStore::new());
    let log = Arc::new(MockAbuseLogRepository::new());
    let email = Arc::new(MockEmailDelivery::new());
    let sms = Arc::new(MockSmsDelivery::new());
    let clock = Arc::new(ManualClock::new(Utc::now())) as Arc<dyn Clock>;

    let mut throttle = ThrottleConfig::default();
    throttle.email_domain_blocklist = vec!["spam.example".to_string()];
    let policy = Arc::new(ThrottlePolicy::new(
        store.clone(),
        log.clone(),
        throttle,
        clock.clone(),
    ));
    let verification = Arc::new(VerificationService::new(
        store,
        log.clone(),
        policy,
        email.clone(),
        sms,
        VerificationConfig::default(),
        clock.clone(),
    ));
    let service: TestSignupService = SignupService::new(
        log,
        verification,
        Arc::new(MockChainDirectory::new()),
        Arc::new(MockUserDirectory::new()),
        Arc::new(MockCaptcha::accepting()),
        Arc::new(SignupTokenService::new(TokenConfig::default(), clock.clone())),
        clock,
    );

    let resp = service
        .request_email_code(
            RequestEmailCodeRequest {
                email: "bot@spam.example".to_string(),
                locale: None,
            },
            IP,
        )
        .await
        .unwrap();

    assert_eq!(resp, RequestEmailCodeResponse::dropped());
    assert_eq!(
        serde_json::to_string(&resp).unwrap(),
        r#"{"success":true,"token":null}"#
    );
    assert_eq!(email.sent_count(), 0);
}

#[tokio::test]
async fn test_check_username_probe() {
    let f = fixture();

    let resp = f
        .service
        .check_username(
            CheckUsernameRequest {
                username: "alice".to_string(),
            },
            IP,
        )
        .await
        .unwrap();
    assert!(resp.available);

    f.users.register_username("alice");
    let resp = f
        .service
        .check_username(
            CheckUsernameRequest {
                username: "alice".to_string(),
            },
            IP,
        )
        .await
        .unwrap();
    assert!(!resp.available);

    // Probes are logged but carry the excluded action
    let entries = f.log.entries().await;
    assert!(entries
        .iter()
        .all(|e| e.action == AbuseAction::CheckUsername));
}

#[tokio::test]
async fn test_complete_signup_clears_records() {
    let f = fixture();
    let (email_code, phone_code) = verify_both_channels(&f).await;

    f.service
        .create_user(create_request(&email_code, &phone_code), IP)
        .await
        .unwrap();

    f.service
        .complete_signup("alice@example.com", "+639171234567")
        .await
        .unwrap();
    assert_eq!(f.store.len().await, 0);
}

#[tokio::test]
async fn test_expired_codes_block_finalize() {
    let f = fixture();
    let (email_code, phone_code) = verify_both_channels(&f).await;

    // Kill the email cycle the way expiry does
    let mut record = f
        .store
        .find(Channel::Email, "alice@example.com")
        .await
        .unwrap()
        .unwrap();
    record.expire_cycle();
    f.store.save(&record).await.unwrap();

    let err = f
        .service
        .create_user(create_request(&email_code, &phone_code), IP)
        .await
        .unwrap_err();
    assert_eq!(kind_of(err), ErrorKind::EmailCodeInvalid);
}
