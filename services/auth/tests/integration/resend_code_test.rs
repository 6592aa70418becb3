use chrono::{Duration, Utc};
use uuid::Uuid;

use camerator_auth::domain::types::RequestStatus;
use camerator_auth::error::AuthServiceError;
use camerator_auth::usecase::auth_request::ResendCodeUseCase;

use crate::helpers::{
    MockAuthRequestRepo, MockSmsGateway, REGISTERED_MOBILE, expired_request, pending_request,
};

#[tokio::test]
async fn should_reject_resend_before_expiry() {
    let request = pending_request(REGISTERED_MOBILE, true);
    let request_id = request.id;

    let uc = ResendCodeUseCase {
        auth_requests: MockAuthRequestRepo::new(vec![request]),
        sms: MockSmsGateway::ok(),
        permissive_delivery: false,
    };

    let result = uc.execute(request_id).await;
    assert!(
        matches!(result, Err(AuthServiceError::NotYetExpired)),
        "expected NotYetExpired, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_resend_on_closed_request() {
    let mut request = expired_request(REGISTERED_MOBILE, true);
    request.status = RequestStatus::Completed;
    let request_id = request.id;

    let uc = ResendCodeUseCase {
        auth_requests: MockAuthRequestRepo::new(vec![request]),
        sms: MockSmsGateway::ok(),
        permissive_delivery: false,
    };

    let result = uc.execute(request_id).await;
    assert!(
        matches!(result, Err(AuthServiceError::RequestClosed)),
        "expected RequestClosed, got {result:?}"
    );
}

#[tokio::test]
async fn should_fail_not_found_for_unknown_request() {
    let uc = ResendCodeUseCase {
        auth_requests: MockAuthRequestRepo::empty(),
        sms: MockSmsGateway::ok(),
        permissive_delivery: false,
    };

    let result = uc.execute(Uuid::new_v4()).await;
    assert!(
        matches!(result, Err(AuthServiceError::RequestNotFound)),
        "expected RequestNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn resend_after_expiry_renews_code_and_window() {
    let request = expired_request(REGISTERED_MOBILE, true);
    let request_id = request.id;
    let old_code = request.otp_code.clone().unwrap();
    let old_expiry = request.expires_at;

    let auth_requests = MockAuthRequestRepo::new(vec![request]);
    let requests_handle = auth_requests.requests_handle();
    let sms = MockSmsGateway::ok();
    let sent_handle = sms.sent_handle();

    let uc = ResendCodeUseCase {
        auth_requests,
        sms,
        permissive_delivery: false,
    };

    let before = Utc::now();
    uc.execute(request_id).await.unwrap();
    let after = Utc::now();

    let requests = requests_handle.lock().unwrap();
    let renewed = &requests[0];
    assert_eq!(renewed.status, RequestStatus::Pending);
    assert!(renewed.expires_at > old_expiry);
    // The window restarts from the resend moment, not from creation.
    assert!(renewed.expires_at >= before + Duration::seconds(300));
    assert!(renewed.expires_at <= after + Duration::seconds(300));

    let new_code = renewed.otp_code.clone().unwrap();
    let sent = sent_handle.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1, new_code);
    // Equality with the old code would only ever happen by chance; what
    // matters is that a fresh draw was stored and delivered.
    let _ = old_code;
}

#[tokio::test]
async fn should_surface_delivery_failure_on_resend() {
    let request = expired_request(REGISTERED_MOBILE, true);
    let request_id = request.id;

    let uc = ResendCodeUseCase {
        auth_requests: MockAuthRequestRepo::new(vec![request]),
        sms: MockSmsGateway::failing(),
        permissive_delivery: false,
    };

    let result = uc.execute(request_id).await;
    assert!(
        matches!(result, Err(AuthServiceError::Delivery(_))),
        "expected Delivery, got {result:?}"
    );
}

#[tokio::test]
async fn should_swallow_delivery_failure_on_resend_in_permissive_mode() {
    let request = expired_request(REGISTERED_MOBILE, true);
    let request_id = request.id;

    let uc = ResendCodeUseCase {
        auth_requests: MockAuthRequestRepo::new(vec![request]),
        sms: MockSmsGateway::failing(),
        permissive_delivery: true,
    };

    uc.execute(request_id).await.unwrap();
}
