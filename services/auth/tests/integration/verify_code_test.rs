use camerator_auth::domain::types::RequestStatus;
use camerator_auth::error::{AuthServiceError, ProfileField};
use camerator_auth::usecase::auth_request::{VerifyCodeInput, VerifyCodeUseCase};
use camerator_auth::usecase::token::{TOKEN_TYP_ACCESS, TOKEN_TYP_REFRESH, token_identity};

use crate::helpers::{
    MockAuthRequestRepo, MockIdentityRepo, NEW_MOBILE, REGISTERED_MOBILE, TEST_JWT_SECRET,
    expired_request, pending_request, test_identity,
};

fn code_only(code: &str) -> VerifyCodeInput {
    VerifyCodeInput {
        otp_code: code.to_owned(),
        first_name: None,
        last_name: None,
        national_code: None,
    }
}

fn full_profile(code: &str) -> VerifyCodeInput {
    VerifyCodeInput {
        otp_code: code.to_owned(),
        first_name: Some("Sara".to_owned()),
        last_name: Some("Moradi".to_owned()),
        national_code: Some("0012345678".to_owned()),
    }
}

#[tokio::test]
async fn should_verify_registered_user_and_issue_session() {
    let identity = test_identity();
    let request = pending_request(REGISTERED_MOBILE, true);
    let request_id = request.id;

    let auth_requests = MockAuthRequestRepo::new(vec![request]);
    let requests_handle = auth_requests.requests_handle();

    let uc = VerifyCodeUseCase {
        identities: MockIdentityRepo::new(vec![identity.clone()]),
        auth_requests,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    let out = uc.execute(request_id, code_only("12345")).await.unwrap();

    assert_eq!(out.request_id, request_id);
    assert!(out.user_is_registered);
    assert!(!out.tokens.access_token.is_empty());
    assert!(!out.tokens.refresh_token.is_empty());
    assert!(out.tokens.expires_at > 0);

    // Both tokens name the resolved identity.
    let access_id =
        token_identity(&out.tokens.access_token, TOKEN_TYP_ACCESS, TEST_JWT_SECRET).unwrap();
    assert_eq!(access_id, identity.id);
    let refresh_id = token_identity(
        &out.tokens.refresh_token,
        TOKEN_TYP_REFRESH,
        TEST_JWT_SECRET,
    )
    .unwrap();
    assert_eq!(refresh_id, identity.id);

    let requests = requests_handle.lock().unwrap();
    assert_eq!(requests[0].status, RequestStatus::Completed);
}

#[tokio::test]
async fn should_create_identity_for_new_mobile_exactly_once() {
    let request = pending_request(NEW_MOBILE, false);
    let request_id = request.id;

    let identities = MockIdentityRepo::empty();
    let identities_handle = identities.identities_handle();
    let auth_requests = MockAuthRequestRepo::new(vec![request]);
    let requests_handle = auth_requests.requests_handle();

    let uc = VerifyCodeUseCase {
        identities,
        auth_requests,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    let out = uc.execute(request_id, full_profile("12345")).await.unwrap();
    assert!(!out.user_is_registered);

    {
        let identities = identities_handle.lock().unwrap();
        assert_eq!(identities.len(), 1);
        assert_eq!(identities[0].mobile, NEW_MOBILE);
        assert_eq!(identities[0].first_name, "Sara");
        assert_eq!(identities[0].last_name, "Moradi");
        assert_eq!(identities[0].national_code.as_deref(), Some("0012345678"));
    }

    // The request row keeps the profile it was verified with.
    {
        let requests = requests_handle.lock().unwrap();
        assert_eq!(requests[0].first_name.as_deref(), Some("Sara"));
        assert_eq!(requests[0].last_name.as_deref(), Some("Moradi"));
        assert_eq!(requests[0].national_code.as_deref(), Some("0012345678"));
    }

    // A second attempt with any code hits the closed request.
    let result = uc.execute(request_id, full_profile("12345")).await;
    assert!(
        matches!(result, Err(AuthServiceError::RequestClosed)),
        "expected RequestClosed, got {result:?}"
    );
}

#[tokio::test]
async fn should_fail_not_found_for_unknown_request() {
    let uc = VerifyCodeUseCase {
        identities: MockIdentityRepo::empty(),
        auth_requests: MockAuthRequestRepo::empty(),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    let result = uc.execute(uuid::Uuid::new_v4(), code_only("12345")).await;
    assert!(
        matches!(result, Err(AuthServiceError::RequestNotFound)),
        "expected RequestNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn should_require_profile_fields_in_order_for_new_users() {
    let request = pending_request(NEW_MOBILE, false);
    let request_id = request.id;
    let auth_requests = MockAuthRequestRepo::new(vec![request]);

    let uc = VerifyCodeUseCase {
        identities: MockIdentityRepo::empty(),
        auth_requests,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    let result = uc.execute(request_id, code_only("12345")).await;
    assert!(matches!(
        result,
        Err(AuthServiceError::MissingProfileField(ProfileField::FirstName))
    ));

    let result = uc
        .execute(
            request_id,
            VerifyCodeInput {
                otp_code: "12345".to_owned(),
                first_name: Some("Sara".to_owned()),
                last_name: None,
                national_code: Some("0012345678".to_owned()),
            },
        )
        .await;
    assert!(matches!(
        result,
        Err(AuthServiceError::MissingProfileField(ProfileField::LastName))
    ));

    let result = uc
        .execute(
            request_id,
            VerifyCodeInput {
                otp_code: "12345".to_owned(),
                first_name: Some("Sara".to_owned()),
                last_name: Some("Moradi".to_owned()),
                national_code: None,
            },
        )
        .await;
    assert!(matches!(
        result,
        Err(AuthServiceError::MissingProfileField(
            ProfileField::NationalCode
        ))
    ));
}

#[tokio::test]
async fn should_reject_malformed_national_code() {
    for national_code in ["CHAR", "123", "12345678901", "123456789x"] {
        let request = pending_request(NEW_MOBILE, false);
        let request_id = request.id;
        let uc = VerifyCodeUseCase {
            identities: MockIdentityRepo::empty(),
            auth_requests: MockAuthRequestRepo::new(vec![request]),
            jwt_secret: TEST_JWT_SECRET.to_owned(),
        };

        let result = uc
            .execute(
                request_id,
                VerifyCodeInput {
                    otp_code: "12345".to_owned(),
                    first_name: Some("Sara".to_owned()),
                    last_name: Some("Moradi".to_owned()),
                    national_code: Some(national_code.to_owned()),
                },
            )
            .await;
        assert!(
            matches!(result, Err(AuthServiceError::InvalidNationalCode)),
            "expected InvalidNationalCode for {national_code:?}, got {result:?}"
        );
    }
}

#[tokio::test]
async fn should_reject_closed_request() {
    let mut request = pending_request(REGISTERED_MOBILE, true);
    request.status = RequestStatus::Completed;
    let request_id = request.id;

    let uc = VerifyCodeUseCase {
        identities: MockIdentityRepo::new(vec![test_identity()]),
        auth_requests: MockAuthRequestRepo::new(vec![request]),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    let result = uc.execute(request_id, code_only("12345")).await;
    assert!(
        matches!(result, Err(AuthServiceError::RequestClosed)),
        "expected RequestClosed, got {result:?}"
    );
}

#[tokio::test]
async fn expired_code_closes_the_request_for_good() {
    let request = expired_request(REGISTERED_MOBILE, true);
    let request_id = request.id;
    let auth_requests = MockAuthRequestRepo::new(vec![request]);
    let requests_handle = auth_requests.requests_handle();

    let uc = VerifyCodeUseCase {
        identities: MockIdentityRepo::new(vec![test_identity()]),
        auth_requests,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    let result = uc.execute(request_id, code_only("12345")).await;
    assert!(
        matches!(result, Err(AuthServiceError::CodeExpired)),
        "expected CodeExpired, got {result:?}"
    );
    assert_eq!(
        requests_handle.lock().unwrap()[0].status,
        RequestStatus::Completed
    );

    // The retry sees "closed", not "expired".
    let result = uc.execute(request_id, code_only("12345")).await;
    assert!(
        matches!(result, Err(AuthServiceError::RequestClosed)),
        "expected RequestClosed, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_wrong_code() {
    let request = pending_request(REGISTERED_MOBILE, true);
    let request_id = request.id;

    let uc = VerifyCodeUseCase {
        identities: MockIdentityRepo::new(vec![test_identity()]),
        auth_requests: MockAuthRequestRepo::new(vec![request]),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    let result = uc.execute(request_id, code_only("54321")).await;
    assert!(
        matches!(result, Err(AuthServiceError::CodeMismatch)),
        "expected CodeMismatch, got {result:?}"
    );
}

#[tokio::test]
async fn successful_verification_closes_pending_siblings() {
    let winner = pending_request(REGISTERED_MOBILE, true);
    let winner_id = winner.id;
    let sibling = pending_request(REGISTERED_MOBILE, true);
    let sibling_id = sibling.id;

    let auth_requests = MockAuthRequestRepo::new(vec![winner, sibling]);
    let requests_handle = auth_requests.requests_handle();

    let uc = VerifyCodeUseCase {
        identities: MockIdentityRepo::new(vec![test_identity()]),
        auth_requests,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    uc.execute(winner_id, code_only("12345")).await.unwrap();

    let requests = requests_handle.lock().unwrap();
    let sibling = requests.iter().find(|r| r.id == sibling_id).unwrap();
    assert_eq!(sibling.status, RequestStatus::Completed);
}

#[tokio::test]
async fn failed_verification_leaves_siblings_pending() {
    let request = pending_request(REGISTERED_MOBILE, true);
    let request_id = request.id;
    let sibling = pending_request(REGISTERED_MOBILE, true);
    let sibling_id = sibling.id;

    let auth_requests = MockAuthRequestRepo::new(vec![request, sibling]);
    let requests_handle = auth_requests.requests_handle();

    let uc = VerifyCodeUseCase {
        identities: MockIdentityRepo::new(vec![test_identity()]),
        auth_requests,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    let result = uc.execute(request_id, code_only("54321")).await;
    assert!(matches!(result, Err(AuthServiceError::CodeMismatch)));

    let requests = requests_handle.lock().unwrap();
    let sibling = requests.iter().find(|r| r.id == sibling_id).unwrap();
    assert_eq!(sibling.status, RequestStatus::Pending);
}

#[tokio::test(flavor = "multi_thread")]
async fn racing_verifications_produce_exactly_one_winner() {
    let request = pending_request(NEW_MOBILE, false);
    let request_id = request.id;

    let identities = MockIdentityRepo::empty();
    let identities_handle = identities.identities_handle();
    let auth_requests = MockAuthRequestRepo::new(vec![request]);

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let identities = identities.clone();
        let auth_requests = auth_requests.clone();
        tasks.push(tokio::spawn(async move {
            let uc = VerifyCodeUseCase {
                identities,
                auth_requests,
                jwt_secret: TEST_JWT_SECRET.to_owned(),
            };
            uc.execute(request_id, full_profile("12345")).await
        }));
    }

    let mut winners = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => winners += 1,
            Err(AuthServiceError::RequestClosed | AuthServiceError::CodeMismatch) => {}
            Err(other) => panic!("unexpected loser error: {other:?}"),
        }
    }

    assert_eq!(winners, 1, "exactly one verification may win");
    assert_eq!(
        identities_handle.lock().unwrap().len(),
        1,
        "the mobile must be registered exactly once"
    );
}
