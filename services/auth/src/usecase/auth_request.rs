use chrono::{Duration, Utc};
use rand::RngExt;
use uuid::Uuid;

use crate::domain::repository::{AuthRequestRepository, IdentityRepository, SmsGateway};
use crate::domain::types::{
    AuthRequest, Identity, OTP_CODE_LEN, OTP_TTL_SECS, validate_mobile, validate_national_code,
};
use crate::error::{AuthServiceError, ProfileField};
use crate::usecase::token::{SessionTokens, issue_session};

const DIGITS: &[u8] = b"0123456789";

/// Draw a code uniformly over the whole five-digit space; leading zeros are
/// legal. Collisions with earlier codes for the same mobile are acceptable.
fn generate_otp_code() -> String {
    let mut rng = rand::rng();
    (0..OTP_CODE_LEN)
        .map(|_| DIGITS[rng.random_range(0..DIGITS.len())] as char)
        .collect()
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Generate a fresh code, persist it with a renewed expiry window, and hand
/// it to the SMS gateway. With `permissive_delivery` a gateway failure is
/// logged instead of failing the request, so setups without SMS credentials
/// keep working.
async fn issue_code<A, S>(
    auth_requests: &A,
    sms: &S,
    request: &AuthRequest,
    permissive_delivery: bool,
) -> Result<(), AuthServiceError>
where
    A: AuthRequestRepository,
    S: SmsGateway,
{
    let code = generate_otp_code();
    let expires_at = Utc::now() + Duration::seconds(OTP_TTL_SECS);
    auth_requests.store_code(request.id, &code, expires_at).await?;

    match sms.send_otp_code(&request.mobile, &code).await {
        Ok(()) => Ok(()),
        Err(AuthServiceError::Delivery(e)) if permissive_delivery => {
            tracing::warn!(error = %e, mobile = %request.mobile, "sms delivery failed, permissive mode");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

// ── RequestCode ──────────────────────────────────────────────────────────────

pub struct RequestCodeInput {
    pub mobile: String,
}

#[derive(Debug)]
pub struct RequestCodeOutput {
    pub request_id: Uuid,
    pub user_is_registered: bool,
}

pub struct RequestCodeUseCase<I, A, S>
where
    I: IdentityRepository,
    A: AuthRequestRepository,
    S: SmsGateway,
{
    pub identities: I,
    pub auth_requests: A,
    pub sms: S,
    pub permissive_delivery: bool,
}

impl<I, A, S> RequestCodeUseCase<I, A, S>
where
    I: IdentityRepository,
    A: AuthRequestRepository,
    S: SmsGateway,
{
    pub async fn execute(
        &self,
        input: RequestCodeInput,
    ) -> Result<RequestCodeOutput, AuthServiceError> {
        let mobile = input.mobile.trim();
        if mobile.is_empty() {
            return Err(AuthServiceError::BlankMobile);
        }
        if !validate_mobile(mobile) {
            return Err(AuthServiceError::InvalidMobile);
        }

        // Registration is snapshotted once and never recomputed for this request.
        let user_is_registered = self.identities.find_by_mobile(mobile).await?.is_some();

        let request = AuthRequest::new(mobile.to_owned(), user_is_registered);
        self.auth_requests.create(&request).await?;

        issue_code(
            &self.auth_requests,
            &self.sms,
            &request,
            self.permissive_delivery,
        )
        .await?;

        Ok(RequestCodeOutput {
            request_id: request.id,
            user_is_registered,
        })
    }
}

// ── VerifyCode ───────────────────────────────────────────────────────────────

pub struct VerifyCodeInput {
    pub otp_code: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub national_code: Option<String>,
}

#[derive(Debug)]
pub struct VerifyCodeOutput {
    pub request_id: Uuid,
    pub user_is_registered: bool,
    pub tokens: SessionTokens,
}

pub struct VerifyCodeUseCase<I, A>
where
    I: IdentityRepository,
    A: AuthRequestRepository,
{
    pub identities: I,
    pub auth_requests: A,
    pub jwt_secret: String,
}

impl<I, A> VerifyCodeUseCase<I, A>
where
    I: IdentityRepository,
    A: AuthRequestRepository,
{
    pub async fn execute(
        &self,
        request_id: Uuid,
        input: VerifyCodeInput,
    ) -> Result<VerifyCodeOutput, AuthServiceError> {
        let request = self
            .auth_requests
            .find_by_id(request_id)
            .await?
            .ok_or(AuthServiceError::RequestNotFound)?;

        let first_name = trimmed(&input.first_name);
        let last_name = trimmed(&input.last_name);
        let national_code = trimmed(&input.national_code);

        // A brand-new user must supply the full profile before any code is
        // even compared. First missing field wins.
        if !request.user_is_registered {
            if first_name.is_none() {
                return Err(AuthServiceError::MissingProfileField(ProfileField::FirstName));
            }
            if last_name.is_none() {
                return Err(AuthServiceError::MissingProfileField(ProfileField::LastName));
            }
            if national_code.is_none() {
                return Err(AuthServiceError::MissingProfileField(
                    ProfileField::NationalCode,
                ));
            }
        }
        if let Some(code) = national_code {
            if !validate_national_code(code) {
                return Err(AuthServiceError::InvalidNationalCode);
            }
        }

        if request.is_closed() {
            return Err(AuthServiceError::RequestClosed);
        }

        if request.is_expired() {
            // An expired request is finished for good; later attempts see "closed".
            self.auth_requests.close_if_pending(request.id).await?;
            return Err(AuthServiceError::CodeExpired);
        }

        if request.otp_code.as_deref() != Some(input.otp_code.as_str()) {
            return Err(AuthServiceError::CodeMismatch);
        }

        // Exactly one concurrent verification may flip the request out of
        // PENDING; the losers see the same failure a late retry would.
        if !self.auth_requests.close_if_pending(request.id).await? {
            return Err(AuthServiceError::RequestClosed);
        }

        // Sibling codes still pending for this mobile are dead from here on.
        self.auth_requests.close_all_pending(&request.mobile).await?;

        // A new user's request keeps the profile it was verified with.
        if !request.user_is_registered {
            if let (Some(first_name), Some(last_name), Some(national_code)) =
                (first_name, last_name, national_code)
            {
                self.auth_requests
                    .store_profile(request.id, first_name, last_name, national_code)
                    .await?;
            }
        }

        let identity = match self.identities.find_by_mobile(&request.mobile).await? {
            Some(identity) => identity,
            None => {
                let (Some(first_name), Some(last_name)) = (first_name, last_name) else {
                    return Err(AuthServiceError::IdentityNotFound);
                };
                let now = Utc::now();
                let identity = Identity {
                    id: Uuid::now_v7(),
                    mobile: request.mobile.clone(),
                    first_name: first_name.to_owned(),
                    last_name: last_name.to_owned(),
                    national_code: national_code.map(str::to_owned),
                    created_at: now,
                    updated_at: now,
                };
                self.identities.create(&identity).await?;
                identity
            }
        };

        let tokens = issue_session(&identity, &self.jwt_secret)?;

        Ok(VerifyCodeOutput {
            request_id: request.id,
            user_is_registered: request.user_is_registered,
            tokens,
        })
    }
}

// ── ResendCode ───────────────────────────────────────────────────────────────

pub struct ResendCodeUseCase<A, S>
where
    A: AuthRequestRepository,
    S: SmsGateway,
{
    pub auth_requests: A,
    pub sms: S,
    pub permissive_delivery: bool,
}

impl<A, S> ResendCodeUseCase<A, S>
where
    A: AuthRequestRepository,
    S: SmsGateway,
{
    pub async fn execute(&self, request_id: Uuid) -> Result<(), AuthServiceError> {
        let request = self
            .auth_requests
            .find_by_id(request_id)
            .await?
            .ok_or(AuthServiceError::RequestNotFound)?;

        if request.is_closed() {
            return Err(AuthServiceError::RequestClosed);
        }
        if !request.is_expired() {
            return Err(AuthServiceError::NotYetExpired);
        }

        issue_code(
            &self.auth_requests,
            &self.sms,
            &request,
            self.permissive_delivery,
        )
        .await
    }
}
