use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::auth_request::{
    RequestCodeInput, RequestCodeUseCase, ResendCodeUseCase, VerifyCodeInput, VerifyCodeUseCase,
};

/// Malformed ids and unknown ids are deliberately indistinguishable.
fn parse_request_id(raw: &str) -> Result<Uuid, AuthServiceError> {
    Uuid::parse_str(raw).map_err(|_| AuthServiceError::RequestNotFound)
}

fn required(value: Option<String>, blank: AuthServiceError) -> Result<String, AuthServiceError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_owned()),
        _ => Err(blank),
    }
}

// ── POST /auth/mobile ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RequestCodeRequest {
    pub mobile: Option<String>,
}

#[derive(Serialize)]
pub struct RequestCodeResponse {
    pub id: Uuid,
    pub user_is_registered: bool,
}

pub async fn request_code(
    State(state): State<AppState>,
    Json(body): Json<RequestCodeRequest>,
) -> Result<Json<RequestCodeResponse>, AuthServiceError> {
    let usecase = RequestCodeUseCase {
        identities: state.identity_repo(),
        auth_requests: state.auth_request_repo(),
        sms: state.sms_gateway(),
        permissive_delivery: state.sms_permissive,
    };
    let out = usecase
        .execute(RequestCodeInput {
            mobile: body.mobile.unwrap_or_default(),
        })
        .await?;
    Ok(Json(RequestCodeResponse {
        id: out.request_id,
        user_is_registered: out.user_is_registered,
    }))
}

// ── POST /auth/{id}/code ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyCodeRequest {
    pub otp_code: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub national_code: Option<String>,
}

#[derive(Serialize)]
pub struct VerifyCodeResponse {
    pub id: Uuid,
    pub refresh_token: String,
    pub access_token: String,
    pub expires_at: u64,
    pub user_is_registered: bool,
}

pub async fn verify_code(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<VerifyCodeRequest>,
) -> Result<Json<VerifyCodeResponse>, AuthServiceError> {
    let request_id = parse_request_id(&id)?;
    let otp_code = required(body.otp_code, AuthServiceError::BlankOtpCode)?;

    let usecase = VerifyCodeUseCase {
        identities: state.identity_repo(),
        auth_requests: state.auth_request_repo(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let out = usecase
        .execute(
            request_id,
            VerifyCodeInput {
                otp_code,
                first_name: body.first_name,
                last_name: body.last_name,
                national_code: body.national_code,
            },
        )
        .await?;

    Ok(Json(VerifyCodeResponse {
        id: out.request_id,
        refresh_token: out.tokens.refresh_token,
        access_token: out.tokens.access_token,
        expires_at: out.tokens.expires_at,
        user_is_registered: out.user_is_registered,
    }))
}

// ── POST /auth/{id}/resend-code ──────────────────────────────────────────────

pub async fn resend_code(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AuthServiceError> {
    let request_id = parse_request_id(&id)?;
    let usecase = ResendCodeUseCase {
        auth_requests: state.auth_request_repo(),
        sms: state.sms_gateway(),
        permissive_delivery: state.sms_permissive,
    };
    usecase.execute(request_id).await?;
    Ok(Json(serde_json::json!({})))
}
