use axum::{
    Json,
    extract::{FromRequestParts, State},
    http::request::Parts,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::Identity;
use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::token::{TOKEN_TYP_ACCESS, token_identity};
use crate::usecase::user::{GetProfileUseCase, UpdateProfileInput, UpdateProfileUseCase};

/// Caller identity taken from a validated `Authorization: Bearer` access token.
#[derive(Debug, Clone)]
pub struct CurrentIdentity {
    pub identity_id: Uuid,
}

impl FromRequestParts<AppState> for CurrentIdentity {
    type Rejection = AuthServiceError;

    // axum-core 0.5 defines this as `fn -> impl Future + Send` (not `async fn`);
    // extract synchronously, return a 'static async block.
    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_owned);
        let secret = state.jwt_secret.clone();

        async move {
            let token = token.ok_or(AuthServiceError::InvalidToken)?;
            let identity_id = token_identity(&token, TOKEN_TYP_ACCESS, &secret)?;
            Ok(Self { identity_id })
        }
    }
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub mobile: String,
    pub first_name: String,
    pub last_name: String,
    pub national_code: Option<String>,
}

impl From<Identity> for ProfileResponse {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            mobile: identity.mobile,
            first_name: identity.first_name,
            last_name: identity.last_name,
            national_code: identity.national_code,
        }
    }
}

// ── GET /users/me ────────────────────────────────────────────────────────────

pub async fn get_me(
    identity: CurrentIdentity,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, AuthServiceError> {
    let usecase = GetProfileUseCase {
        identities: state.identity_repo(),
    };
    let profile = usecase.execute(identity.identity_id).await?;
    Ok(Json(profile.into()))
}

// ── PATCH /users/me ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateMeRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub national_code: Option<String>,
}

pub async fn update_me(
    identity: CurrentIdentity,
    State(state): State<AppState>,
    Json(body): Json<UpdateMeRequest>,
) -> Result<Json<ProfileResponse>, AuthServiceError> {
    let usecase = UpdateProfileUseCase {
        identities: state.identity_repo(),
    };
    let profile = usecase
        .execute(
            identity.identity_id,
            UpdateProfileInput {
                first_name: body.first_name,
                last_name: body.last_name,
                national_code: body.national_code,
            },
        )
        .await?;
    Ok(Json(profile.into()))
}
