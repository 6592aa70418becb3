use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::token::RefreshTokenUseCase;

// ── POST /auth/refresh-token ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: Option<String>,
}

#[derive(Serialize)]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub expires_at: u64,
}

pub async fn refresh_token(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenRequest>,
) -> Result<Json<RefreshTokenResponse>, AuthServiceError> {
    let refresh = match body.refresh_token.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => value.to_owned(),
        _ => return Err(AuthServiceError::BlankRefreshToken),
    };

    let usecase = RefreshTokenUseCase {
        identities: state.identity_repo(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let out = usecase.execute(&refresh).await?;

    Ok(Json(RefreshTokenResponse {
        access_token: out.access_token,
        expires_at: out.expires_at,
    }))
}
