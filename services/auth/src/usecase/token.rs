use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::domain::repository::IdentityRepository;
use crate::domain::types::{ACCESS_TOKEN_TTL_SECS, Identity, REFRESH_TOKEN_TTL_SECS};
use crate::error::AuthServiceError;

/// `typ` claim value for access tokens.
pub const TOKEN_TYP_ACCESS: &str = "access";

/// `typ` claim value for refresh tokens.
pub const TOKEN_TYP_REFRESH: &str = "refresh";

/// JWT claims for both access and refresh tokens. `typ` keeps a refresh
/// token from passing as an access token and vice versa.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub typ: String,
    pub exp: u64,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_secs()
}

fn issue_token(
    identity: &Identity,
    typ: &str,
    ttl_secs: u64,
    secret: &str,
) -> Result<(String, u64), AuthServiceError> {
    let exp = now_secs() + ttl_secs;
    let claims = TokenClaims {
        sub: identity.id.to_string(),
        typ: typ.to_owned(),
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthServiceError::Internal(e.into()))?;
    Ok((token, exp))
}

pub fn issue_access_token(
    identity: &Identity,
    secret: &str,
) -> Result<(String, u64), AuthServiceError> {
    issue_token(identity, TOKEN_TYP_ACCESS, ACCESS_TOKEN_TTL_SECS, secret)
}

pub fn issue_refresh_token(identity: &Identity, secret: &str) -> Result<String, AuthServiceError> {
    issue_token(identity, TOKEN_TYP_REFRESH, REFRESH_TOKEN_TTL_SECS, secret)
        .map(|(token, _)| token)
}

/// Validate a token's signature and expiry and return its claims.
pub fn validate_token(token: &str, secret: &str) -> Result<TokenClaims, AuthServiceError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AuthServiceError::InvalidToken)?;

    Ok(data.claims)
}

/// Validate a token of the expected kind and return the identity id it names.
pub fn token_identity(
    token: &str,
    expected_typ: &str,
    secret: &str,
) -> Result<Uuid, AuthServiceError> {
    let claims = validate_token(token, secret)?;
    if claims.typ != expected_typ {
        return Err(AuthServiceError::InvalidToken);
    }
    claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| AuthServiceError::InvalidToken)
}

/// Access/refresh pair minted after a successful verification.
#[derive(Debug)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: u64,
}

pub fn issue_session(identity: &Identity, secret: &str) -> Result<SessionTokens, AuthServiceError> {
    let (access_token, expires_at) = issue_access_token(identity, secret)?;
    let refresh_token = issue_refresh_token(identity, secret)?;
    Ok(SessionTokens {
        access_token,
        refresh_token,
        expires_at,
    })
}

// ── RefreshToken ─────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct RefreshTokenOutput {
    pub access_token: String,
    pub expires_at: u64,
}

pub struct RefreshTokenUseCase<I: IdentityRepository> {
    pub identities: I,
    pub jwt_secret: String,
}

impl<I: IdentityRepository> RefreshTokenUseCase<I> {
    pub async fn execute(
        &self,
        refresh_token: &str,
    ) -> Result<RefreshTokenOutput, AuthServiceError> {
        let identity_id = token_identity(refresh_token, TOKEN_TYP_REFRESH, &self.jwt_secret)?;

        // A token naming a since-deleted account counts as revoked.
        let identity = self
            .identities
            .find_by_id(identity_id)
            .await?
            .ok_or(AuthServiceError::InvalidToken)?;

        let (access_token, expires_at) = issue_access_token(&identity, &self.jwt_secret)?;
        Ok(RefreshTokenOutput {
            access_token,
            expires_at,
        })
    }
}
