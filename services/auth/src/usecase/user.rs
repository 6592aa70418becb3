use uuid::Uuid;

use crate::domain::repository::IdentityRepository;
use crate::domain::types::Identity;
use crate::error::AuthServiceError;

// ── GetProfile ───────────────────────────────────────────────────────────────

pub struct GetProfileUseCase<I: IdentityRepository> {
    pub identities: I,
}

impl<I: IdentityRepository> GetProfileUseCase<I> {
    pub async fn execute(&self, identity_id: Uuid) -> Result<Identity, AuthServiceError> {
        self.identities
            .find_by_id(identity_id)
            .await?
            .ok_or(AuthServiceError::IdentityNotFound)
    }
}

// ── UpdateProfile ────────────────────────────────────────────────────────────

pub struct UpdateProfileInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub national_code: Option<String>,
}

pub struct UpdateProfileUseCase<I: IdentityRepository> {
    pub identities: I,
}

impl<I: IdentityRepository> UpdateProfileUseCase<I> {
    pub async fn execute(
        &self,
        identity_id: Uuid,
        input: UpdateProfileInput,
    ) -> Result<Identity, AuthServiceError> {
        self.identities
            .find_by_id(identity_id)
            .await?
            .ok_or(AuthServiceError::IdentityNotFound)?;

        self.identities
            .update_profile(
                identity_id,
                input.first_name.as_deref(),
                input.last_name.as_deref(),
                input.national_code.as_deref(),
            )
            .await?;

        self.identities
            .find_by_id(identity_id)
            .await?
            .ok_or(AuthServiceError::IdentityNotFound)
    }
}
