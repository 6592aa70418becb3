#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::types::{AuthRequest, Identity};
use crate::error::AuthServiceError;

/// Store for auth requests. Rows are never deleted; they are the audit trail
/// of every authentication attempt.
pub trait AuthRequestRepository: Send + Sync {
    async fn create(&self, request: &AuthRequest) -> Result<(), AuthServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuthRequest>, AuthServiceError>;

    /// Attach a freshly generated code and push the expiry window forward.
    async fn store_code(
        &self,
        id: Uuid,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthServiceError>;

    /// Record the registration profile a new user verified with. Part of the
    /// audit trail; only written on the successful verification.
    async fn store_profile(
        &self,
        id: Uuid,
        first_name: &str,
        last_name: &str,
        national_code: &str,
    ) -> Result<(), AuthServiceError>;

    /// Atomically flip PENDING to COMPLETED. Returns `false` when the request
    /// was already closed, i.e. the caller lost the race.
    async fn close_if_pending(&self, id: Uuid) -> Result<bool, AuthServiceError>;

    /// Close every PENDING request for `mobile`. Returns the number closed.
    async fn close_all_pending(&self, mobile: &str) -> Result<u64, AuthServiceError>;
}

/// Store for registered accounts.
pub trait IdentityRepository: Send + Sync {
    async fn find_by_mobile(&self, mobile: &str) -> Result<Option<Identity>, AuthServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>, AuthServiceError>;

    async fn create(&self, identity: &Identity) -> Result<(), AuthServiceError>;

    /// Partial profile update. The mobile number is immutable.
    async fn update_profile(
        &self,
        id: Uuid,
        first_name: Option<&str>,
        last_name: Option<&str>,
        national_code: Option<&str>,
    ) -> Result<(), AuthServiceError>;
}

/// Outbound SMS delivery for one-time codes.
pub trait SmsGateway: Send + Sync {
    /// Deliver `code` to `mobile`. Transport errors, timeouts and non-success
    /// provider responses all surface as `AuthServiceError::Delivery`.
    async fn send_otp_code(&self, mobile: &str, code: &str) -> Result<(), AuthServiceError>;
}
