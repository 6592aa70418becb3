use sea_orm::DatabaseConnection;

use crate::infra::db::{DbAuthRequestRepository, DbIdentityRepository};
use crate::infra::sms::KavenegarClient;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub sms: KavenegarClient,
    pub jwt_secret: String,
    pub sms_permissive: bool,
}

impl AppState {
    pub fn auth_request_repo(&self) -> DbAuthRequestRepository {
        DbAuthRequestRepository {
            db: self.db.clone(),
        }
    }

    pub fn identity_repo(&self) -> DbIdentityRepository {
        DbIdentityRepository {
            db: self.db.clone(),
        }
    }

    pub fn sms_gateway(&self) -> KavenegarClient {
        self.sms.clone()
    }
}
