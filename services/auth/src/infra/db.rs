use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    sea_query::Expr,
};
use uuid::Uuid;

use camerator_auth_schema::{auth_requests, users};

use crate::domain::repository::{AuthRequestRepository, IdentityRepository};
use crate::domain::types::{AuthRequest, Identity, RequestStatus};
use crate::error::AuthServiceError;

// ── AuthRequest repository ───────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAuthRequestRepository {
    pub db: DatabaseConnection,
}

impl AuthRequestRepository for DbAuthRequestRepository {
    async fn create(&self, request: &AuthRequest) -> Result<(), AuthServiceError> {
        auth_requests::ActiveModel {
            id: Set(request.id),
            mobile: Set(request.mobile.clone()),
            otp_code: Set(request.otp_code.clone()),
            first_name: Set(request.first_name.clone()),
            last_name: Set(request.last_name.clone()),
            national_code: Set(request.national_code.clone()),
            expires_at: Set(request.expires_at),
            user_is_registered: Set(request.user_is_registered),
            status: Set(request.status.as_str().to_owned()),
            created_at: Set(request.created_at),
        }
        .insert(&self.db)
        .await
        .context("create auth request")?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuthRequest>, AuthServiceError> {
        let model = auth_requests::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find auth request by id")?;
        model.map(auth_request_from_model).transpose()
    }

    async fn store_code(
        &self,
        id: Uuid,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthServiceError> {
        auth_requests::ActiveModel {
            id: Set(id),
            otp_code: Set(Some(code.to_owned())),
            expires_at: Set(expires_at),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("store otp code")?;
        Ok(())
    }

    async fn store_profile(
        &self,
        id: Uuid,
        first_name: &str,
        last_name: &str,
        national_code: &str,
    ) -> Result<(), AuthServiceError> {
        auth_requests::ActiveModel {
            id: Set(id),
            first_name: Set(Some(first_name.to_owned())),
            last_name: Set(Some(last_name.to_owned())),
            national_code: Set(Some(national_code.to_owned())),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("store registration profile")?;
        Ok(())
    }

    async fn close_if_pending(&self, id: Uuid) -> Result<bool, AuthServiceError> {
        // Compare-and-set on status; the row count tells us who won.
        let result = auth_requests::Entity::update_many()
            .col_expr(
                auth_requests::Column::Status,
                Expr::value(RequestStatus::Completed.as_str()),
            )
            .filter(auth_requests::Column::Id.eq(id))
            .filter(auth_requests::Column::Status.eq(RequestStatus::Pending.as_str()))
            .exec(&self.db)
            .await
            .context("close auth request")?;
        Ok(result.rows_affected == 1)
    }

    async fn close_all_pending(&self, mobile: &str) -> Result<u64, AuthServiceError> {
        let result = auth_requests::Entity::update_many()
            .col_expr(
                auth_requests::Column::Status,
                Expr::value(RequestStatus::Completed.as_str()),
            )
            .filter(auth_requests::Column::Mobile.eq(mobile))
            .filter(auth_requests::Column::Status.eq(RequestStatus::Pending.as_str()))
            .exec(&self.db)
            .await
            .context("close pending auth requests for mobile")?;
        Ok(result.rows_affected)
    }
}

fn auth_request_from_model(model: auth_requests::Model) -> Result<AuthRequest, AuthServiceError> {
    let status = RequestStatus::from_str(&model.status)
        .ok_or_else(|| anyhow::anyhow!("unknown auth request status: {}", model.status))?;
    Ok(AuthRequest {
        id: model.id,
        mobile: model.mobile,
        otp_code: model.otp_code,
        first_name: model.first_name,
        last_name: model.last_name,
        national_code: model.national_code,
        expires_at: model.expires_at,
        user_is_registered: model.user_is_registered,
        status,
        created_at: model.created_at,
    })
}

// ── Identity repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbIdentityRepository {
    pub db: DatabaseConnection,
}

impl IdentityRepository for DbIdentityRepository {
    async fn find_by_mobile(&self, mobile: &str) -> Result<Option<Identity>, AuthServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Mobile.eq(mobile))
            .one(&self.db)
            .await
            .context("find identity by mobile")?;
        Ok(model.map(identity_from_model))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>, AuthServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find identity by id")?;
        Ok(model.map(identity_from_model))
    }

    async fn create(&self, identity: &Identity) -> Result<(), AuthServiceError> {
        users::ActiveModel {
            id: Set(identity.id),
            mobile: Set(identity.mobile.clone()),
            first_name: Set(identity.first_name.clone()),
            last_name: Set(identity.last_name.clone()),
            national_code: Set(identity.national_code.clone()),
            created_at: Set(identity.created_at),
            updated_at: Set(identity.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create identity")?;
        Ok(())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        first_name: Option<&str>,
        last_name: Option<&str>,
        national_code: Option<&str>,
    ) -> Result<(), AuthServiceError> {
        let mut model = users::ActiveModel {
            id: Set(id),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        if let Some(value) = first_name {
            model.first_name = Set(value.to_owned());
        }
        if let Some(value) = last_name {
            model.last_name = Set(value.to_owned());
        }
        if let Some(value) = national_code {
            model.national_code = Set(Some(value.to_owned()));
        }
        model
            .update(&self.db)
            .await
            .context("update identity profile")?;
        Ok(())
    }
}

fn identity_from_model(model: users::Model) -> Identity {
    Identity {
        id: model.id,
        mobile: model.mobile,
        first_name: model.first_name,
        last_name: model.last_name,
        national_code: model.national_code,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
