use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Profile fields a never-registered mobile must supply on verification,
/// checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    FirstName,
    LastName,
    NationalCode,
}

impl ProfileField {
    pub fn attr(&self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::NationalCode => "national_code",
        }
    }
}

impl std::fmt::Display for ProfileField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::FirstName => "first name",
            Self::LastName => "last name",
            Self::NationalCode => "national code",
        };
        f.write_str(name)
    }
}

/// Auth service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("mobile is required")]
    BlankMobile,
    #[error("mobile must be 11 digits in the format 09XXXXXXXXX")]
    InvalidMobile,
    #[error("{0} is required")]
    MissingProfileField(ProfileField),
    #[error("national code must be exactly 10 digits")]
    InvalidNationalCode,
    #[error("otp code is required")]
    BlankOtpCode,
    #[error("the request is closed")]
    RequestClosed,
    #[error("the otp code is expired")]
    CodeExpired,
    #[error("the otp code is invalid")]
    CodeMismatch,
    #[error("the previous otp code has not expired yet")]
    NotYetExpired,
    #[error("auth request not found")]
    RequestNotFound,
    #[error("user not found")]
    IdentityNotFound,
    #[error("refresh token is required")]
    BlankRefreshToken,
    #[error("the token is invalid or expired")]
    InvalidToken,
    #[error("sms delivery failed")]
    Delivery(#[source] anyhow::Error),
    #[error("a server error occurred")]
    Internal(#[from] anyhow::Error),
}

impl AuthServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BlankMobile
            | Self::InvalidMobile
            | Self::MissingProfileField(_)
            | Self::InvalidNationalCode
            | Self::BlankOtpCode
            | Self::RequestClosed
            | Self::CodeExpired
            | Self::CodeMismatch
            | Self::NotYetExpired
            | Self::BlankRefreshToken => StatusCode::BAD_REQUEST,
            Self::RequestNotFound | Self::IdentityNotFound => StatusCode::NOT_FOUND,
            Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::Delivery(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Coarse error family carried in the wire envelope's `type` field.
    pub fn error_type(&self) -> &'static str {
        match self.status() {
            StatusCode::NOT_FOUND => "client_error",
            StatusCode::UNAUTHORIZED => "authentication_error",
            s if s.is_server_error() => "server_error",
            _ => "validation_error",
        }
    }

    /// Stable machine-readable slug carried in the wire envelope's `code` field.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BlankMobile | Self::BlankOtpCode | Self::BlankRefreshToken => "blank",
            Self::InvalidMobile
            | Self::MissingProfileField(_)
            | Self::InvalidNationalCode
            | Self::CodeMismatch => "invalid_input",
            Self::RequestClosed => "closed",
            Self::CodeExpired => "expired",
            Self::NotYetExpired => "not_yet_expired",
            Self::RequestNotFound | Self::IdentityNotFound => "not_found",
            Self::InvalidToken => "token_not_valid",
            Self::Delivery(_) => "delivery_error",
            Self::Internal(_) => "error",
        }
    }

    /// Offending field name, when the error is attributable to one.
    pub fn attr(&self) -> Option<&'static str> {
        match self {
            Self::BlankMobile | Self::InvalidMobile => Some("mobile"),
            Self::MissingProfileField(field) => Some(field.attr()),
            Self::InvalidNationalCode => Some("national_code"),
            Self::BlankOtpCode | Self::CodeExpired | Self::CodeMismatch => Some("otp_code"),
            Self::BlankRefreshToken => Some("refresh_token"),
            _ => None,
        }
    }
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        // 4xx are expected client errors; only 5xx variants carry a source
        // chain worth logging.
        match &self {
            Self::Delivery(e) => {
                tracing::error!(error = %e, code = "delivery_error", "sms delivery failed");
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, code = "error", "internal error");
            }
            _ => {}
        }
        let body = serde_json::json!({
            "type": self.error_type(),
            "code": self.code(),
            "detail": self.to_string(),
            "attr": self.attr(),
        });
        (status, axum::Json(body)).into_response()
    }
}
