use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// OTP code length in digits.
pub const OTP_CODE_LEN: usize = 5;

/// OTP code time-to-live in seconds (5 minutes).
pub const OTP_TTL_SECS: i64 = 300;

/// Access-token JWT lifetime in seconds (4 hours).
pub const ACCESS_TOKEN_TTL_SECS: u64 = 14_400;

/// Refresh-token JWT lifetime in seconds (7 days).
pub const REFRESH_TOKEN_TTL_SECS: u64 = 604_800;

/// Registered account keyed by mobile number.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: Uuid,
    pub mobile: String,
    pub first_name: String,
    pub last_name: String,
    pub national_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lifecycle state of an auth request. `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    Pending,
    Completed,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// One issuance of an OTP code tied to one mobile number.
///
/// `user_is_registered` is a snapshot taken when the request is created and
/// never recomputed, even if the account comes into existence later under a
/// different request.
#[derive(Debug, Clone)]
pub struct AuthRequest {
    pub id: Uuid,
    pub mobile: String,
    pub otp_code: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub national_code: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub user_is_registered: bool,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

impl AuthRequest {
    /// Build a new pending request for `mobile`. No code is attached yet.
    pub fn new(mobile: String, user_is_registered: bool) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            mobile,
            otp_code: None,
            first_name: None,
            last_name: None,
            national_code: None,
            expires_at: now + Duration::seconds(OTP_TTL_SECS),
            user_is_registered,
            status: RequestStatus::Pending,
            created_at: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    pub fn is_closed(&self) -> bool {
        self.status == RequestStatus::Completed
    }
}

/// Validate a mobile number: exactly 11 digits starting with `09`.
pub fn validate_mobile(mobile: &str) -> bool {
    mobile.len() == 11 && mobile.starts_with("09") && mobile.chars().all(|c| c.is_ascii_digit())
}

/// Validate a national code: exactly 10 ASCII digits.
pub fn validate_national_code(code: &str) -> bool {
    code.len() == 10 && code.chars().all(|c| c.is_ascii_digit())
}
