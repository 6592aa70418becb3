/// Auth service configuration loaded from environment variables.
#[derive(Debug)]
pub struct AuthConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing JWT access and refresh tokens.
    pub jwt_secret: String,
    /// Kavenegar API key for OTP SMS delivery.
    pub kavenegar_api_key: String,
    /// TCP port to listen on (default 3110). Env var: `AUTH_PORT`.
    pub auth_port: u16,
    /// When true, a failed SMS delivery is logged instead of failing the
    /// request — for local setups without SMS credentials.
    /// Env var: `SMS_PERMISSIVE`.
    pub sms_permissive: bool,
    /// Upper bound for one SMS gateway call in seconds (default 10).
    /// Env var: `SMS_TIMEOUT_SECS`.
    pub sms_timeout_secs: u64,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET"),
            kavenegar_api_key: std::env::var("KAVENEGAR_API_KEY").expect("KAVENEGAR_API_KEY"),
            auth_port: std::env::var("AUTH_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3110),
            sms_permissive: std::env::var("SMS_PERMISSIVE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            sms_timeout_secs: std::env::var("SMS_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        }
    }
}
