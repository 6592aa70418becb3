use std::time::Duration;

use sea_orm::Database;
use tracing::info;

use camerator_auth::config::AuthConfig;
use camerator_auth::infra::sms::KavenegarClient;
use camerator_auth::router::build_router;
use camerator_auth::state::AppState;
use camerator_auth::telemetry::init_tracing;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = AuthConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let sms = KavenegarClient::new(
        config.kavenegar_api_key.clone(),
        Duration::from_secs(config.sms_timeout_secs),
    )
    .expect("failed to build sms client");

    let state = AppState {
        db,
        sms,
        jwt_secret: config.jwt_secret,
        sms_permissive: config.sms_permissive,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.auth_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("auth service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
