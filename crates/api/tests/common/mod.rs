#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use quest_api::auth::jwt::{generate_access_token, JwtConfig};
use quest_api::auth::password::hash_password;
use quest_api::config::ServerConfig;
use quest_api::router::build_app_router;
use quest_api::state::AppState;
use quest_api::ws::WsManager;
use quest_core::roles::{ROLE_ADMIN, ROLE_EMPLOYEE};
use quest_db::models::user::{CreateUser, User};
use quest_db::repositories::UserRepo;
use quest_events::{EventBus, EventPublisher};
use quest_ledger::{LedgerEngine, PgLedgerStore};
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "quest-password";

/// Server configuration for tests: dev CORS origin, fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        leaderboard_limit: 100,
        transaction_history_limit: 50,
        bootstrap_admin: None,
        jwt: JwtConfig {
            secret: "test-secret-for-integration-tests".to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// The application router exactly as `main.rs` builds it, over `pool`.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_bus(pool, Arc::new(EventBus::default()))
}

/// Same as [`build_test_app`], publishing ledger events on `event_bus`.
pub fn build_test_app_with_bus(pool: PgPool, event_bus: Arc<EventBus>) -> Router {
    let config = test_config();
    let ledger = LedgerEngine::new(
        Arc::new(PgLedgerStore::new(pool.clone())),
        Arc::clone(&event_bus) as Arc<dyn EventPublisher>,
    )
    .with_leaderboard_limit(config.leaderboard_limit)
    .with_history_limit(config.transaction_history_limit);

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        ws_manager: Arc::new(WsManager::new()),
        event_bus,
        ledger: Arc::new(ledger),
    };
    build_app_router(state, &config)
}

/// Insert a user with [`TEST_PASSWORD`] and return it with a valid token.
pub async fn create_user(pool: &PgPool, email: &str, role: &str) -> (User, String) {
    let input = CreateUser {
        email: email.to_string(),
        password_hash: hash_password(TEST_PASSWORD).unwrap(),
        full_name: email.split('@').next().unwrap().to_string(),
        role: role.to_string(),
    };
    let user = UserRepo::create(pool, &input).await.unwrap();
    let token = generate_access_token(user.id, &user.role, &test_config().jwt).unwrap();
    (user, token)
}

pub async fn create_admin(pool: &PgPool) -> (User, String) {
    create_user(pool, "admin@quest.test", ROLE_ADMIN).await
}

pub async fn create_employee(pool: &PgPool, email: &str) -> (User, String) {
    create_user(pool, email, ROLE_EMPLOYEE).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}
