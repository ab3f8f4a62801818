//! HTTP-level tests for registration, login and role enforcement.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, get_auth, post_json, TEST_PASSWORD};
use quest_api::bootstrap::ensure_admin;
use quest_api::config::BootstrapAdmin;
use quest_db::repositories::UserRepo;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_creates_employee_and_returns_token(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app.clone(),
        "/api/v1/auth/register",
        json!({"email": "ada@quest.test", "password": "long-enough", "full_name": "Ada"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["user"]["email"], "ada@quest.test");
    assert_eq!(json["user"]["role"], "employee");
    assert_eq!(json["user"]["points"], 0);
    assert_eq!(json["user"]["level"], 1);
    assert!(json["user"].get("password_hash").is_none());
    assert_eq!(json["expires_in"], 3600);

    let token = json["access_token"].as_str().unwrap();
    let me = get_auth(app, "/api/v1/auth/me", token).await;
    assert_eq!(me.status(), StatusCode::OK);
    assert_eq!(body_json(me).await["data"]["full_name"], "Ada");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_rejects_short_password(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/register",
        json!({"email": "ada@quest.test", "password": "short", "full_name": "Ada"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_rejects_malformed_email(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/register",
        json!({"email": "not-an-email", "password": "long-enough", "full_name": "Ada"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_email_is_a_conflict(pool: PgPool) {
    common::create_employee(&pool, "ada@quest.test").await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/auth/register",
        json!({"email": "ada@quest.test", "password": "long-enough", "full_name": "Ada"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_is_case_insensitive_on_email(pool: PgPool) {
    let (user, _) = common::create_employee(&pool, "grace@quest.test").await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/auth/login",
        json!({"email": "Grace@Quest.test", "password": TEST_PASSWORD}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["user"]["id"], user.id);
    assert!(json["access_token"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn wrong_password_and_unknown_email_look_the_same(pool: PgPool) {
    common::create_employee(&pool, "grace@quest.test").await;
    let app = common::build_test_app(pool);

    let wrong = post_json(
        app.clone(),
        "/api/v1/auth/login",
        json!({"email": "grace@quest.test", "password": "not-the-password"}),
    )
    .await;
    let unknown = post_json(
        app,
        "/api/v1/auth/login",
        json!({"email": "nobody@quest.test", "password": TEST_PASSWORD}),
    )
    .await;

    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(wrong).await, body_json(unknown).await);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn protected_routes_require_a_token(pool: PgPool) {
    let app = common::build_test_app(pool);

    let missing = get(app.clone(), "/api/v1/leaderboard").await;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let garbage = get_auth(app, "/api/v1/leaderboard", "not-a-jwt").await;
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn employees_cannot_reach_admin_routes(pool: PgPool) {
    let (_, token) = common::create_employee(&pool, "grace@quest.test").await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/admin/users", &token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn bootstrap_admin_is_created_once(pool: PgPool) {
    let admin = BootstrapAdmin {
        email: "root@quest.test".to_string(),
        password: "bootstrap-password".to_string(),
    };

    let created = ensure_admin(&pool, &admin).await.unwrap().expect("created");
    assert_eq!(created.role, "admin");
    assert!(ensure_admin(&pool, &admin).await.unwrap().is_none());

    let stored = UserRepo::find_by_email(&pool, "root@quest.test")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.id, created.id);
}
