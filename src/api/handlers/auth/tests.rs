//! Auth module tests.

use super::{AuthConfig, account, login, principal, recovery, register, session};
use crate::test_support::TestDb;
use anyhow::{Context, Result, anyhow};
use axum::{
    Extension, Router,
    body::{Body, to_bytes},
    http::{
        HeaderMap, HeaderValue, Request, StatusCode,
        header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
    },
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{TimeDelta, Utc};
use serde_json::{Value, json};
use sqlx::{PgPool, Row, postgres::PgPoolOptions};
use std::sync::Arc;
use tower::ServiceExt;

fn app_router(pool: PgPool) -> Router {
    Router::new()
        .route("/v1/auth/register", post(register::register))
        .route("/v1/auth/login", post(login::login))
        .route("/v1/auth/logout", post(session::logout))
        .route("/v1/account", get(account::account))
        .route("/v1/account/password", post(account::change_password))
        .route("/v1/auth/recovery/start", post(recovery::start))
        .route("/v1/auth/recovery/answer", post(recovery::answer))
        .route("/v1/auth/recovery/reset", post(recovery::reset))
        .layer(Extension(Arc::new(AuthConfig::default())))
        .layer(Extension(pool))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> Result<Response> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&value)?)
        }
        None => Body::empty(),
    };
    Ok(app.clone().oneshot(builder.body(body)?).await?)
}

async fn body_text(response: Response) -> Result<String> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

async fn body_json(response: Response) -> Result<Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// `mypass_session=<token>` taken from the response's `Set-Cookie`.
fn session_cookie_pair(response: &Response) -> Result<String> {
    let header = response
        .headers()
        .get(SET_COOKIE)
        .ok_or_else(|| anyhow!("missing Set-Cookie"))?
        .to_str()?;
    header
        .split(';')
        .next()
        .map(str::to_string)
        .context("empty Set-Cookie")
}

fn registration(username: &str, email: &str) -> Value {
    json!({
        "username": username,
        "email": email,
        "password": "letters123",
        "password_confirmation": "letters123",
        "favorite_color": "blue",
        "birth_city": "Paris",
        "first_employer": "Acme",
    })
}

async fn register_and_login(app: &Router, username: &str) -> Result<String> {
    let response = send(
        app,
        "POST",
        "/v1/auth/register",
        None,
        Some(registration(username, &format!("{username}@example.com"))),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(
        app,
        "POST",
        "/v1/auth/login",
        None,
        Some(json!({ "username": username, "password": "letters123" })),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::OK);
    session_cookie_pair(&response)
}

#[tokio::test]
async fn require_auth_without_token_is_not_authenticated() -> Result<()> {
    let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
    let result = principal::require_auth(&HeaderMap::new(), &pool, &AuthConfig::default()).await;
    assert!(matches!(
        result,
        Err(principal::AuthRejection::NotAuthenticated)
    ));
    Ok(())
}

#[tokio::test]
async fn logout_without_session_clears_cookie() -> Result<()> {
    let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
    let response = session::logout(
        HeaderMap::new(),
        Extension(pool),
        Extension(Arc::new(AuthConfig::default())),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cookie = response.headers().get(SET_COOKIE).and_then(|v| v.to_str().ok());
    assert!(cookie.is_some_and(|value| value.contains("Max-Age=0")));
    Ok(())
}

#[tokio::test]
async fn timed_out_rejection_sets_message_and_cookie() -> Result<()> {
    let response = principal::AuthRejection::TimedOut {
        clear_cookie: Some(HeaderValue::from_static("mypass_session=; Max-Age=0")),
    }
    .into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(SET_COOKIE));
    assert_eq!(
        body_text(response).await?,
        "Your account has been locked due to inactivity."
    );
    Ok(())
}

#[tokio::test]
async fn register_rejects_invalid_input_before_storage() -> Result<()> {
    let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
    let app = app_router(pool);

    let mut payload = registration("bad name", "a@example.com");
    let response = send(&app, "POST", "/v1/auth/register", None, Some(payload.clone()));
    let response = response.await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    payload["username"] = json!("alice");
    payload["password_confirmation"] = json!("letters124");
    let response = send(&app, "POST", "/v1/auth/register", None, Some(payload.clone()));
    let response = response.await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await?, "The two password fields didn't match.");

    payload["password_confirmation"] = json!("letters123");
    payload["birth_city"] = json!("");
    let response = send(&app, "POST", "/v1/auth/register", None, Some(payload)).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await?, "Security answers are required.");
    Ok(())
}

#[tokio::test]
async fn register_login_and_change_password() -> Result<()> {
    let Ok(db) = TestDb::new().await else {
        return Ok(());
    };
    let app = app_router(db.pool.clone());

    let cookie = register_and_login(&app, "alice").await?;

    let response = send(&app, "GET", "/v1/account", Some(&cookie), None).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await?["username"], "alice");

    let response = send(
        &app,
        "POST",
        "/v1/account/password",
        Some(&cookie),
        Some(json!({
            "old_password": "wrong1234",
            "new_password": "changed123",
            "new_password_confirmation": "changed123",
        })),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        "POST",
        "/v1/account/password",
        Some(&cookie),
        Some(json!({
            "old_password": "letters123",
            "new_password": "changed123",
            "new_password_confirmation": "changed123",
        })),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        &app,
        "POST",
        "/v1/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "letters123" })),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(
        &app,
        "POST",
        "/v1/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "changed123" })),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn duplicate_username_and_email_conflict() -> Result<()> {
    let Ok(db) = TestDb::new().await else {
        return Ok(());
    };
    let app = app_router(db.pool.clone());

    let response = send(
        &app,
        "POST",
        "/v1/auth/register",
        None,
        Some(registration("bob", "bob@example.com")),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(
        &app,
        "POST",
        "/v1/auth/register",
        None,
        Some(registration("bob", "other@example.com")),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_text(response).await?, "This username is already taken.");

    let response = send(
        &app,
        "POST",
        "/v1/auth/register",
        None,
        Some(registration("bobby", "BOB@example.com")),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_text(response).await?, "This email is already registered.");
    Ok(())
}

#[tokio::test]
async fn idle_session_is_locked_and_deleted() -> Result<()> {
    let Ok(db) = TestDb::new().await else {
        return Ok(());
    };
    let app = app_router(db.pool.clone());
    let cookie = register_and_login(&app, "carol").await?;

    sqlx::query("UPDATE user_sessions SET last_activity_at = $1")
        .bind(Utc::now() - TimeDelta::seconds(61))
        .execute(&db.pool)
        .await?;

    let response = send(&app, "GET", "/v1/account", Some(&cookie), None).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(SET_COOKIE));
    assert_eq!(
        body_text(response).await?,
        "Your account has been locked due to inactivity."
    );

    let remaining: i64 = sqlx::query("SELECT COUNT(*) AS count FROM user_sessions")
        .fetch_one(&db.pool)
        .await?
        .try_get("count")?;
    assert_eq!(remaining, 0);

    let response = send(&app, "GET", "/v1/account", Some(&cookie), None).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(response).await?, "Authentication required");
    Ok(())
}

#[tokio::test]
async fn logout_ends_the_session() -> Result<()> {
    let Ok(db) = TestDb::new().await else {
        return Ok(());
    };
    let app = app_router(db.pool.clone());
    let cookie = register_and_login(&app, "dave").await?;

    let response = send(&app, "POST", "/v1/auth/logout", Some(&cookie), None).await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, "GET", "/v1/account", Some(&cookie), None).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn recovery_flow_grants_a_single_reset() -> Result<()> {
    let Ok(db) = TestDb::new().await else {
        return Ok(());
    };
    let app = app_router(db.pool.clone());
    let response = send(
        &app,
        "POST",
        "/v1/auth/register",
        None,
        Some(registration("erin", "erin@example.com")),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(
        &app,
        "POST",
        "/v1/auth/recovery/start",
        None,
        Some(json!({ "username": "nobody" })),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(
        &app,
        "POST",
        "/v1/auth/recovery/start",
        None,
        Some(json!({ "username": "erin" })),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie_pair(&response)?;
    let question = body_json(response).await?;
    assert_eq!(question["step"], 1);
    assert_eq!(question["question"], "What is your favorite color?");

    let reset = json!({
        "new_password": "recovered1",
        "new_password_confirmation": "recovered1",
    });
    let response = send(
        &app,
        "POST",
        "/v1/auth/recovery/reset",
        Some(&cookie),
        Some(reset.clone()),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(
        &app,
        "POST",
        "/v1/auth/recovery/answer",
        Some(&cookie),
        Some(json!({ "answer": "Blue" })),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await?, "Incorrect answer.");

    for (answer, next) in [
        ("blue", Some("What city were you born in?")),
        ("Paris", Some("What is the name of your first employer?")),
        ("Acme", None),
    ] {
        let response = send(
            &app,
            "POST",
            "/v1/auth/recovery/answer",
            Some(&cookie),
            Some(json!({ "answer": answer })),
        )
        .await?;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await?;
        assert_eq!(body["question"].as_str(), next);
        assert_eq!(body["reset_authorized"], next.is_none());
    }

    let response = send(
        &app,
        "POST",
        "/v1/auth/recovery/reset",
        Some(&cookie),
        Some(reset.clone()),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, "POST", "/v1/auth/recovery/reset", Some(&cookie), Some(reset)).await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(
        &app,
        "POST",
        "/v1/auth/login",
        None,
        Some(json!({ "username": "erin", "password": "recovered1" })),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

/// Answers all three questions for `username` and returns the session cookie.
async fn authorize_recovery(app: &Router, username: &str) -> Result<String> {
    let response = send(
        app,
        "POST",
        "/v1/auth/recovery/start",
        None,
        Some(json!({ "username": username })),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie_pair(&response)?;

    for answer in ["blue", "Paris", "Acme"] {
        let response = send(
            app,
            "POST",
            "/v1/auth/recovery/answer",
            Some(&cookie),
            Some(json!({ "answer": answer })),
        )
        .await?;
        assert_eq!(response.status(), StatusCode::OK);
    }
    Ok(cookie)
}

#[tokio::test]
async fn concurrent_resets_spend_the_authorization_once() -> Result<()> {
    let Ok(db) = TestDb::new().await else {
        return Ok(());
    };
    let app = app_router(db.pool.clone());
    let response = send(
        &app,
        "POST",
        "/v1/auth/register",
        None,
        Some(registration("frank", "frank@example.com")),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = authorize_recovery(&app, "frank").await?;

    let first = json!({
        "new_password": "firstpass1",
        "new_password_confirmation": "firstpass1",
    });
    let second = json!({
        "new_password": "secondpass2",
        "new_password_confirmation": "secondpass2",
    });
    let (a, b) = tokio::join!(
        send(&app, "POST", "/v1/auth/recovery/reset", Some(&cookie), Some(first)),
        send(&app, "POST", "/v1/auth/recovery/reset", Some(&cookie), Some(second)),
    );
    let mut statuses = [a?.status().as_u16(), b?.status().as_u16()];
    statuses.sort_unstable();
    assert_eq!(statuses, [200, 403]);

    let token = cookie
        .strip_prefix("mypass_session=")
        .context("unexpected cookie name")?;
    let authorized: bool =
        sqlx::query("SELECT recovery_authorized FROM user_sessions WHERE session_hash = $1")
            .bind(super::utils::hash_session_token(token))
            .fetch_one(&db.pool)
            .await?
            .try_get("recovery_authorized")?;
    assert!(!authorized);
    Ok(())
}

#[tokio::test]
async fn reset_claims_only_the_recovering_user() -> Result<()> {
    let Ok(db) = TestDb::new().await else {
        return Ok(());
    };
    let app = app_router(db.pool.clone());
    for name in ["gina", "hank"] {
        let response = send(
            &app,
            "POST",
            "/v1/auth/register",
            None,
            Some(registration(name, &format!("{name}@example.com"))),
        )
        .await?;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
    let cookie = authorize_recovery(&app, "gina").await?;
    let token = cookie
        .strip_prefix("mypass_session=")
        .context("unexpected cookie name")?;
    let token_hash = super::utils::hash_session_token(token);

    let outcome =
        super::storage::reset_password(&db.pool, "hank", "not-a-hash", &token_hash).await?;
    assert_eq!(outcome, super::storage::ResetOutcome::NotAuthorized);

    let outcome =
        super::storage::reset_password(&db.pool, "gina", "not-a-hash", &token_hash).await?;
    assert_eq!(outcome, super::storage::ResetOutcome::Reset);

    let outcome =
        super::storage::reset_password(&db.pool, "gina", "not-a-hash", &token_hash).await?;
    assert_eq!(outcome, super::storage::ResetOutcome::NotAuthorized);
    Ok(())
}
