//! SQL for users, security answers and sessions.

use crate::{
    recovery::{RecoveryProgress, SecurityAnswers},
    session::SessionState,
};
use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::{Instrument, info_span};
use uuid::Uuid;

use super::utils::{
    generate_session_token, hash_session_token, is_unique_violation, unique_constraint,
};

#[derive(Debug)]
pub(super) enum RegisterOutcome {
    Created(Uuid),
    UsernameTaken,
    EmailTaken,
}

pub(super) struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub answers: &'a SecurityAnswers,
}

#[derive(Debug)]
pub(super) struct UserCredentials {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
}

fn credentials_from_row(row: &PgRow) -> Result<UserCredentials, sqlx::Error> {
    Ok(UserCredentials {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
    })
}

/// Inserts the user and their security answers in one transaction.
pub(super) async fn insert_user(pool: &PgPool, user: &NewUser<'_>) -> Result<RegisterOutcome> {
    let mut tx = pool
        .begin()
        .await
        .context("failed to begin registration")?;

    let query = r"
        INSERT INTO users (username, email, password_hash)
        VALUES ($1, $2, $3)
        RETURNING id
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let inserted = sqlx::query_scalar::<_, Uuid>(query)
        .bind(user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .fetch_one(&mut *tx)
        .instrument(span)
        .await;

    let user_id = match inserted {
        Ok(user_id) => user_id,
        Err(err) => {
            return match unique_constraint(&err) {
                Some("users_username_key") => Ok(RegisterOutcome::UsernameTaken),
                Some("users_email_key") => Ok(RegisterOutcome::EmailTaken),
                _ => Err(err).context("failed to insert user"),
            };
        }
    };

    let [favorite_color, birth_city, first_employer] = user.answers.as_slice();
    let query = r"
        INSERT INTO security_answers (user_id, favorite_color, birth_city, first_employer)
        VALUES ($1, $2, $3, $4)
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    sqlx::query(query)
        .bind(user_id)
        .bind(favorite_color)
        .bind(birth_city)
        .bind(first_employer)
        .execute(&mut *tx)
        .instrument(span)
        .await
        .context("failed to insert security answers")?;

    tx.commit().await.context("failed to commit registration")?;

    Ok(RegisterOutcome::Created(user_id))
}

pub(super) async fn find_credentials(
    pool: &PgPool,
    username: &str,
) -> Result<Option<UserCredentials>> {
    let query = "SELECT id, username, password_hash FROM users WHERE username = $1";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(username)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup user")?;

    row.as_ref()
        .map(credentials_from_row)
        .transpose()
        .context("failed to decode user")
}

pub(super) async fn find_credentials_by_id(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<UserCredentials>> {
    let query = "SELECT id, username, password_hash FROM users WHERE id = $1";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(user_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup user")?;

    row.as_ref()
        .map(credentials_from_row)
        .transpose()
        .context("failed to decode user")
}

pub(super) async fn update_password_hash(
    pool: &PgPool,
    user_id: Uuid,
    password_hash: &str,
) -> Result<()> {
    let query = "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(user_id)
        .bind(password_hash)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to update password")?;
    Ok(())
}

pub(super) async fn load_security_answers(
    pool: &PgPool,
    username: &str,
) -> Result<Option<SecurityAnswers>> {
    let query = r"
        SELECT a.favorite_color, a.birth_city, a.first_employer
        FROM security_answers a
        JOIN users u ON u.id = a.user_id
        WHERE u.username = $1
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(username)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to load security answers")?;

    row.as_ref()
        .map(|row| -> Result<SecurityAnswers, sqlx::Error> {
            Ok(SecurityAnswers::new(
                row.try_get("favorite_color")?,
                row.try_get("birth_city")?,
                row.try_get("first_employer")?,
            ))
        })
        .transpose()
        .context("failed to decode security answers")
}

#[derive(Debug, PartialEq, Eq)]
pub(super) enum ResetOutcome {
    Reset,
    /// The session holds no unspent authorization for this user.
    NotAuthorized,
    UnknownUser,
}

/// Spends the session's reset authorization and stores the new password.
///
/// The authorization is claimed with a conditional update inside the same
/// transaction as the password change, so concurrent requests on one session
/// reset at most once.
pub(super) async fn reset_password(
    pool: &PgPool,
    username: &str,
    password_hash: &str,
    session_hash: &[u8],
) -> Result<ResetOutcome> {
    let mut tx = pool.begin().await.context("failed to begin reset")?;

    let query = r"
        UPDATE user_sessions
        SET recovery_username = NULL, recovery_step = 0, recovery_authorized = FALSE
        WHERE session_hash = $1 AND recovery_authorized AND recovery_username = $2
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let claimed = sqlx::query(query)
        .bind(session_hash)
        .bind(username)
        .execute(&mut *tx)
        .instrument(span)
        .await
        .context("failed to claim reset authorization")?;
    if claimed.rows_affected() != 1 {
        return Ok(ResetOutcome::NotAuthorized);
    }

    let query = "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE username = $1";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let updated = sqlx::query(query)
        .bind(username)
        .bind(password_hash)
        .execute(&mut *tx)
        .instrument(span)
        .await
        .context("failed to reset password")?;
    if updated.rows_affected() == 0 {
        return Ok(ResetOutcome::UnknownUser);
    }

    tx.commit().await.context("failed to commit reset")?;

    Ok(ResetOutcome::Reset)
}

/// Stores a new session row and returns the raw token for the cookie.
pub(super) async fn insert_session(pool: &PgPool, state: &SessionState) -> Result<String> {
    let query = r"
        INSERT INTO user_sessions
            (session_hash, user_id, authenticated, last_activity_at,
             recovery_username, recovery_step, recovery_authorized)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );

    let recovery = state.recovery();
    for _ in 0..3 {
        let token = generate_session_token()?;
        let token_hash = hash_session_token(&token);
        let result = sqlx::query(query)
            .bind(token_hash)
            .bind(state.user_id())
            .bind(state.is_authenticated())
            .bind(state.last_activity())
            .bind(recovery.map(RecoveryProgress::username))
            .bind(recovery.map_or(0, RecoveryProgress::step_column))
            .bind(recovery.is_some_and(RecoveryProgress::is_authorized))
            .execute(pool)
            .instrument(span.clone())
            .await;

        match result {
            Ok(_) => return Ok(token),
            Err(err) if is_unique_violation(&err) => {}
            Err(err) => return Err(err).context("failed to insert session"),
        }
    }

    Err(anyhow!("failed to generate unique session token"))
}

pub(super) async fn lookup_session(
    pool: &PgPool,
    token_hash: &[u8],
) -> Result<Option<SessionState>> {
    let query = r"
        SELECT user_id, authenticated, last_activity_at,
               recovery_username, recovery_step, recovery_authorized
        FROM user_sessions
        WHERE session_hash = $1
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(token_hash)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup session")?;

    let Some(row) = row else {
        return Ok(None);
    };

    let user_id: Option<Uuid> = row.try_get("user_id")?;
    let authenticated: bool = row.try_get("authenticated")?;
    let last_activity: DateTime<Utc> = row.try_get("last_activity_at")?;
    let recovery_username: Option<String> = row.try_get("recovery_username")?;
    let recovery_step: i16 = row.try_get("recovery_step")?;
    let recovery_authorized: bool = row.try_get("recovery_authorized")?;

    let recovery = recovery_username.and_then(|username| {
        RecoveryProgress::from_parts(username, recovery_step, recovery_authorized)
    });

    Ok(Some(SessionState::from_parts(
        user_id,
        authenticated,
        last_activity,
        recovery,
    )))
}

/// Persists every field of the session state.
pub(super) async fn save_session(
    pool: &PgPool,
    token_hash: &[u8],
    state: &SessionState,
) -> Result<()> {
    let query = r"
        UPDATE user_sessions
        SET user_id = $2,
            authenticated = $3,
            last_activity_at = $4,
            recovery_username = $5,
            recovery_step = $6,
            recovery_authorized = $7
        WHERE session_hash = $1
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let recovery = state.recovery();
    sqlx::query(query)
        .bind(token_hash)
        .bind(state.user_id())
        .bind(state.is_authenticated())
        .bind(state.last_activity())
        .bind(recovery.map(RecoveryProgress::username))
        .bind(recovery.map_or(0, RecoveryProgress::step_column))
        .bind(recovery.is_some_and(RecoveryProgress::is_authorized))
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to save session")?;
    Ok(())
}

pub(super) async fn touch_session(
    pool: &PgPool,
    token_hash: &[u8],
    now: DateTime<Utc>,
) -> Result<()> {
    let query = "UPDATE user_sessions SET last_activity_at = $2 WHERE session_hash = $1";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(token_hash)
        .bind(now)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to update session activity")?;
    Ok(())
}

pub(super) async fn delete_session(pool: &PgPool, token_hash: &[u8]) -> Result<()> {
    let query = "DELETE FROM user_sessions WHERE session_hash = $1";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(token_hash)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to delete session")?;
    Ok(())
}
