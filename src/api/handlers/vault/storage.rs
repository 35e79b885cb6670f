//! SQL for the vault records.
//!
//! Every query is scoped by `user_id`, so a record owned by someone else looks
//! exactly like a missing one. Saves of dated records run the expiration check
//! inside the same transaction as the write: the record, its notified flags and
//! any new notification commit together.

use axum::{http::StatusCode, response::IntoResponse};
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{Instrument, error, info_span};
use uuid::Uuid;

use crate::{
    notifications::NotificationRepo,
    vault::{
        CipherError, Expiry, Notice,
        models::{CreditCard, Identity, LoginItem, SavedPassword, SecureNote},
    },
};

#[derive(Debug)]
pub(super) enum VaultError {
    NotFound,
    BadRequest(&'static str),
    Conflict(&'static str),
    Cipher(CipherError),
    Database(sqlx::Error),
}

impl From<sqlx::Error> for VaultError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err)
    }
}

impl From<CipherError> for VaultError {
    fn from(err: CipherError) -> Self {
        Self::Cipher(err)
    }
}

impl IntoResponse for VaultError {
    /// Storage and crypto failures are logged and surfaced as a bare `500`.
    fn into_response(self) -> axum::response::Response {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND.into_response(),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            Self::Conflict(message) => (StatusCode::CONFLICT, message).into_response(),
            Self::Cipher(err) => {
                error!("Vault cipher error: {err}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            Self::Database(err) => {
                error!("Database error: {err}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

pub(super) struct LoginFields<'a> {
    pub name: &'a str,
    pub site_url: &'a str,
    pub username: &'a str,
    pub password_ciphertext: &'a str,
    pub notes: &'a str,
}

pub(super) struct CardFields<'a> {
    pub cardholder_name: &'a str,
    pub card_number: &'a str,
    pub cvv: &'a str,
    pub expiration_date: Option<NaiveDate>,
}

pub(super) struct IdentityFields<'a> {
    pub full_name: &'a str,
    pub passport_number: Option<&'a str>,
    pub passport_expiration_date: Option<NaiveDate>,
    pub license_number: Option<&'a str>,
    pub license_expiration_date: Option<NaiveDate>,
}

/// The day the expiration rule is evaluated for, and its window.
#[derive(Clone, Copy, Debug)]
pub(super) struct ExpirationClock {
    pub today: NaiveDate,
    pub window_days: u32,
}

// Saved passwords

pub(super) async fn list_saved_passwords(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<SavedPassword>, sqlx::Error> {
    let query = r"
        SELECT id, user_id, name, password_ciphertext, suggested, created_at
        FROM saved_passwords
        WHERE user_id = $1
        ORDER BY created_at DESC, id DESC
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    sqlx::query_as::<_, SavedPassword>(query)
        .bind(user_id)
        .fetch_all(pool)
        .instrument(span)
        .await
}

pub(super) async fn insert_saved_password(
    pool: &PgPool,
    user_id: Uuid,
    name: &str,
    password_ciphertext: &str,
    suggested: bool,
) -> Result<SavedPassword, sqlx::Error> {
    let query = r"
        INSERT INTO saved_passwords (user_id, name, password_ciphertext, suggested)
        VALUES ($1, $2, $3, $4)
        RETURNING id, user_id, name, password_ciphertext, suggested, created_at
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    sqlx::query_as::<_, SavedPassword>(query)
        .bind(user_id)
        .bind(name)
        .bind(password_ciphertext)
        .bind(suggested)
        .fetch_one(pool)
        .instrument(span)
        .await
}

/// `None` fields keep their stored value.
pub(super) async fn update_saved_password(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    name: Option<&str>,
    password_ciphertext: Option<&str>,
) -> Result<Option<SavedPassword>, sqlx::Error> {
    let query = r"
        UPDATE saved_passwords
        SET name = COALESCE($3, name),
            password_ciphertext = COALESCE($4, password_ciphertext)
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, name, password_ciphertext, suggested, created_at
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query_as::<_, SavedPassword>(query)
        .bind(id)
        .bind(user_id)
        .bind(name)
        .bind(password_ciphertext)
        .fetch_optional(pool)
        .instrument(span)
        .await
}

/// Returns the deleted entry's name.
pub(super) async fn delete_saved_password(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<Option<String>, sqlx::Error> {
    let query = "DELETE FROM saved_passwords WHERE id = $1 AND user_id = $2 RETURNING name";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    sqlx::query_scalar::<_, String>(query)
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
}

// Logins

pub(super) async fn list_logins(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<LoginItem>, sqlx::Error> {
    let query = r"
        SELECT id, user_id, name, site_url, username, password_ciphertext, notes,
               created_at, updated_at
        FROM logins
        WHERE user_id = $1
        ORDER BY name ASC, created_at ASC
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    sqlx::query_as::<_, LoginItem>(query)
        .bind(user_id)
        .fetch_all(pool)
        .instrument(span)
        .await
}

pub(super) async fn find_login(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<Option<LoginItem>, sqlx::Error> {
    let query = r"
        SELECT id, user_id, name, site_url, username, password_ciphertext, notes,
               created_at, updated_at
        FROM logins
        WHERE id = $1 AND user_id = $2
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    sqlx::query_as::<_, LoginItem>(query)
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
}

pub(super) async fn insert_login(
    pool: &PgPool,
    user_id: Uuid,
    fields: &LoginFields<'_>,
) -> Result<LoginItem, sqlx::Error> {
    let query = r"
        INSERT INTO logins (user_id, name, site_url, username, password_ciphertext, notes)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, user_id, name, site_url, username, password_ciphertext, notes,
                  created_at, updated_at
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    sqlx::query_as::<_, LoginItem>(query)
        .bind(user_id)
        .bind(fields.name)
        .bind(fields.site_url)
        .bind(fields.username)
        .bind(fields.password_ciphertext)
        .bind(fields.notes)
        .fetch_one(pool)
        .instrument(span)
        .await
}

pub(super) async fn update_login(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    fields: &LoginFields<'_>,
) -> Result<Option<LoginItem>, sqlx::Error> {
    let query = r"
        UPDATE logins
        SET name = $3, site_url = $4, username = $5, password_ciphertext = $6, notes = $7,
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, name, site_url, username, password_ciphertext, notes,
                  created_at, updated_at
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query_as::<_, LoginItem>(query)
        .bind(id)
        .bind(user_id)
        .bind(fields.name)
        .bind(fields.site_url)
        .bind(fields.username)
        .bind(fields.password_ciphertext)
        .bind(fields.notes)
        .fetch_optional(pool)
        .instrument(span)
        .await
}

// Credit cards

pub(super) async fn list_credit_cards(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<CreditCard>, sqlx::Error> {
    let query = r"
        SELECT id, user_id, cardholder_name, card_number, cvv,
               expiration_date, expiration_notified, created_at, updated_at
        FROM credit_cards
        WHERE user_id = $1
        ORDER BY created_at DESC
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    sqlx::query_as::<_, CreditCard>(query)
        .bind(user_id)
        .fetch_all(pool)
        .instrument(span)
        .await
}

pub(super) async fn find_credit_card(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<Option<CreditCard>, sqlx::Error> {
    let query = r"
        SELECT id, user_id, cardholder_name, card_number, cvv,
               expiration_date, expiration_notified, created_at, updated_at
        FROM credit_cards
        WHERE id = $1 AND user_id = $2
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    sqlx::query_as::<_, CreditCard>(query)
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
}

pub(super) async fn insert_credit_card(
    pool: &PgPool,
    user_id: Uuid,
    fields: &CardFields<'_>,
    clock: ExpirationClock,
) -> Result<(CreditCard, Option<Notice>), sqlx::Error> {
    let mut tx = pool.begin().await?;

    let query = r"
        INSERT INTO credit_cards (user_id, cardholder_name, card_number, cvv, expiration_date)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, user_id, cardholder_name, card_number, cvv,
                  expiration_date, expiration_notified, created_at, updated_at
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let mut card = sqlx::query_as::<_, CreditCard>(query)
        .bind(user_id)
        .bind(fields.cardholder_name)
        .bind(fields.card_number)
        .bind(fields.cvv)
        .bind(fields.expiration_date)
        .fetch_one(&mut *tx)
        .instrument(span)
        .await?;

    let notice = notify_credit_card(&mut tx, &mut card, clock).await?;
    tx.commit().await?;
    Ok((card, notice))
}

/// `Ok(None)` when the card does not exist for this user.
pub(super) async fn update_credit_card(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    fields: &CardFields<'_>,
    clock: ExpirationClock,
) -> Result<Option<(CreditCard, Option<Notice>)>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let query = r"
        SELECT expiration_date, expiration_notified
        FROM credit_cards
        WHERE id = $1 AND user_id = $2
        FOR UPDATE
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let previous = sqlx::query_as::<_, (Option<NaiveDate>, bool)>(query)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .instrument(span)
        .await?;
    let Some((previous_date, previous_notified)) = previous else {
        return Ok(None);
    };
    let expiration = Expiry::rearm(
        Expiry::new(previous_date, previous_notified),
        fields.expiration_date,
    );

    let query = r"
        UPDATE credit_cards
        SET cardholder_name = $3, card_number = $4, cvv = $5,
            expiration_date = $6, expiration_notified = $7, updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, cardholder_name, card_number, cvv,
                  expiration_date, expiration_notified, created_at, updated_at
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let mut card = sqlx::query_as::<_, CreditCard>(query)
        .bind(id)
        .bind(user_id)
        .bind(fields.cardholder_name)
        .bind(fields.card_number)
        .bind(fields.cvv)
        .bind(expiration.date)
        .bind(expiration.notified)
        .fetch_one(&mut *tx)
        .instrument(span)
        .await?;

    let notice = notify_credit_card(&mut tx, &mut card, clock).await?;
    tx.commit().await?;
    Ok(Some((card, notice)))
}

async fn notify_credit_card(
    tx: &mut Transaction<'_, Postgres>,
    card: &mut CreditCard,
    clock: ExpirationClock,
) -> Result<Option<Notice>, sqlx::Error> {
    let Some(notice) = card.check_expiration(clock.today, clock.window_days) else {
        return Ok(None);
    };
    NotificationRepo::create(tx, card.user_id, &notice.message).await?;
    let query = "UPDATE credit_cards SET expiration_notified = $2 WHERE id = $1";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(card.id)
        .bind(card.expiration.notified)
        .execute(&mut **tx)
        .instrument(span)
        .await?;
    Ok(Some(notice))
}

// Identities

pub(super) async fn list_identities(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<Identity>, sqlx::Error> {
    let query = r"
        SELECT id, user_id, full_name,
               passport_number, passport_expiration_date, passport_notified,
               license_number, license_expiration_date, license_notified,
               created_at, updated_at
        FROM identities
        WHERE user_id = $1
        ORDER BY full_name ASC, created_at ASC
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    sqlx::query_as::<_, Identity>(query)
        .bind(user_id)
        .fetch_all(pool)
        .instrument(span)
        .await
}

pub(super) async fn find_identity(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<Option<Identity>, sqlx::Error> {
    let query = r"
        SELECT id, user_id, full_name,
               passport_number, passport_expiration_date, passport_notified,
               license_number, license_expiration_date, license_notified,
               created_at, updated_at
        FROM identities
        WHERE id = $1 AND user_id = $2
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    sqlx::query_as::<_, Identity>(query)
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
}

pub(super) async fn insert_identity(
    pool: &PgPool,
    user_id: Uuid,
    fields: &IdentityFields<'_>,
    clock: ExpirationClock,
) -> Result<(Identity, Vec<Notice>), sqlx::Error> {
    let mut tx = pool.begin().await?;

    let query = r"
        INSERT INTO identities
            (user_id, full_name, passport_number, passport_expiration_date,
             license_number, license_expiration_date)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, user_id, full_name,
                  passport_number, passport_expiration_date, passport_notified,
                  license_number, license_expiration_date, license_notified,
                  created_at, updated_at
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let mut identity = sqlx::query_as::<_, Identity>(query)
        .bind(user_id)
        .bind(fields.full_name)
        .bind(fields.passport_number)
        .bind(fields.passport_expiration_date)
        .bind(fields.license_number)
        .bind(fields.license_expiration_date)
        .fetch_one(&mut *tx)
        .instrument(span)
        .await?;

    let notices = notify_identity(&mut tx, &mut identity, clock).await?;
    tx.commit().await?;
    Ok((identity, notices))
}

/// `Ok(None)` when the identity does not exist for this user.
pub(super) async fn update_identity(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    fields: &IdentityFields<'_>,
    clock: ExpirationClock,
) -> Result<Option<(Identity, Vec<Notice>)>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let query = r"
        SELECT passport_expiration_date, passport_notified,
               license_expiration_date, license_notified
        FROM identities
        WHERE id = $1 AND user_id = $2
        FOR UPDATE
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let previous = sqlx::query_as::<_, (Option<NaiveDate>, bool, Option<NaiveDate>, bool)>(query)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .instrument(span)
        .await?;
    let Some((passport_date, passport_notified, license_date, license_notified)) = previous else {
        return Ok(None);
    };
    let passport = Expiry::rearm(
        Expiry::new(passport_date, passport_notified),
        fields.passport_expiration_date,
    );
    let license = Expiry::rearm(
        Expiry::new(license_date, license_notified),
        fields.license_expiration_date,
    );

    let query = r"
        UPDATE identities
        SET full_name = $3,
            passport_number = $4, passport_expiration_date = $5, passport_notified = $6,
            license_number = $7, license_expiration_date = $8, license_notified = $9,
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, full_name,
                  passport_number, passport_expiration_date, passport_notified,
                  license_number, license_expiration_date, license_notified,
                  created_at, updated_at
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let mut identity = sqlx::query_as::<_, Identity>(query)
        .bind(id)
        .bind(user_id)
        .bind(fields.full_name)
        .bind(fields.passport_number)
        .bind(passport.date)
        .bind(passport.notified)
        .bind(fields.license_number)
        .bind(license.date)
        .bind(license.notified)
        .fetch_one(&mut *tx)
        .instrument(span)
        .await?;

    let notices = notify_identity(&mut tx, &mut identity, clock).await?;
    tx.commit().await?;
    Ok(Some((identity, notices)))
}

async fn notify_identity(
    tx: &mut Transaction<'_, Postgres>,
    identity: &mut Identity,
    clock: ExpirationClock,
) -> Result<Vec<Notice>, sqlx::Error> {
    let notices = identity.check_expirations(clock.today, clock.window_days);
    if notices.is_empty() {
        return Ok(notices);
    }
    for notice in &notices {
        NotificationRepo::create(tx, identity.user_id, &notice.message).await?;
    }
    let query =
        "UPDATE identities SET passport_notified = $2, license_notified = $3 WHERE id = $1";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(identity.id)
        .bind(identity.passport.notified)
        .bind(identity.license.notified)
        .execute(&mut **tx)
        .instrument(span)
        .await?;
    Ok(notices)
}

// Secure notes

pub(super) async fn list_notes(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<SecureNote>, sqlx::Error> {
    let query = r"
        SELECT id, user_id, title, content, created_at, updated_at
        FROM secure_notes
        WHERE user_id = $1
        ORDER BY updated_at DESC
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    sqlx::query_as::<_, SecureNote>(query)
        .bind(user_id)
        .fetch_all(pool)
        .instrument(span)
        .await
}

pub(super) async fn find_note(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<Option<SecureNote>, sqlx::Error> {
    let query = r"
        SELECT id, user_id, title, content, created_at, updated_at
        FROM secure_notes
        WHERE id = $1 AND user_id = $2
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    sqlx::query_as::<_, SecureNote>(query)
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
}

pub(super) async fn insert_note(
    pool: &PgPool,
    user_id: Uuid,
    title: &str,
    content: &str,
) -> Result<SecureNote, sqlx::Error> {
    let query = r"
        INSERT INTO secure_notes (user_id, title, content)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, title, content, created_at, updated_at
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    sqlx::query_as::<_, SecureNote>(query)
        .bind(user_id)
        .bind(title)
        .bind(content)
        .fetch_one(pool)
        .instrument(span)
        .await
}

pub(super) async fn update_note(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    title: &str,
    content: &str,
) -> Result<Option<SecureNote>, sqlx::Error> {
    let query = r"
        UPDATE secure_notes
        SET title = $3, content = $4, updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, title, content, created_at, updated_at
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query_as::<_, SecureNote>(query)
        .bind(id)
        .bind(user_id)
        .bind(title)
        .bind(content)
        .fetch_optional(pool)
        .instrument(span)
        .await
}

/// Tables holding plain records that are deleted by id and owner.
#[derive(Clone, Copy, Debug)]
pub(super) enum RecordTable {
    Logins,
    CreditCards,
    Identities,
    SecureNotes,
}

impl RecordTable {
    const fn delete_query(self) -> &'static str {
        match self {
            Self::Logins => "DELETE FROM logins WHERE id = $1 AND user_id = $2",
            Self::CreditCards => "DELETE FROM credit_cards WHERE id = $1 AND user_id = $2",
            Self::Identities => "DELETE FROM identities WHERE id = $1 AND user_id = $2",
            Self::SecureNotes => "DELETE FROM secure_notes WHERE id = $1 AND user_id = $2",
        }
    }
}

/// True when a row was deleted.
pub(super) async fn delete_record(
    pool: &PgPool,
    table: RecordTable,
    user_id: Uuid,
    id: Uuid,
) -> Result<bool, sqlx::Error> {
    let query = table.delete_query();
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .instrument(span)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn errors_map_to_status() -> anyhow::Result<()> {
        assert_eq!(
            VaultError::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            VaultError::Database(sqlx::Error::RowNotFound)
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            VaultError::Cipher(CipherError::Decrypt)
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let response =
            VaultError::Conflict("This password already exists in your vault!").into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        assert_eq!(&body[..], b"This password already exists in your vault!");
        Ok(())
    }

    #[test]
    fn delete_queries_are_owner_scoped() {
        for table in [
            RecordTable::Logins,
            RecordTable::CreditCards,
            RecordTable::Identities,
            RecordTable::SecureNotes,
        ] {
            assert!(table.delete_query().ends_with("WHERE id = $1 AND user_id = $2"));
        }
    }
}
