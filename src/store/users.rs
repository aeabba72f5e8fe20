//! User rows and the queries that touch them.

use anyhow::{Context, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info_span, Instrument};
use utoipa::ToSchema;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// A user as listed in the admin API, with the size of their notebook.
#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
    pub note_count: i64,
}

#[derive(Debug)]
pub enum CreateUserOutcome {
    Created(UserRecord),
    DuplicateUsername,
}

/// Insert a user. Uniqueness is enforced by the database, not by a
/// read-then-write check, so concurrent registrations cannot race.
///
/// # Errors
/// Returns an error on any database failure other than a username collision.
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    password_hash: &str,
    is_admin: bool,
) -> Result<CreateUserOutcome> {
    let query = "INSERT INTO users (username, password_hash, is_admin) VALUES (?, ?, ?) \
                 RETURNING id, username, password_hash, is_admin";

    let span = info_span!(
        "db.query",
        db.system = "sqlite",
        db.operation = "INSERT",
        db.statement = query
    );
    match sqlx::query_as::<_, UserRecord>(query)
        .bind(username)
        .bind(password_hash)
        .bind(is_admin)
        .fetch_one(pool)
        .instrument(span)
        .await
    {
        Ok(user) => Ok(CreateUserOutcome::Created(user)),
        Err(error) if super::is_unique_violation(&error) => {
            Ok(CreateUserOutcome::DuplicateUsername)
        }
        Err(error) => Err(error).context("failed to insert user"),
    }
}

/// # Errors
/// Returns an error on database failure.
pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<UserRecord>> {
    let query = "SELECT id, username, password_hash, is_admin FROM users WHERE username = ?";

    let span = info_span!(
        "db.query",
        db.system = "sqlite",
        db.operation = "SELECT",
        db.statement = query
    );
    sqlx::query_as::<_, UserRecord>(query)
        .bind(username)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to look up user by username")
}

/// # Errors
/// Returns an error on database failure.
pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<UserRecord>> {
    let query = "SELECT id, username, password_hash, is_admin FROM users WHERE id = ?";

    let span = info_span!(
        "db.query",
        db.system = "sqlite",
        db.operation = "SELECT",
        db.statement = query
    );
    sqlx::query_as::<_, UserRecord>(query)
        .bind(id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to look up user by id")
}

/// All users with their note counts, oldest account first.
///
/// # Errors
/// Returns an error on database failure.
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<UserSummary>> {
    let query = "SELECT u.id, u.username, u.is_admin, COUNT(n.id) AS note_count \
                 FROM users u LEFT JOIN notes n ON n.user_id = u.id \
                 GROUP BY u.id ORDER BY u.id";

    let span = info_span!(
        "db.query",
        db.system = "sqlite",
        db.operation = "SELECT",
        db.statement = query
    );
    sqlx::query_as::<_, UserSummary>(query)
        .fetch_all(pool)
        .instrument(span)
        .await
        .context("failed to list users")
}

/// Delete a user and every note they own, atomically. Returns `false` when
/// no such user exists.
///
/// # Errors
/// Returns an error on database failure; the transaction rolls back.
pub async fn delete_user(pool: &SqlitePool, id: i64) -> Result<bool> {
    let mut tx = pool
        .begin()
        .await
        .context("failed to begin delete transaction")?;

    let notes_query = "DELETE FROM notes WHERE user_id = ?";
    let span = info_span!(
        "db.query",
        db.system = "sqlite",
        db.operation = "DELETE",
        db.statement = notes_query
    );
    sqlx::query(notes_query)
        .bind(id)
        .execute(&mut *tx)
        .instrument(span)
        .await
        .context("failed to delete user's notes")?;

    let users_query = "DELETE FROM users WHERE id = ?";
    let span = info_span!(
        "db.query",
        db.system = "sqlite",
        db.operation = "DELETE",
        db.statement = users_query
    );
    let result = sqlx::query(users_query)
        .bind(id)
        .execute(&mut *tx)
        .instrument(span)
        .await
        .context("failed to delete user")?;

    tx.commit()
        .await
        .context("failed to commit delete transaction")?;

    Ok(result.rows_affected() > 0)
}

/// # Errors
/// Returns an error on database failure.
pub async fn count_users(pool: &SqlitePool) -> Result<i64> {
    count(pool, "SELECT COUNT(*) FROM users").await
}

/// # Errors
/// Returns an error on database failure.
pub async fn count_admins(pool: &SqlitePool) -> Result<i64> {
    count(pool, "SELECT COUNT(*) FROM users WHERE is_admin = 1").await
}

async fn count(pool: &SqlitePool, query: &str) -> Result<i64> {
    let span = info_span!(
        "db.query",
        db.system = "sqlite",
        db.operation = "SELECT",
        db.statement = query
    );
    sqlx::query_scalar::<_, i64>(query)
        .fetch_one(pool)
        .instrument(span)
        .await
        .context("failed to count rows")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{notes, testing::memory_pool};

    async fn created(pool: &SqlitePool, username: &str, is_admin: bool) -> Result<UserRecord> {
        match create_user(pool, username, "$2b$12$hash", is_admin).await? {
            CreateUserOutcome::Created(user) => Ok(user),
            CreateUserOutcome::DuplicateUsername => {
                Err(anyhow::anyhow!("unexpected duplicate for {username}"))
            }
        }
    }

    #[tokio::test]
    async fn create_and_find() -> Result<()> {
        let pool = memory_pool().await?;
        let user = created(&pool, "alice", false).await?;
        assert_eq!(user.username, "alice");
        assert!(!user.is_admin);

        let found = find_by_username(&pool, "alice").await?;
        assert_eq!(found.map(|u| u.id), Some(user.id));

        let found = find_by_id(&pool, user.id).await?;
        assert_eq!(found.map(|u| u.username), Some("alice".to_string()));

        assert!(find_by_username(&pool, "nobody").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_username_reported_not_errored() -> Result<()> {
        let pool = memory_pool().await?;
        created(&pool, "alice", false).await?;

        let outcome = create_user(&pool, "alice", "$2b$12$other", false).await?;
        assert!(matches!(outcome, CreateUserOutcome::DuplicateUsername));
        Ok(())
    }

    #[tokio::test]
    async fn list_users_with_note_counts() -> Result<()> {
        let pool = memory_pool().await?;
        let alice = created(&pool, "alice", false).await?;
        let admin = created(&pool, "admin", true).await?;

        notes::create_note(&pool, alice.id, "one", "1").await?;
        notes::create_note(&pool, alice.id, "two", "2").await?;

        let summaries = list_users(&pool).await?;
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].username, "alice");
        assert_eq!(summaries[0].note_count, 2);
        assert_eq!(summaries[1].id, admin.id);
        assert_eq!(summaries[1].note_count, 0);
        assert!(summaries[1].is_admin);
        Ok(())
    }

    #[tokio::test]
    async fn delete_user_cascades_notes() -> Result<()> {
        let pool = memory_pool().await?;
        let alice = created(&pool, "alice", false).await?;
        let bob = created(&pool, "bob", false).await?;
        notes::create_note(&pool, alice.id, "hers", "x").await?;
        notes::create_note(&pool, bob.id, "his", "y").await?;

        assert!(delete_user(&pool, alice.id).await?);
        assert!(find_by_id(&pool, alice.id).await?.is_none());
        assert_eq!(notes::count_notes(&pool).await?, 1);

        // Unknown id is not an error, just a no-op.
        assert!(!delete_user(&pool, 9999).await?);
        Ok(())
    }

    #[tokio::test]
    async fn counts() -> Result<()> {
        let pool = memory_pool().await?;
        created(&pool, "alice", false).await?;
        created(&pool, "admin", true).await?;

        assert_eq!(count_users(&pool).await?, 2);
        assert_eq!(count_admins(&pool).await?, 1);
        Ok(())
    }
}
