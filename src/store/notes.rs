//! Note rows and the queries that touch them.

use anyhow::{Context, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info_span, Instrument};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct NoteRecord {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub user_id: i64,
    pub created_at: String,
}

/// A note as listed in the admin API, with its owner's username joined in.
#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct AdminNoteRecord {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub user_id: i64,
    pub username: String,
    pub created_at: String,
}

/// # Errors
/// Returns an error on database failure.
pub async fn create_note(
    pool: &SqlitePool,
    user_id: i64,
    title: &str,
    content: &str,
) -> Result<NoteRecord> {
    let query = "INSERT INTO notes (title, content, user_id) VALUES (?, ?, ?) \
                 RETURNING id, title, content, user_id, created_at";

    let span = info_span!(
        "db.query",
        db.system = "sqlite",
        db.operation = "INSERT",
        db.statement = query
    );
    sqlx::query_as::<_, NoteRecord>(query)
        .bind(title)
        .bind(content)
        .bind(user_id)
        .fetch_one(pool)
        .instrument(span)
        .await
        .context("failed to insert note")
}

/// The owner's notes, newest first. Ties on the second-resolution timestamp
/// break on id, so insertion order is stable.
///
/// # Errors
/// Returns an error on database failure.
pub async fn list_for_owner(pool: &SqlitePool, user_id: i64) -> Result<Vec<NoteRecord>> {
    let query = "SELECT id, title, content, user_id, created_at FROM notes \
                 WHERE user_id = ? ORDER BY created_at DESC, id DESC";

    let span = info_span!(
        "db.query",
        db.system = "sqlite",
        db.operation = "SELECT",
        db.statement = query
    );
    sqlx::query_as::<_, NoteRecord>(query)
        .bind(user_id)
        .fetch_all(pool)
        .instrument(span)
        .await
        .context("failed to list notes")
}

/// Every note in the system with its owner, newest first. Admin-only view.
///
/// # Errors
/// Returns an error on database failure.
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<AdminNoteRecord>> {
    let query = "SELECT n.id, n.title, n.content, n.user_id, u.username, n.created_at \
                 FROM notes n JOIN users u ON u.id = n.user_id \
                 ORDER BY n.created_at DESC, n.id DESC";

    let span = info_span!(
        "db.query",
        db.system = "sqlite",
        db.operation = "SELECT",
        db.statement = query
    );
    sqlx::query_as::<_, AdminNoteRecord>(query)
        .fetch_all(pool)
        .instrument(span)
        .await
        .context("failed to list all notes")
}

/// # Errors
/// Returns an error on database failure.
pub async fn get_note(pool: &SqlitePool, id: i64) -> Result<Option<NoteRecord>> {
    let query = "SELECT id, title, content, user_id, created_at FROM notes WHERE id = ?";

    let span = info_span!(
        "db.query",
        db.system = "sqlite",
        db.operation = "SELECT",
        db.statement = query
    );
    sqlx::query_as::<_, NoteRecord>(query)
        .bind(id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to look up note")
}

/// Replace a note's title and content. Returns the updated row, or `None`
/// when the note no longer exists.
///
/// # Errors
/// Returns an error on database failure.
pub async fn update_note(
    pool: &SqlitePool,
    id: i64,
    title: &str,
    content: &str,
) -> Result<Option<NoteRecord>> {
    let query = "UPDATE notes SET title = ?, content = ? WHERE id = ? \
                 RETURNING id, title, content, user_id, created_at";

    let span = info_span!(
        "db.query",
        db.system = "sqlite",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query_as::<_, NoteRecord>(query)
        .bind(title)
        .bind(content)
        .bind(id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to update note")
}

/// Delete a note. Returns `false` when no such note exists.
///
/// # Errors
/// Returns an error on database failure.
pub async fn delete_note(pool: &SqlitePool, id: i64) -> Result<bool> {
    let query = "DELETE FROM notes WHERE id = ?";

    let span = info_span!(
        "db.query",
        db.system = "sqlite",
        db.operation = "DELETE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(id)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to delete note")?;

    Ok(result.rows_affected() > 0)
}

/// # Errors
/// Returns an error on database failure.
pub async fn count_notes(pool: &SqlitePool) -> Result<i64> {
    let query = "SELECT COUNT(*) FROM notes";

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
        .context("failed to count notes")
}
