//! SQLite persistence: schema migration and per-table query modules.

pub mod notes;
pub mod users;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{debug, info_span, Instrument};

const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

/// Apply the schema. Every statement is `IF NOT EXISTS`, so running this on
/// an already-migrated database is a no-op.
///
/// # Errors
/// Returns an error when a schema statement fails to execute.
pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA_SQL.split(';') {
        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }

        let span = info_span!(
            "db.query",
            db.system = "sqlite",
            db.operation = "DDL",
            db.statement = statement
        );
        sqlx::query(statement)
            .execute(pool)
            .instrument(span)
            .await
            .context("failed to apply database schema")?;
    }

    debug!("Database schema up to date");

    Ok(())
}

/// Whether an sqlx error is a UNIQUE constraint violation.
#[must_use]
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}
