use crate::auth::password;
use crate::cli::actions::Action;
use crate::store::{self, users, users::CreateUserOutcome};
use anyhow::{anyhow, Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;

/// Handle the create-admin action
pub async fn handle(action: Action) -> Result<()> {
    let Action::CreateAdmin {
        dsn,
        username,
        password,
    } = action
    else {
        return Err(anyhow!("not a create-admin action"));
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    store::migrate(&pool).await?;

    let password_hash = password::hash_password(&password)?;
    match users::create_user(&pool, &username, &password_hash, true).await? {
        CreateUserOutcome::Created(user) => {
            info!("Admin user '{}' created (id {})", user.username, user.id);
            Ok(())
        }
        CreateUserOutcome::DuplicateUsername => {
            Err(anyhow!("user '{username}' already exists"))
        }
    }
}
