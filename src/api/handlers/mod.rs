//! HTTP request handlers.

pub mod admin;
pub mod health;
pub mod notes;
pub mod register;
pub mod token;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const USERNAME_MIN_LENGTH: usize = 1;
pub const USERNAME_MAX_LENGTH: usize = 32;
pub const PASSWORD_MIN_LENGTH: usize = 1;

/// The body returned wherever a token is issued.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    #[must_use]
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

pub(crate) fn normalize_username(username: &str) -> String {
    username.trim().to_string()
}

pub(crate) fn valid_username(username_normalized: &str) -> bool {
    let length = username_normalized.len();
    if !(USERNAME_MIN_LENGTH..=USERNAME_MAX_LENGTH).contains(&length) {
        return false;
    }
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*$").is_ok_and(|regex| regex.is_match(username_normalized))
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::auth::{password, token::TokenSigner, AuthState};
    use crate::store::users::{self, CreateUserOutcome, UserRecord};
    use anyhow::{anyhow, Result};
    use axum::{
        body::{to_bytes, Body},
        http::Response,
    };
    use sqlx::SqlitePool;

    pub const TEST_SECRET: &str = "test-secret";

    pub fn auth_state() -> AuthState {
        AuthState::new(TokenSigner::new(TEST_SECRET, 1800), false)
    }

    pub async fn insert_user(
        pool: &SqlitePool,
        username: &str,
        password_plain: &str,
        is_admin: bool,
    ) -> Result<UserRecord> {
        let hash = password::hash_password(password_plain)?;
        match users::create_user(pool, username, &hash, is_admin).await? {
            CreateUserOutcome::Created(user) => Ok(user),
            CreateUserOutcome::DuplicateUsername => Err(anyhow!("unexpected duplicate")),
        }
    }

    pub async fn body_json(response: Response<Body>) -> Result<serde_json::Value> {
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
