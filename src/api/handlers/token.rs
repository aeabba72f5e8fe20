use crate::api::error::{ApiError, ErrorDetail};
use crate::api::handlers::{normalize_username, TokenResponse};
use crate::auth::{password, AuthState};
use crate::store::users;
use axum::{extract::Extension, Form, Json};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[utoipa::path(
    post,
    path = "/token",
    request_body(content = TokenRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Credentials accepted, token issued", body = TokenResponse),
        (status = 401, description = "Unknown user or wrong password", body = ErrorDetail)
    ),
    tag = "auth"
)]
pub async fn token(
    pool: Extension<SqlitePool>,
    auth_state: Extension<AuthState>,
    payload: Option<Form<TokenRequest>>,
) -> Result<Json<TokenResponse>, ApiError> {
    let request: TokenRequest = match payload {
        Some(Form(payload)) => payload,
        None => return Err(ApiError::Validation("Missing payload".to_string())),
    };

    let username = normalize_username(&request.username);

    // Unknown user and wrong password answer identically so the endpoint
    // cannot be used to probe which usernames exist.
    let Some(user) = users::find_by_username(&pool, &username).await? else {
        return Err(incorrect_credentials());
    };

    if !password::verify_password(&request.password, &user.password_hash) {
        return Err(incorrect_credentials());
    }

    info!("User '{}' logged in", user.username);

    let token = auth_state.signer().issue(&user.username)?;
    Ok(Json(TokenResponse::bearer(token)))
}

fn incorrect_credentials() -> ApiError {
    ApiError::Authentication("Incorrect username or password".to_string())
}
