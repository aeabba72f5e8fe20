use crate::api::error::{ApiError, ErrorDetail};
use crate::api::handlers::{normalize_username, valid_username, TokenResponse, PASSWORD_MIN_LENGTH};
use crate::auth::{password, AuthState};
use crate::store::users::{self, CreateUserOutcome};
use axum::{extract::Extension, Json};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UserRegister {
    pub username: String,
    pub password: String,
}

#[utoipa::path(
    post,
    path = "/register",
    request_body = UserRegister,
    responses(
        (status = 200, description = "Account created, token issued", body = TokenResponse),
        (status = 400, description = "Invalid username, empty password or username taken", body = ErrorDetail)
    ),
    tag = "auth"
)]
pub async fn register(
    pool: Extension<SqlitePool>,
    auth_state: Extension<AuthState>,
    payload: Option<Json<UserRegister>>,
) -> Result<Json<TokenResponse>, ApiError> {
    let request: UserRegister = match payload {
        Some(Json(payload)) => payload,
        None => return Err(ApiError::Validation("Missing payload".to_string())),
    };

    let username = normalize_username(&request.username);
    if !valid_username(&username) {
        return Err(ApiError::Validation("Invalid username".to_string()));
    }

    if request.password.len() < PASSWORD_MIN_LENGTH {
        return Err(ApiError::Validation(
            "Password cannot be empty".to_string(),
        ));
    }

    let password_hash = password::hash_password(&request.password)?;

    match users::create_user(&pool, &username, &password_hash, false).await? {
        CreateUserOutcome::Created(user) => {
            info!("User '{}' registered", user.username);

            let token = auth_state.signer().issue(&user.username)?;
            Ok(Json(TokenResponse::bearer(token)))
        }
        CreateUserOutcome::DuplicateUsername => Err(ApiError::Validation(
            "Username already registered".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::test_support::{auth_state, body_json, insert_user};
    use crate::store::testing::memory_pool;
    use anyhow::Result;
    use axum::{
        body::Body,
        http::{header::CONTENT_TYPE, Request, StatusCode},
        routing::post,
        Router,
    };
    use tower::ServiceExt;

    fn app(pool: SqlitePool) -> Router {
        Router::new()
            .route("/register", post(register))
            .layer(Extension(pool))
            .layer(Extension(auth_state()))
    }

    fn register_request(body: &serde_json::Value) -> Result<Request<Body>> {
        Ok(Request::builder()
            .method("POST")
            .uri("/register")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))?)
    }

    #[tokio::test]
    async fn register_returns_usable_token() -> Result<()> {
        let pool = memory_pool().await?;
        let response = app(pool)
            .oneshot(register_request(&serde_json::json!({
                "username": "alice",
                "password": "wonderland"
            }))?)
            .await?;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await?;
        assert_eq!(body["token_type"], "bearer");

        let token = body["access_token"].as_str().unwrap();
        let claims = auth_state().signer().verify(token)?;
        assert_eq!(claims.sub, "alice");
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_username_rejected() -> Result<()> {
        let pool = memory_pool().await?;
        insert_user(&pool, "alice", "wonderland", false).await?;

        let response = app(pool)
            .oneshot(register_request(&serde_json::json!({
                "username": "alice",
                "password": "other"
            }))?)
            .await?;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await?;
        assert_eq!(body["detail"], "Username already registered");
        Ok(())
    }

    #[tokio::test]
    async fn invalid_username_and_empty_password_rejected() -> Result<()> {
        let pool = memory_pool().await?;

        let response = app(pool.clone())
            .oneshot(register_request(&serde_json::json!({
                "username": "has space",
                "password": "pw"
            }))?)
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app(pool)
            .oneshot(register_request(&serde_json::json!({
                "username": "alice",
                "password": ""
            }))?)
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await?;
        assert_eq!(body["detail"], "Password cannot be empty");
        Ok(())
    }

    #[tokio::test]
    async fn username_is_trimmed_before_storage() -> Result<()> {
        let pool = memory_pool().await?;
        let response = app(pool.clone())
            .oneshot(register_request(&serde_json::json!({
                "username": "  alice  ",
                "password": "pw"
            }))?)
            .await?;
        assert_eq!(response.status(), StatusCode::OK);

        let stored = crate::store::users::find_by_username(&pool, "alice").await?;
        assert!(stored.is_some());
        Ok(())
    }
}
