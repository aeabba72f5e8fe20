//! Admin surface: cookie login for the dashboard, plus the JSON API
//! behind it. Every `/admin/api` route re-checks the admin flag; holding
//! a valid token is not enough.

use crate::api::error::{ApiError, ErrorDetail};
use crate::api::handlers::normalize_username;
use crate::auth::{password, session, AuthState};
use crate::store::notes::{self as notes_db, AdminNoteRecord};
use crate::store::users::{self, UserSummary};
use axum::{
    extract::{Extension, Path},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse},
    Form, Json,
};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdminLoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminLoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub redirect: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub total_users: i64,
    pub total_notes: i64,
    pub admin_users: i64,
}

#[utoipa::path(
    post,
    path = "/admin/login",
    request_body(content = AdminLoginRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Session cookie set, token returned", body = AdminLoginResponse),
        (status = 401, description = "Unknown user or wrong password", body = ErrorDetail),
        (status = 403, description = "Valid credentials but not an admin", body = ErrorDetail)
    ),
    tag = "admin"
)]
pub async fn admin_login(
    pool: Extension<SqlitePool>,
    auth_state: Extension<AuthState>,
    payload: Option<Form<AdminLoginRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let request: AdminLoginRequest = match payload {
        Some(Form(payload)) => payload,
        None => return Err(ApiError::Validation("Missing payload".to_string())),
    };

    let username = normalize_username(&request.username);

    let Some(user) = users::find_by_username(&pool, &username).await? else {
        return Err(ApiError::Authentication(
            "Incorrect username or password".to_string(),
        ));
    };

    if !password::verify_password(&request.password, &user.password_hash) {
        return Err(ApiError::Authentication(
            "Incorrect username or password".to_string(),
        ));
    }

    session::require_admin(&user)?;

    info!("Admin '{}' logged in", user.username);

    let token = auth_state.signer().issue(&user.username)?;
    let cookie =
        session::session_cookie(&auth_state, &token).context("Failed to build session cookie")?;

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(AdminLoginResponse {
            access_token: token,
            token_type: "bearer".to_string(),
            redirect: "/admin/dashboard".to_string(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/admin/logout",
    responses(
        (status = 204, description = "Session cookie cleared")
    ),
    tag = "admin"
)]
pub async fn admin_logout(
    auth_state: Extension<AuthState>,
) -> Result<impl IntoResponse, ApiError> {
    let cookie =
        session::clear_session_cookie(&auth_state).context("Failed to build session cookie")?;

    Ok((
        StatusCode::NO_CONTENT,
        AppendHeaders([(SET_COOKIE, cookie)]),
    ))
}

#[utoipa::path(
    get,
    path = "/admin/api/stats",
    responses(
        (status = 200, description = "System-wide counters", body = StatsResponse),
        (status = 401, description = "Not authenticated", body = ErrorDetail),
        (status = 403, description = "Not an admin", body = ErrorDetail)
    ),
    tag = "admin"
)]
pub async fn admin_stats(
    pool: Extension<SqlitePool>,
    auth_state: Extension<AuthState>,
    headers: HeaderMap,
) -> Result<Json<StatsResponse>, ApiError> {
    let user = session::authenticate(&headers, &pool, &auth_state).await?;
    session::require_admin(&user)?;

    Ok(Json(StatsResponse {
        total_users: users::count_users(&pool).await?,
        total_notes: notes_db::count_notes(&pool).await?,
        admin_users: users::count_admins(&pool).await?,
    }))
}

#[utoipa::path(
    get,
    path = "/admin/api/users",
    responses(
        (status = 200, description = "All users with note counts", body = [UserSummary]),
        (status = 401, description = "Not authenticated", body = ErrorDetail),
        (status = 403, description = "Not an admin", body = ErrorDetail)
    ),
    tag = "admin"
)]
pub async fn admin_list_users(
    pool: Extension<SqlitePool>,
    auth_state: Extension<AuthState>,
    headers: HeaderMap,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let user = session::authenticate(&headers, &pool, &auth_state).await?;
    session::require_admin(&user)?;

    Ok(Json(users::list_users(&pool).await?))
}

#[utoipa::path(
    get,
    path = "/admin/api/notes",
    responses(
        (status = 200, description = "Every note with its owner", body = [AdminNoteRecord]),
        (status = 401, description = "Not authenticated", body = ErrorDetail),
        (status = 403, description = "Not an admin", body = ErrorDetail)
    ),
    tag = "admin"
)]
pub async fn admin_list_notes(
    pool: Extension<SqlitePool>,
    auth_state: Extension<AuthState>,
    headers: HeaderMap,
) -> Result<Json<Vec<AdminNoteRecord>>, ApiError> {
    let user = session::authenticate(&headers, &pool, &auth_state).await?;
    session::require_admin(&user)?;

    Ok(Json(notes_db::list_all(&pool).await?))
}

#[utoipa::path(
    delete,
    path = "/admin/api/users/{user_id}",
    params(("user_id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User and their notes deleted"),
        (status = 400, description = "Admin tried to delete their own account", body = ErrorDetail),
        (status = 401, description = "Not authenticated", body = ErrorDetail),
        (status = 403, description = "Not an admin", body = ErrorDetail),
        (status = 404, description = "No such user", body = ErrorDetail)
    ),
    tag = "admin"
)]
pub async fn admin_delete_user(
    pool: Extension<SqlitePool>,
    auth_state: Extension<AuthState>,
    headers: HeaderMap,
    Path(user_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = session::authenticate(&headers, &pool, &auth_state).await?;
    session::require_admin(&user)?;

    if user.id == user_id {
        return Err(ApiError::Validation(
            "Cannot delete your own account".to_string(),
        ));
    }

    if users::find_by_id(&pool, user_id).await?.is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    users::delete_user(&pool, user_id).await?;

    info!("User {user_id} deleted by admin '{}'", user.username);

    Ok(Json(serde_json::json!({ "message": "User deleted" })))
}
