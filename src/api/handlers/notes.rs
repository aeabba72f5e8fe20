use crate::api::error::{ApiError, ErrorDetail};
use crate::auth::{session, AuthState};
use crate::store::notes::{self as notes_db, NoteRecord};
use crate::store::users::UserRecord;
use axum::{
    extract::{Extension, Path},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub message: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NoteIn {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

fn validate_title(title: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::Validation("Title cannot be empty".to_string()));
    }
    Ok(())
}

/// Load a note and enforce the owner-or-admin rule. Foreign notes answer
/// 403, absent notes 404; the two cases stay distinguishable.
async fn load_accessible_note(
    pool: &SqlitePool,
    user: &UserRecord,
    note_id: i64,
) -> Result<NoteRecord, ApiError> {
    let Some(note) = notes_db::get_note(pool, note_id).await? else {
        return Err(ApiError::NotFound("Note not found".to_string()));
    };

    if !session::can_access(user, &note) {
        return Err(ApiError::Forbidden(
            "Not authorized to access this note".to_string(),
        ));
    }

    Ok(note)
}

#[utoipa::path(
    post,
    path = "/notes",
    request_body = NoteIn,
    responses(
        (status = 200, description = "Note created", body = NoteRecord),
        (status = 400, description = "Empty title", body = ErrorDetail),
        (status = 401, description = "Not authenticated", body = ErrorDetail)
    ),
    tag = "notes"
)]
pub async fn create_note(
    pool: Extension<SqlitePool>,
    auth_state: Extension<AuthState>,
    headers: HeaderMap,
    payload: Option<Json<NoteIn>>,
) -> Result<Json<NoteRecord>, ApiError> {
    let user = session::authenticate(&headers, &pool, &auth_state).await?;

    let note: NoteIn = match payload {
        Some(Json(payload)) => payload,
        None => return Err(ApiError::Validation("Missing payload".to_string())),
    };

    validate_title(&note.title)?;

    let created = notes_db::create_note(&pool, user.id, &note.title, &note.content).await?;
    Ok(Json(created))
}

#[utoipa::path(
    get,
    path = "/notes",
    responses(
        (status = 200, description = "The caller's notes, newest first", body = [NoteRecord]),
        (status = 401, description = "Not authenticated", body = ErrorDetail)
    ),
    tag = "notes"
)]
pub async fn list_notes(
    pool: Extension<SqlitePool>,
    auth_state: Extension<AuthState>,
    headers: HeaderMap,
) -> Result<Json<Vec<NoteRecord>>, ApiError> {
    let user = session::authenticate(&headers, &pool, &auth_state).await?;

    let notes = notes_db::list_for_owner(&pool, user.id).await?;
    Ok(Json(notes))
}

#[utoipa::path(
    get,
    path = "/notes/{note_id}",
    params(("note_id" = i64, Path, description = "Note id")),
    responses(
        (status = 200, description = "The note", body = NoteRecord),
        (status = 401, description = "Not authenticated", body = ErrorDetail),
        (status = 403, description = "Someone else's note", body = ErrorDetail),
        (status = 404, description = "No such note", body = ErrorDetail)
    ),
    tag = "notes"
)]
pub async fn get_note(
    pool: Extension<SqlitePool>,
    auth_state: Extension<AuthState>,
    headers: HeaderMap,
    Path(note_id): Path<i64>,
) -> Result<Json<NoteRecord>, ApiError> {
    let user = session::authenticate(&headers, &pool, &auth_state).await?;

    let note = load_accessible_note(&pool, &user, note_id).await?;
    Ok(Json(note))
}

#[utoipa::path(
    put,
    path = "/notes/{note_id}",
    params(("note_id" = i64, Path, description = "Note id")),
    request_body = NoteIn,
    responses(
        (status = 200, description = "Updated note", body = NoteRecord),
        (status = 400, description = "Empty title", body = ErrorDetail),
        (status = 401, description = "Not authenticated", body = ErrorDetail),
        (status = 403, description = "Someone else's note", body = ErrorDetail),
        (status = 404, description = "No such note", body = ErrorDetail)
    ),
    tag = "notes"
)]
pub async fn update_note(
    pool: Extension<SqlitePool>,
    auth_state: Extension<AuthState>,
    headers: HeaderMap,
    Path(note_id): Path<i64>,
    payload: Option<Json<NoteIn>>,
) -> Result<Json<NoteRecord>, ApiError> {
    let user = session::authenticate(&headers, &pool, &auth_state).await?;

    let note: NoteIn = match payload {
        Some(Json(payload)) => payload,
        None => return Err(ApiError::Validation("Missing payload".to_string())),
    };

    validate_title(&note.title)?;
    load_accessible_note(&pool, &user, note_id).await?;

    match notes_db::update_note(&pool, note_id, &note.title, &note.content).await? {
        Some(updated) => Ok(Json(updated)),
        None => Err(ApiError::NotFound("Note not found".to_string())),
    }
}

#[utoipa::path(
    delete,
    path = "/notes/{note_id}",
    params(("note_id" = i64, Path, description = "Note id")),
    responses(
        (status = 200, description = "Note deleted", body = DeleteResponse),
        (status = 401, description = "Not authenticated", body = ErrorDetail),
        (status = 403, description = "Someone else's note", body = ErrorDetail),
        (status = 404, description = "No such note", body = ErrorDetail)
    ),
    tag = "notes"
)]
pub async fn delete_note(
    pool: Extension<SqlitePool>,
    auth_state: Extension<AuthState>,
    headers: HeaderMap,
    Path(note_id): Path<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let user = session::authenticate(&headers, &pool, &auth_state).await?;

    load_accessible_note(&pool, &user, note_id).await?;
    notes_db::delete_note(&pool, note_id).await?;

    info!("Note {note_id} deleted by '{}'", user.username);

    Ok(Json(DeleteResponse {
        message: "Note deleted".to_string(),
    }))
}
