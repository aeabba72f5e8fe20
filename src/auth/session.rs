//! Credential resolution and access checks.
//!
//! Two transports carry the same signed token: the `Authorization: Bearer`
//! header (API clients) and the `appunti_session` cookie (browser admin
//! sessions). The header is tried first; an absent or invalid header falls
//! back to the cookie.

use axum::http::{
    header::{InvalidHeaderValue, AUTHORIZATION, COOKIE},
    HeaderMap, HeaderValue,
};
use sqlx::SqlitePool;

use crate::api::error::ApiError;
use crate::auth::{AuthState, SESSION_COOKIE_NAME};
use crate::store::notes::NoteRecord;
use crate::store::users::{self, UserRecord};

/// Resolve the request's credentials to a user record.
///
/// # Errors
/// `ApiError::Authentication` when no credential is presented, when no
/// presented credential verifies, or when the verified subject no longer
/// exists (tokens of deleted users stop resolving here).
pub async fn authenticate(
    headers: &HeaderMap,
    pool: &SqlitePool,
    state: &AuthState,
) -> Result<UserRecord, ApiError> {
    let tokens = credential_sources(headers);
    if tokens.is_empty() {
        return Err(ApiError::Authentication("Not authenticated".to_string()));
    }

    let Some(claims) = tokens
        .iter()
        .find_map(|token| state.signer().verify(token).ok())
    else {
        return Err(ApiError::Authentication(
            "Invalid or expired token".to_string(),
        ));
    };

    match users::find_by_username(pool, &claims.sub).await? {
        Some(user) => Ok(user),
        None => Err(ApiError::Authentication(
            "Invalid or expired token".to_string(),
        )),
    }
}

/// Owner-or-admin rule: the only access rule for notes.
#[must_use]
pub fn can_access(user: &UserRecord, note: &NoteRecord) -> bool {
    note.user_id == user.id || user.is_admin
}

/// Gate for admin-only operations; a distinct 403, never a silent filter.
///
/// # Errors
/// `ApiError::Forbidden` when the user is not an administrator.
pub fn require_admin(user: &UserRecord) -> Result<(), ApiError> {
    if user.is_admin {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Admin privileges required".to_string(),
        ))
    }
}

/// Credential transports in resolution order: bearer header, then cookie.
fn credential_sources(headers: &HeaderMap) -> Vec<String> {
    let mut tokens = Vec::new();
    if let Some(token) = extract_bearer_token(headers) {
        tokens.push(token);
    }
    if let Some(token) = extract_cookie_token(headers) {
        tokens.push(token);
    }
    tokens
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

fn extract_cookie_token(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == SESSION_COOKIE_NAME && !val.is_empty() {
            return Some(val.to_string());
        }
    }
    None
}

/// Build the `HttpOnly` session cookie carrying the signed token.
///
/// # Errors
/// Returns an error if the token contains characters invalid in a header.
pub fn session_cookie(state: &AuthState, token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = state.signer().ttl_seconds();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    );
    if state.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Expire the session cookie immediately.
///
/// # Errors
/// Returns an error if the cookie string is not a valid header value.
pub fn clear_session_cookie(state: &AuthState) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if state.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}
