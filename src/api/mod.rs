#[allow(unused_imports)]
use crate::{
    api::handlers::{
        admin,
        admin::{
            __path_admin_delete_user, __path_admin_list_notes, __path_admin_list_users,
            __path_admin_login, __path_admin_logout, __path_admin_stats,
        },
        health,
        health::__path_health,
        notes,
        notes::{
            __path_create_note, __path_delete_note, __path_get_note, __path_list_notes,
            __path_update_note,
        },
        register,
        register::__path_register,
        token,
        token::__path_token,
    },
    auth::AuthState,
    cli::{commands::DEFAULT_SECRET, globals::GlobalArgs},
    store,
};
use anyhow::{anyhow, Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, Request,
    },
    routing::{delete, get, post},
    Extension, Json, Router,
};
use secrecy::ExposeSecret;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, warn, Span};
use ulid::Ulid;
use url::Url;
use utoipa::OpenApi;

pub mod error;
pub mod handlers;

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        register,
        token,
        create_note,
        list_notes,
        get_note,
        update_note,
        delete_note,
        admin_login,
        admin_logout,
        admin_stats,
        admin_list_users,
        admin_delete_user,
        admin_list_notes
    ),
    components(schemas(
        handlers::TokenResponse,
        error::ErrorDetail,
        health::Health,
        register::UserRegister,
        token::TokenRequest,
        notes::NoteIn,
        notes::DeleteResponse,
        admin::AdminLoginRequest,
        admin::AdminLoginResponse,
        admin::StatsResponse,
        store::notes::NoteRecord,
        store::notes::AdminNoteRecord,
        store::users::UserSummary,
    )),
    tags(
        (name = "appunti", description = "Multi-user notes API"),
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Build the application router with all routes and shared state attached.
#[must_use]
pub fn router(pool: SqlitePool, auth_state: AuthState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(health::root))
        .route("/openapi.json", get(|| async { Json(openapi()) }))
        .route("/register", post(register::register))
        .route("/token", post(token::token))
        .route("/notes", get(notes::list_notes).post(notes::create_note))
        .route(
            "/notes/:note_id",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        )
        .route("/admin/login", post(admin::admin_login))
        .route("/admin/logout", post(admin::admin_logout))
        .route("/admin/api/stats", get(admin::admin_stats))
        .route("/admin/api/users", get(admin::admin_list_users))
        .route("/admin/api/users/:user_id", delete(admin::admin_delete_user))
        .route("/admin/api/notes", get(admin::admin_list_notes))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(auth_state))
                .layer(Extension(pool.clone())),
        )
        .route("/health", get(health::health).options(health::health))
        .layer(Extension(pool))
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, dsn: String, globals: &GlobalArgs) -> Result<()> {
    if globals.secret.expose_secret() == DEFAULT_SECRET {
        warn!("Running with the built-in token secret, tokens are forgeable");
    }

    let pool = SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    store::migrate(&pool).await?;

    let cors = cors_layer(&globals.origins)?;
    let auth_state = AuthState::from_globals(globals);
    let app = router(pool, auth_state, cors);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

/// Credentialed CORS for the configured browser origins. Cookies only flow
/// cross-origin when the origin list is exact, never a wildcard.
fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let mut values = Vec::with_capacity(origins.len());
    for origin in origins {
        values.push(parse_origin(origin)?);
    }

    Ok(CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_origin(AllowOrigin::list(values))
        .allow_credentials(true))
}

fn parse_origin(origin: &str) -> Result<HeaderValue> {
    let parsed = Url::parse(origin).with_context(|| format!("Invalid origin: {origin}"))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| anyhow!("Origin must include a valid host: {origin}"))?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let normalized = format!("{}://{}{}", parsed.scheme(), host, port);
    HeaderValue::from_str(&normalized).context("Failed to build origin header")
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_normalize_to_scheme_host_port() -> Result<()> {
        assert_eq!(parse_origin("http://localhost:3000")?, "http://localhost:3000");
        assert_eq!(
            parse_origin("https://notes.example.com/ignored/path")?,
            "https://notes.example.com"
        );
        assert!(parse_origin("not a url").is_err());
        Ok(())
    }

    #[test]
    fn openapi_document_lists_routes() {
        let doc = openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/register"));
        assert!(paths.contains_key("/token"));
        assert!(paths.contains_key("/notes"));
        assert!(paths.contains_key("/notes/{note_id}"));
        assert!(paths.contains_key("/admin/api/users/{user_id}"));
    }
}
