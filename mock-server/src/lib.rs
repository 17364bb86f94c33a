//! In-memory stand-in for the project features API.
//!
//! Sessions are looked up from the `sessionid` cookie and unsafe methods
//! must echo the `csrftoken` cookie in `X-CSRFToken`, the way the real
//! server's session authentication does. Error bodies use the same
//! `{"detail": ...}`, `{"error": ...}` and `{"field": [...]}` shapes.

mod handlers;
pub mod store;

use std::sync::Arc;

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub use store::{Comment, Note, Reminder, ReminderStatus, ShareLink, Store, User};

pub const API_PREFIX: &str = "/project-features/api";

pub type Db = Arc<RwLock<Store>>;

pub fn app(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    let api = Router::new()
        .route("/projects/{project_id}/share/", post(handlers::share_project))
        .route("/share-links/", get(handlers::list_share_links))
        .route("/share-links/{id}/", patch(handlers::update_share_link))
        .route("/notes/", get(handlers::list_notes).post(handlers::create_note))
        .route("/notes/{id}/", patch(handlers::update_note).delete(handlers::delete_note))
        .route("/comments/", get(handlers::list_comments).post(handlers::create_comment))
        .route(
            "/comments/{id}/",
            patch(handlers::update_comment).delete(handlers::delete_comment),
        )
        .route("/reminders/", get(handlers::list_reminders).post(handlers::create_reminder))
        .route(
            "/reminders/{id}/",
            patch(handlers::update_reminder).delete(handlers::delete_reminder),
        )
        .with_state(db);
    Router::new().nest(API_PREFIX, api)
}

pub async fn run(listener: TcpListener, store: Store) -> Result<(), std::io::Error> {
    axum::serve(listener, app(store)).await
}

/// An error response with a JSON body.
#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    body: Value,
}

impl ApiFailure {
    pub fn detail(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            body: json!({ "detail": message }),
        }
    }

    pub fn error(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            body: json!({ "error": message }),
        }
    }

    /// Field validation failure: `{"<field>": ["<message>"]}`.
    pub fn field(field: &str, message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: json!({ field: [message] }),
        }
    }

    pub fn not_found() -> Self {
        Self::detail(StatusCode::NOT_FOUND, "Not found.")
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Value of cookie `name` across all `Cookie` headers.
fn cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .map(str::trim)
        .find_map(|entry| entry.strip_prefix(name)?.strip_prefix('='))
        .map(str::to_string)
}

/// Signed-in user for a read request.
fn authenticate(store: &Store, headers: &HeaderMap) -> Result<User, ApiFailure> {
    cookie(headers, "sessionid")
        .and_then(|key| store.user_for_session(&key).cloned())
        .ok_or_else(|| {
            ApiFailure::detail(StatusCode::FORBIDDEN, "Authentication credentials were not provided.")
        })
}

/// Signed-in user for a state-changing request; also enforces CSRF.
fn authorize_write(store: &Store, headers: &HeaderMap) -> Result<User, ApiFailure> {
    let user = authenticate(store, headers)?;
    let expected = cookie(headers, "csrftoken")
        .ok_or_else(|| ApiFailure::detail(StatusCode::FORBIDDEN, "CSRF Failed: CSRF cookie not set."))?;
    match headers.get("x-csrftoken").and_then(|v| v.to_str().ok()) {
        None => Err(ApiFailure::detail(StatusCode::FORBIDDEN, "CSRF Failed: CSRF token missing.")),
        Some(token) if token != expected => Err(ApiFailure::detail(
            StatusCode::FORBIDDEN,
            "CSRF Failed: CSRF token incorrect.",
        )),
        Some(_) => Ok(user),
    }
}
