//! HTTP adapter for the page store.
//!
//! Provides REST API endpoints for:
//! - Reading the whole book
//! - Inserting a page at a position (or appending)
//! - Updating and deleting pages by index
//!
//! Handlers translate requests into [`PageStore`] calls and never hold the
//! store lock themselves; each store call acquires and releases it.

pub mod config;

pub use config::{ConfigError, ServerConfig};

use crate::error::BookError;
use crate::store::PageStore;
use crate::types::Book;
use axum::{
    body::Bytes,
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{get, put},
    Extension, Router,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

/// Header carrying the caller's name into the request context
pub const USER_HEADER: &str = "x-user";

/// User recorded when the request names none
pub const ANONYMOUS_USER: &str = "anonymous";

/// State shared across handlers
pub type SharedState = Arc<PageStore>;

/// Request-scoped metadata attached by [`request_context`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub user: String,
}

/// Body of a create request
#[derive(Debug, Deserialize)]
struct CreatePageRequest {
    text: String,
    #[serde(default, alias = "pos")]
    position: Option<i64>,
}

/// Body of an update request
#[derive(Debug, Deserialize)]
struct UpdatePageRequest {
    text: String,
}

/// Response for mutations
#[derive(Debug, Serialize)]
struct MessageResponse {
    msg: String,
}

/// Response for failed requests
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    pages: usize,
}

/// Failure of a request, mapped to a status code and JSON body
#[derive(Debug)]
pub enum ApiError {
    /// The store rejected or could not run the operation
    Book(BookError),
    /// The path named something that is not a page index
    InvalidPageId(String),
}

impl From<BookError> for ApiError {
    fn from(err: BookError) -> Self {
        Self::Book(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Book(err) => {
                if err.is_client_error() {
                    debug!(error = %err, "request rejected");
                } else {
                    error!(error = %err, "request failed");
                }

                match err {
                    BookError::OutOfRange { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
                    BookError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
                    BookError::MalformedInput(_) => {
                        (StatusCode::BAD_REQUEST, "invalid page document".to_string())
                    }
                    BookError::Busy => (StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal error".to_string(),
                    ),
                }
            }
            ApiError::InvalidPageId(id) => (StatusCode::NOT_FOUND, format!("page {} not found", id)),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Build the router over a shared store
pub fn router(store: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/pages", get(read_pages).put(create_page).post(create_page))
        .route(
            "/pages/:id",
            put(update_page).patch(update_page).delete(delete_page),
        )
        .route("/health", get(health))
        .layer(middleware::from_fn(request_context))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(store)
}

/// Serve the API until `shutdown` resolves and in-flight requests finish
pub async fn serve<F>(listener: TcpListener, store: SharedState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(store))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Resolves on Ctrl-C, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl-C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}

/// Attach a [`RequestContext`] to every request
pub async fn request_context(mut req: Request, next: Next) -> Response {
    let user = req
        .headers()
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(ANONYMOUS_USER)
        .to_string();

    req.extensions_mut().insert(RequestContext { user });
    next.run(req).await
}

fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, BookError> {
    serde_json::from_slice(body).map_err(|e| BookError::malformed(e.to_string()))
}

/// Page ids are unsigned decimal integers; anything else names no page
fn parse_page_id(id: &str) -> Result<usize, ApiError> {
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::InvalidPageId(id.to_string()));
    }
    id.parse()
        .map_err(|_| ApiError::InvalidPageId(id.to_string()))
}

async fn read_pages(
    State(store): State<SharedState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<Book>, ApiError> {
    debug!(user = %ctx.user, "reading pages");
    let pages = store.read_all()?;
    Ok(Json(Book::from(pages)))
}

async fn create_page(
    State(store): State<SharedState>,
    Extension(ctx): Extension<RequestContext>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let req: CreatePageRequest = decode_body(&body)?;
    let position = store.insert(req.position, req.text)?;

    info!(user = %ctx.user, position, "page inserted");
    Ok(Json(MessageResponse {
        msg: format!("page {} inserted successfully.", position),
    }))
}

async fn update_page(
    State(store): State<SharedState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let index = parse_page_id(&id)?;
    let req: UpdatePageRequest = decode_body(&body)?;
    store.update_at(index, req.text)?;

    info!(user = %ctx.user, index, "page updated");
    Ok(Json(MessageResponse {
        msg: format!("page {} updated successfully.", index),
    }))
}

async fn delete_page(
    State(store): State<SharedState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let index = parse_page_id(&id)?;
    store.delete_at(index)?;

    info!(user = %ctx.user, index, "page deleted");
    Ok(Json(MessageResponse {
        msg: format!("page {} deleted successfully.", index),
    }))
}

async fn health(State(store): State<SharedState>) -> Result<Json<HealthResponse>, ApiError> {
    Ok(Json(HealthResponse {
        status: "ok",
        pages: store.len()?,
    }))
}
