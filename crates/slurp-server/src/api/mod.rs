pub mod form;
pub mod images;
pub mod middleware;
pub mod scan;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};

use crate::error::ApiError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;
    Router::new()
        .route("/image/upload", post(images::upload))
        .route("/image/scan", post(scan::handle))
        .route("/image/filter/:image_id", post(images::apply_filters))
        .route("/image/:image_id/undo", post(images::undo))
        .route("/image/:image_id/redo", post(images::redo))
        .route("/image/:image_id/download", get(images::download))
        .route("/image/:image_id/history", get(images::history))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn(middleware::trace_request))
        .with_state(state)
}

/// Run CPU-bound or blocking store work off the async runtime.
pub(crate) async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}
