use axum::{extract::Request, middleware::Next, response::Response};
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

/// Wrap each request in an `http_request` span with a fresh id.
pub async fn trace_request(req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();

    let span = info_span!(
        "http_request",
        request_id = %request_id,
        method = %req.method(),
        uri = %req.uri(),
    );

    async move {
        info!("request started");
        let response = next.run(req).await;
        info!(status = %response.status(), "request finished");
        response
    }
    .instrument(span)
    .await
}
