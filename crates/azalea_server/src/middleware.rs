//! Request logging middleware.
//!
//! # Invariants
//! - One `http_request` event per request, emitted after the response.
//! - Query strings are not logged.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use log::{info, warn};
use std::time::Instant;

pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis();
    if status.is_server_error() {
        warn!(
            "event=http_request module=server status=error method={method} path={path} http_status={} duration_ms={elapsed_ms}",
            status.as_u16()
        );
    } else {
        info!(
            "event=http_request module=server status=ok method={method} path={path} http_status={} duration_ms={elapsed_ms}",
            status.as_u16()
        );
    }

    response
}
