use axum::body::{to_bytes, Body};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::shared::format::format_number;

/// Logs every HTTP request: status, method, path, duration and response size
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let response = next.run(req).await;
    let (parts, body) = response.into_parts();

    // Buffer the body to learn its real size
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(
                "{} {} {} | {}ms | body error: {}",
                parts.status.as_u16(),
                method,
                uri.path(),
                start.elapsed().as_millis(),
                e
            );
            return Response::from_parts(parts, Body::default());
        }
    };

    let status = parts.status.as_u16();
    let duration = start.elapsed().as_millis();
    let size = format_number(bytes.len());
    if parts.status.is_server_error() {
        tracing::error!("{} {} {} | {}ms | {} bytes", status, method, uri.path(), duration, size);
    } else if parts.status.is_client_error() {
        tracing::warn!("{} {} {} | {}ms | {} bytes", status, method, uri.path(), duration, size);
    } else {
        tracing::info!("{} {} {} | {}ms | {} bytes", status, method, uri.path(), duration, size);
    }

    Response::from_parts(parts, Body::from(bytes))
}
