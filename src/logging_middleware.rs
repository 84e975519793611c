// src/logging_middleware.rs
//! Request id tagging and debug-level body logging with secrets redacted

use axum::body::to_bytes;
use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::{debug, Level};
use uuid::Uuid;

use crate::common::config::MAX_UPLOAD_BYTES;
use crate::common::helpers::redact_secrets;

pub const REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false)
}

/// Buffers a body for logging, refusing anything over `limit` bytes
async fn buffered(body: Body, limit: usize) -> Result<axum::body::Bytes, StatusCode> {
    to_bytes(body, limit)
        .await
        .map_err(|_| StatusCode::PAYLOAD_TOO_LARGE)
}

/// Renders a JSON body for the log with password and token fields masked
fn loggable(bytes: &[u8]) -> Option<String> {
    let mut json = serde_json::from_slice::<serde_json::Value>(bytes).ok()?;
    redact_secrets(&mut json);
    serde_json::to_string_pretty(&json).ok()
}

/// Tags every request with an `x-request-id` (kept if the caller sent one)
/// and, at debug level, logs JSON request and response bodies. Multipart
/// and other bodies pass through unbuffered.
pub async fn log_request_response(
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let request_id = request
        .headers()
        .get(&REQUEST_ID)
        .cloned()
        .unwrap_or_else(|| {
            HeaderValue::from_str(&Uuid::new_v4().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("unknown"))
        });
    request
        .headers_mut()
        .insert(REQUEST_ID.clone(), request_id.clone());

    let log_bodies = tracing::enabled!(Level::DEBUG);

    let request = if log_bodies && is_json(request.headers()) {
        let (parts, body) = request.into_parts();
        let bytes = buffered(body, MAX_UPLOAD_BYTES).await?;

        if let Some(body) = loggable(&bytes) {
            debug!(
                request_id = ?request_id,
                method = %parts.method,
                uri = %parts.uri,
                request_body = %body,
                "Request"
            );
        }
        Request::from_parts(parts, Body::from(bytes))
    } else {
        request
    };

    let mut response = next.run(request).await;
    response.headers_mut().insert(REQUEST_ID.clone(), request_id.clone());

    if !(log_bodies && is_json(response.headers())) {
        return Ok(response);
    }

    let (parts, body) = response.into_parts();
    let bytes = buffered(body, MAX_UPLOAD_BYTES)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if let Some(body) = loggable(&bytes) {
        debug!(
            request_id = ?request_id,
            status = %parts.status,
            response_body = %body,
            "Response"
        );
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}
