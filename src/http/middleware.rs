//! Response middleware.
//!
//! Runs inside the timeout layer so that every response leaving the router,
//! including the layer's own `408`, is counted and carries an envelope.

use axum::extract::Request;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::gateway::Envelope;
use crate::observability::metrics;

/// Metrics label for a request.
pub fn route_label(method: &Method, path: &str) -> &'static str {
    if path == "/health" {
        return "health";
    }
    if path.starts_with("/channels/") {
        if *method == Method::POST {
            return "invoke";
        }
        if *method == Method::GET {
            return "query";
        }
    }
    "other"
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

fn rejection_message(status: StatusCode) -> String {
    match status {
        StatusCode::REQUEST_TIMEOUT => "request timed out before the transaction completed".to_string(),
        StatusCode::NOT_FOUND => "no such route".to_string(),
        other => other
            .canonical_reason()
            .map(str::to_lowercase)
            .unwrap_or_else(|| format!("request failed with status {}", other.as_u16())),
    }
}

/// Record the request metric and replace bodiless error responses with an
/// error envelope carrying the same status.
pub async fn envelope_responses(req: Request, next: Next) -> Response {
    let route = route_label(req.method(), req.uri().path());
    let response = next.run(req).await;
    let status = response.status();
    metrics::record_request(route, status.as_u16());

    if status.is_success() || is_json(&response) {
        return response;
    }

    tracing::debug!(route = route, status = status.as_u16(), "Wrapping bare error response");
    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    parts
        .headers
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    let body = Json(Envelope::rejected(rejection_message(status))).into_response().into_body();
    Response::from_parts(parts, body)
}
