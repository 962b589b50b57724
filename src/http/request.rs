//! Request parsing helpers.
//!
//! # Responsibilities
//! - Read the request ID set by the request-id layer
//! - Extract the calling identity and organization from headers
//! - Decode the positional argument list of query requests

use axum::extract::FromRequestParts;
use axum::http::{request::Parts, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::gateway::Envelope;

/// Request ID header, set by `SetRequestIdLayer` and echoed back.
pub const X_REQUEST_ID: &str = "x-request-id";
/// Identity label of the caller.
pub const X_FABRIC_USER: &str = "x-fabric-user";
/// Organization of the caller.
pub const X_FABRIC_ORG: &str = "x-fabric-org";

/// Request ID of the current request, or "unknown".
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// 400 response carrying an error envelope.
pub fn bad_request(message: impl Into<String>) -> Response {
    (StatusCode::BAD_REQUEST, Json(Envelope::rejected(message))).into_response()
}

/// Identity and organization the call is made as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub identity: String,
    pub org: String,
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let identity = header(X_FABRIC_USER)
            .ok_or_else(|| bad_request(format!("'{}' header is missing", X_FABRIC_USER)))?;
        let org = header(X_FABRIC_ORG)
            .ok_or_else(|| bad_request(format!("'{}' header is missing", X_FABRIC_ORG)))?;
        Ok(Self { identity, org })
    }
}

/// Decode a query-string argument list such as `["car1"]` or `['car1']`.
///
/// Strict JSON first. Single quotes are rewritten only if that fails.
pub fn parse_query_args(raw: &str) -> Result<Vec<String>, String> {
    if let Ok(args) = serde_json::from_str(raw) {
        return Ok(args);
    }
    let normalized = raw.replace('\'', "\"");
    serde_json::from_str(&normalized).map_err(|e| format!("'args' must be a JSON array of strings: {}", e))
}
