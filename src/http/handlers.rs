//! Route handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::http::request::{bad_request, parse_query_args, request_id, Caller};
use crate::http::server::AppState;

/// Body of an invoke request.
#[derive(Debug, Deserialize)]
pub struct InvokeBody {
    pub fcn: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Query string of a query request.
#[derive(Debug, Deserialize)]
pub struct QueryParams {
    pub fcn: Option<String>,
    pub args: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub organizations: usize,
}

/// `POST /channels/{channel}/chaincodes/{chaincode}`
pub async fn invoke_handler(
    State(state): State<AppState>,
    Path((channel, chaincode)): Path<(String, String)>,
    headers: HeaderMap,
    caller: Caller,
    body: Result<Json<InvokeBody>, JsonRejection>,
) -> Response {
    let request_id = request_id(&headers);
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::warn!(request_id = %request_id, error = %rejection, "Invalid invoke body");
            return bad_request(format!("invalid request body: {}", rejection.body_text()));
        }
    };

    tracing::debug!(
        request_id = %request_id,
        channel = %channel,
        chaincode = %chaincode,
        fcn = %body.fcn,
        identity = %caller.identity,
        org = %caller.org,
        "Invoke request"
    );

    let envelope = state
        .service
        .invoke(&channel, &chaincode, &body.fcn, body.args, &caller.identity, &caller.org)
        .await;

    Json(envelope).into_response()
}

/// `GET /channels/{channel}/chaincodes/{chaincode}?fcn=..&args=[..]`
pub async fn query_handler(
    State(state): State<AppState>,
    Path((channel, chaincode)): Path<(String, String)>,
    Query(params): Query<QueryParams>,
    headers: HeaderMap,
    caller: Caller,
) -> Response {
    let request_id = request_id(&headers);

    let Some(fcn) = params.fcn.filter(|f| !f.is_empty()) else {
        return bad_request("'fcn' field is missing or invalid in the request");
    };
    let args = match params.args.as_deref().map(parse_query_args) {
        Some(Ok(args)) => args,
        Some(Err(e)) => return bad_request(e),
        None => return bad_request("'args' field is missing or invalid in the request"),
    };

    tracing::debug!(
        request_id = %request_id,
        channel = %channel,
        chaincode = %chaincode,
        fcn = %fcn,
        identity = %caller.identity,
        org = %caller.org,
        "Query request"
    );

    let envelope = state
        .service
        .query(&channel, &chaincode, args, &fcn, &caller.identity, &caller.org)
        .await;

    Json(envelope).into_response()
}

/// `GET /health`
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "operational".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        organizations: state.organizations,
    })
}
