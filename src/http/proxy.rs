//! The `/slack-proxy/{*endpoint}` handler.
//!
//! # Flow
//! ```text
//! GET  → endpoint policy → query pairs forwarded as-is
//! POST → endpoint policy → repair endpoint: lenient decode (repair.rs)
//!                        → other endpoints: JSON content type + strict parse
//!      → SlackClient → upstream JSON body + status returned verbatim
//! ```
//!
//! Every failure is a [`ProxyError`] mapped to status + JSON once, here.

use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, rejection::PathRejection, Path, State},
    http::{HeaderMap, Method, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use crate::http::error::{HttpError, ProxyError};
use crate::http::request::{redacted_headers, request_id};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::payload::{self, decode_lenient};
use crate::upstream::UpstreamReply;

/// One inbound call, independent of the HTTP framework.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    pub endpoint: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Query string as ordered `(name, value)` pairs, duplicates kept.
pub fn query_pairs(uri: &Uri) -> Vec<(String, String)> {
    uri.query()
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default()
}

pub async fn proxy_handler(
    State(state): State<AppState>,
    method: Method,
    endpoint: Result<Path<String>, PathRejection>,
    uri: Uri,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let start = Instant::now();
    let request_id = request_id(&headers).to_string();

    let endpoint = match endpoint {
        Ok(Path(endpoint)) => endpoint,
        Err(rejection) => {
            return HttpError::new(rejection.status(), rejection.body_text()).into_response();
        }
    };
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::warn!(request_id = %request_id, error = %rejection, "Failed to read request body");
            return HttpError::new(rejection.status(), rejection.body_text()).into_response();
        }
    };

    tracing::debug!(
        request_id = %request_id,
        headers = ?redacted_headers(&headers),
        "Incoming headers"
    );

    let request = InboundRequest {
        method: method.clone(),
        endpoint,
        query: query_pairs(&uri),
        headers,
        body,
    };

    match forward(&state, request).await {
        Ok(reply) => {
            metrics::record_request(method.as_str(), reply.status.as_u16(), start);
            (reply.status, Json(reply.body)).into_response()
        }
        Err(error) => {
            if error.status_code().is_server_error() {
                tracing::error!(request_id = %request_id, error = %error, "Slack request failed");
            } else {
                tracing::warn!(request_id = %request_id, error = %error, "Rejected request");
            }
            metrics::record_error(error.kind());
            metrics::record_request(method.as_str(), error.status_code().as_u16(), start);
            error.into_response()
        }
    }
}

/// Forward one call upstream and return its decoded reply.
pub async fn forward(state: &AppState, request: InboundRequest) -> Result<UpstreamReply, ProxyError> {
    state.policy.check(&request.endpoint)?;

    tracing::info!(
        method = %request.method,
        endpoint = %request.endpoint,
        "Forwarding to Slack"
    );

    if request.method == Method::GET {
        return Ok(state.client.get(&request.endpoint, &request.query).await?);
    }
    if request.method != Method::POST {
        // Routing only admits GET and POST.
        return Err(ProxyError::UnexpectedFailure(format!(
            "unsupported method {}",
            request.method
        )));
    }

    let payload = if request.endpoint == state.config.upstream.repair_endpoint {
        lenient_payload(&request.body)?
    } else {
        strict_payload(&request.headers, &request.body)?
    };

    Ok(state.client.post(&request.endpoint, &payload).await?)
}

fn strict_payload(headers: &HeaderMap, body: &[u8]) -> Result<Value, ProxyError> {
    if !payload::is_json_content_type(headers) {
        return Err(ProxyError::MissingJsonContentType);
    }
    payload::decode_strict(body).map_err(ProxyError::InvalidJson)
}

fn lenient_payload(body: &[u8]) -> Result<Value, ProxyError> {
    let raw = String::from_utf8_lossy(body);
    tracing::info!(payload = %raw, "Raw payload");

    match decode_lenient(&raw) {
        Ok(decoded) => {
            if decoded.repaired {
                tracing::info!(payload = %decoded.value, "Repaired payload");
                metrics::record_repair("repaired");
            }
            Ok(decoded.value)
        }
        Err(e) => {
            tracing::error!(error = %e, "JSON repair failed");
            metrics::record_repair("failed");
            Err(ProxyError::MalformedBody(e))
        }
    }
}
