//! Error responses.
//!
//! Two envelopes are produced:
//! - proxy errors: `{"error": <fixed message>}`
//! - framework errors (routing, method, body limits): `{"error": <reason>,
//!   "description": <text>, "code": <status>}`
//!
//! Messages are fixed strings. Upstream detail, internals and the
//! credential stay in the logs.

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use crate::payload::RepairError;
use crate::upstream::{EndpointError, UpstreamError};

/// Failures of a single proxied call.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("malformed JSON body could not be repaired: {0}")]
    MalformedBody(#[source] RepairError),

    #[error("request body is not declared as JSON")]
    MissingJsonContentType,

    #[error("request body is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("endpoint rejected: {0}")]
    EndpointRejected(#[from] EndpointError),

    #[error("upstream unreachable: {0}")]
    UpstreamUnreachable(#[source] UpstreamError),

    #[error("unexpected failure: {0}")]
    UnexpectedFailure(String),
}

impl From<UpstreamError> for ProxyError {
    fn from(error: UpstreamError) -> Self {
        if error.is_transport() {
            Self::UpstreamUnreachable(error)
        } else {
            Self::UnexpectedFailure(error.to_string())
        }
    }
}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MalformedBody(_) | Self::MissingJsonContentType | Self::InvalidJson(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::EndpointRejected(EndpointError::NotAllowed(_)) => StatusCode::FORBIDDEN,
            Self::EndpointRejected(_) => StatusCode::BAD_REQUEST,
            Self::UpstreamUnreachable(_) | Self::UnexpectedFailure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message shown to the caller.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::MalformedBody(_) => "Malformed JSON and fix failed",
            Self::MissingJsonContentType => "Expected JSON body",
            Self::InvalidJson(_) => "Bad Request",
            Self::EndpointRejected(EndpointError::NotAllowed(_)) => "Endpoint not allowed",
            Self::EndpointRejected(_) => "Invalid endpoint",
            Self::UpstreamUnreachable(_) => "Slack API request failed",
            Self::UnexpectedFailure(_) => "Unexpected server error",
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedBody(_) => "malformed_body",
            Self::MissingJsonContentType => "missing_json_content_type",
            Self::InvalidJson(_) => "invalid_json",
            Self::EndpointRejected(_) => "endpoint_rejected",
            Self::UpstreamUnreachable(_) => "upstream_unreachable",
            Self::UnexpectedFailure(_) => "unexpected",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        // A JSON body that fails to parse is reported like any other
        // framework-level bad request.
        if let Self::InvalidJson(e) = &self {
            return HttpError::new(
                StatusCode::BAD_REQUEST,
                format!("Failed to decode JSON object: {e}"),
            )
            .into_response();
        }

        (
            self.status_code(),
            Json(json!({ "error": self.public_message() })),
        )
            .into_response()
    }
}

/// Framework-level HTTP error envelope.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HttpErrorBody {
    pub error: String,
    pub description: String,
    pub code: u16,
}

#[derive(Debug, Clone)]
pub struct HttpError {
    status: StatusCode,
    description: String,
}

impl HttpError {
    pub fn new(status: StatusCode, description: impl Into<String>) -> Self {
        Self {
            status,
            description: description.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "The requested URL was not found on the server. If you entered the URL manually please check your spelling and try again.",
        )
    }

    pub fn method_not_allowed() -> Self {
        Self::new(
            StatusCode::METHOD_NOT_ALLOWED,
            "The method is not allowed for the requested URL.",
        )
    }

    pub fn body(&self) -> HttpErrorBody {
        HttpErrorBody {
            error: self
                .status
                .canonical_reason()
                .unwrap_or("Unknown Error")
                .to_string(),
            description: self.description.clone(),
            code: self.status.as_u16(),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body())).into_response()
    }
}

/// Router fallback for unknown paths.
pub async fn not_found() -> HttpError {
    HttpError::not_found()
}

/// Router fallback for known paths hit with the wrong method.
pub async fn method_not_allowed() -> HttpError {
    HttpError::method_not_allowed()
}

/// Last-resort handler for panics escaping a request handler.
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = %detail, "Unhandled exception");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error" })),
    )
        .into_response()
}
