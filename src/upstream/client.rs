//! HTTP client for the Slack Web API.
//!
//! # Responsibilities
//! - Hold the credential and content-type as default headers
//! - Build `<base_url>/<endpoint>` URLs
//! - Forward GET query strings and POST JSON payloads
//! - Decode the upstream body as JSON, keeping its status code
//!
//! # Design Decisions
//! - One `reqwest::Client` per process (connection pooling), built at startup
//! - Explicit connect and request timeouts; a hung upstream fails the call
//! - No retries: Slack methods are not guaranteed idempotent

use std::time::Duration;

use axum::http::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use url::Url;

use crate::config::UpstreamConfig;
use crate::credential::SlackToken;

/// Content type sent on every upstream call.
pub const UPSTREAM_CONTENT_TYPE: &str = "application/json; charset=utf-8";

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("failed to build upstream client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("invalid credential header: {0}")]
    Credential(#[from] reqwest::header::InvalidHeaderValue),
    #[error("invalid upstream URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("upstream base URL cannot carry a path")]
    OpaqueBase,
    #[error("request to upstream failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("upstream returned a non-JSON body (status {status}): {source}")]
    InvalidBody {
        status: StatusCode,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize payload: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl UpstreamError {
    /// Failures of the call itself, as opposed to local setup problems.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::InvalidBody { .. })
    }
}

/// A decoded upstream response.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Value,
}

#[derive(Debug, Clone)]
pub struct SlackClient {
    http: reqwest::Client,
    base_url: Url,
}

impl SlackClient {
    pub fn new(config: &UpstreamConfig, token: &SlackToken) -> Result<Self, UpstreamError> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, token.authorization()?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(UPSTREAM_CONTENT_TYPE));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(UpstreamError::Build)?;

        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(UpstreamError::OpaqueBase);
        }

        Ok(Self { http, base_url })
    }

    /// `<base_url>/<endpoint>`, each endpoint segment percent-encoded.
    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url, UpstreamError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| UpstreamError::OpaqueBase)?
            .pop_if_empty()
            .extend(endpoint.split('/'));
        Ok(url)
    }

    /// Forward a GET with the caller's query pairs, order preserved.
    pub async fn get(
        &self,
        endpoint: &str,
        query: &[(String, String)],
    ) -> Result<UpstreamReply, UpstreamError> {
        let url = self.endpoint_url(endpoint)?;
        let request = self.http.get(url).query(query);
        Self::send(request).await
    }

    /// Forward a POST with a JSON payload.
    pub async fn post(&self, endpoint: &str, payload: &Value) -> Result<UpstreamReply, UpstreamError> {
        let url = self.endpoint_url(endpoint)?;
        let body = serde_json::to_vec(payload).map_err(UpstreamError::Serialize)?;
        // Raw body so the default `charset=utf-8` content type is kept.
        let request = self.http.post(url).body(body);
        Self::send(request).await
    }

    async fn send(request: reqwest::RequestBuilder) -> Result<UpstreamReply, UpstreamError> {
        let response = request.send().await.map_err(UpstreamError::Transport)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(UpstreamError::Transport)?;
        let body = serde_json::from_slice(&bytes)
            .map_err(|source| UpstreamError::InvalidBody { status, source })?;
        Ok(UpstreamReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> SlackClient {
        let config = UpstreamConfig {
            base_url: base_url.to_string(),
            ..UpstreamConfig::default()
        };
        let token = SlackToken::from_value(Some("xoxb-test".into())).unwrap();
        SlackClient::new(&config, &token).unwrap()
    }

    #[test]
    fn endpoint_is_appended_to_base() {
        let client = client("https://slack.com/api");
        assert_eq!(
            client.endpoint_url("chat.postMessage").unwrap().as_str(),
            "https://slack.com/api/chat.postMessage"
        );
    }

    #[test]
    fn trailing_slash_on_base_is_tolerated() {
        let client = client("https://slack.com/api/");
        assert_eq!(
            client.endpoint_url("users.list").unwrap().as_str(),
            "https://slack.com/api/users.list"
        );
    }

    #[test]
    fn nested_endpoint_keeps_its_slashes() {
        let client = client("http://127.0.0.1:9/api");
        assert_eq!(
            client.endpoint_url("files.remote/info").unwrap().as_str(),
            "http://127.0.0.1:9/api/files.remote/info"
        );
    }

    #[test]
    fn reserved_characters_cannot_inject_a_query() {
        let client = client("https://slack.com/api");
        let url = client.endpoint_url("chat.postMessage?token=x").unwrap();
        assert_eq!(url.query(), None);
        assert_eq!(url.path(), "/api/chat.postMessage%3Ftoken=x");
    }

    #[test]
    fn opaque_base_is_rejected() {
        let config = UpstreamConfig {
            base_url: "mailto:ops@example.com".into(),
            ..UpstreamConfig::default()
        };
        let token = SlackToken::from_value(Some("xoxb-test".into())).unwrap();
        assert!(matches!(
            SlackClient::new(&config, &token),
            Err(UpstreamError::OpaqueBase)
        ));
    }
}
