//! Slack API Proxy Library
//!
//! Forwards `/slack-proxy/<method>` calls to the Slack Web API with a
//! server-side bearer token, relaying the JSON body and status code back.

pub mod config;
pub mod credential;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod payload;
pub mod upstream;

pub use config::schema::ProxyConfig;
pub use credential::SlackToken;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
