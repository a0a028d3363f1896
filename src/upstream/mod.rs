//! Upstream (Slack Web API) access.
//!
//! # Data Flow
//! ```text
//! endpoint segment
//!     → endpoint.rs (policy check)
//!     → client.rs (URL build, credential headers, send, decode JSON)
//!     → UpstreamReply { status, body }
//! ```

pub mod client;
pub mod endpoint;

pub use client::{SlackClient, UpstreamError, UpstreamReply, UPSTREAM_CONTENT_TYPE};
pub use endpoint::{EndpointError, EndpointPolicy};
