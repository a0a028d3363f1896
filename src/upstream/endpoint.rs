//! Endpoint policy.
//!
//! The endpoint segment is forwarded as written. Two checks remain:
//! dot-segments are refused (URL normalization would let them climb out of
//! the API base), and an optional allow-list restricts which upstream
//! methods are reachable. With an empty allow-list every other endpoint
//! passes.

use std::collections::HashSet;

/// Why an endpoint was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndpointError {
    #[error("endpoint is empty")]
    Empty,
    #[error("endpoint '{0}' contains a dot-segment")]
    DotSegment(String),
    #[error("endpoint '{0}' is not in the allow-list")]
    NotAllowed(String),
}

/// True if any `/`-separated segment is `.` or `..`.
pub fn has_dot_segment(endpoint: &str) -> bool {
    endpoint.split('/').any(|segment| segment == "." || segment == "..")
}

#[derive(Debug, Clone, Default)]
pub struct EndpointPolicy {
    allowed: HashSet<String>,
}

impl EndpointPolicy {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether any endpoint may be forwarded.
    pub fn is_permissive(&self) -> bool {
        self.allowed.is_empty()
    }

    pub fn check(&self, endpoint: &str) -> Result<(), EndpointError> {
        if endpoint.is_empty() {
            return Err(EndpointError::Empty);
        }
        if has_dot_segment(endpoint) {
            return Err(EndpointError::DotSegment(endpoint.to_string()));
        }
        if !self.is_permissive() && !self.allowed.contains(endpoint) {
            return Err(EndpointError::NotAllowed(endpoint.to_string()));
        }
        Ok(())
    }
}
