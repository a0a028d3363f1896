//! Upstream bearer credential.
//!
//! Loaded once from the environment at startup and shared read-only for the
//! life of the process. The token never appears in `Debug` output and its
//! header value is marked sensitive so HTTP-level tracing redacts it.

use std::fmt;

use reqwest::header::{HeaderValue, InvalidHeaderValue};

/// Environment variable holding the Slack token.
pub const TOKEN_ENV_VAR: &str = "SLACK_TOKEN";

/// Failure to obtain a usable credential.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("SLACK_TOKEN not set in environment variables")]
    Missing,
    #[error("SLACK_TOKEN is not a valid header value")]
    Invalid(#[from] InvalidHeaderValue),
}

/// The bearer token used for every upstream call.
#[derive(Clone)]
pub struct SlackToken(String);

impl SlackToken {
    /// Read the token from `SLACK_TOKEN`.
    pub fn from_env() -> Result<Self, CredentialError> {
        Self::from_value(std::env::var(TOKEN_ENV_VAR).ok())
    }

    /// Build a token from an optional raw value; blank counts as missing.
    pub fn from_value(value: Option<String>) -> Result<Self, CredentialError> {
        match value {
            Some(token) if !token.trim().is_empty() => {
                let token = Self(token.trim().to_string());
                token.authorization()?;
                Ok(token)
            }
            _ => Err(CredentialError::Missing),
        }
    }

    /// `Authorization: Bearer <token>` header value, flagged sensitive.
    pub fn authorization(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", self.0))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Debug for SlackToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SlackToken([REDACTED])")
    }
}
