//! Startup orchestration.
//!
//! # Responsibilities
//! - Parse command line flags
//! - Load and validate configuration, then apply CLI overrides
//! - Load the upstream credential
//!
//! # Design Decisions
//! - Fail fast: a missing `SLACK_TOKEN` stops the process before any bind
//! - Overrides are validated exactly like file values

use std::path::PathBuf;

use clap::Parser;

use crate::config::{load_config, validation::validate_config, ConfigError, ProxyConfig};
use crate::credential::{CredentialError, SlackToken};
use crate::upstream::UpstreamError;

#[derive(Debug, Parser)]
#[command(name = "slack-proxy")]
#[command(about = "Forwards /slack-proxy/<method> calls to the Slack Web API", long_about = None)]
pub struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Listen address, overrides `listener.bind_address`.
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Log level, overrides `observability.log_level`.
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Anything that stops the process from serving.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error("failed to initialize logging: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),
    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Cli {
    /// Resolve the effective configuration.
    pub fn load_config(&self) -> Result<ProxyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ProxyConfig::default(),
        };

        if let Some(bind) = &self.bind {
            config.listener.bind_address = bind.clone();
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

/// Read the credential from the environment.
pub fn load_credential() -> Result<SlackToken, CredentialError> {
    SlackToken::from_env()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_flags() {
        let cli = Cli::parse_from(["slack-proxy"]);
        let config = cli.load_config().unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:5000");
    }

    #[test]
    fn bind_flag_overrides_listener() {
        let cli = Cli::parse_from(["slack-proxy", "--bind", "127.0.0.1:8088", "--log-level", "debug"]);
        let config = cli.load_config().unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:8088");
        assert_eq!(config.observability.log_level, "debug");
    }

    #[test]
    fn invalid_override_is_rejected() {
        let cli = Cli::parse_from(["slack-proxy", "--bind", "localhost"]);
        assert!(matches!(cli.load_config(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn missing_config_file_is_fatal() {
        let cli = Cli::parse_from(["slack-proxy", "--config", "/no/such/slack-proxy.toml"]);
        assert!(matches!(cli.load_config(), Err(ConfigError::Io(_))));
    }
}
