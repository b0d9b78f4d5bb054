// Process options for the stdio server
//
// Credentials are deliberately absent: they are read from the environment by
// the SDK on every request so a rotated token is picked up without restart.

use crate::clock::LocalClock;
use crate::throttle::{WriteThrottle, DEFAULT_MAX_WRITES};
use crate::tools::HarvestContext;
use clap::{Parser, ValueEnum};
use harvest_sdk::{CredentialProvider, HarvestClient, HarvestResult, DEFAULT_BASE_URL};
use std::sync::Arc;
use std::time::Duration;

/// Log line format on stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "harvest-mcp")]
#[command(about = "MCP server for Harvest time tracking over stdio", long_about = None)]
pub struct ServerOptions {
    /// Harvest API base URL
    #[arg(long, env = "HARVEST_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "HARVEST_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Writes admitted per window
    #[arg(long, env = "HARVEST_WRITE_LIMIT", default_value_t = DEFAULT_MAX_WRITES)]
    pub write_limit: usize,

    /// Write window length in seconds
    #[arg(long, env = "HARVEST_WRITE_WINDOW_SECS", default_value_t = 60)]
    pub write_window_secs: u64,

    /// Log format
    #[arg(long, env = "HARVEST_MCP_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl ServerOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn write_window(&self) -> Duration {
        Duration::from_secs(self.write_window_secs)
    }

    pub fn build_client(&self, credentials: Arc<dyn CredentialProvider>) -> HarvestResult<HarvestClient> {
        HarvestClient::builder()
            .base_url(&self.base_url)
            .timeout(self.timeout())
            .credentials(credentials)
            .build()
    }

    pub fn build_throttle(&self) -> WriteThrottle {
        WriteThrottle::new(self.write_limit, self.write_window())
    }

    /// Shared tool context using the local clock.
    pub fn build_context(
        &self,
        credentials: Arc<dyn CredentialProvider>,
    ) -> HarvestResult<HarvestContext> {
        Ok(HarvestContext::new(
            self.build_client(credentials)?,
            Arc::new(self.build_throttle()),
            Arc::new(LocalClock),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harvest_sdk::{Credentials, StaticCredentials};

    #[test]
    fn test_defaults() {
        let options = ServerOptions::try_parse_from(["harvest-mcp"]).unwrap();

        // Env overrides may be set on a developer machine; only check the
        // values the environment cannot reach.
        if std::env::var("HARVEST_WRITE_LIMIT").is_err() {
            assert_eq!(options.write_limit, 30);
        }
        if std::env::var("HARVEST_WRITE_WINDOW_SECS").is_err() {
            assert_eq!(options.write_window(), Duration::from_secs(60));
        }
        if std::env::var("HARVEST_MCP_LOG_FORMAT").is_err() {
            assert_eq!(options.log_format, LogFormat::Text);
        }
    }

    #[test]
    fn test_flags_override() {
        let options = ServerOptions::try_parse_from([
            "harvest-mcp",
            "--base-url",
            "http://127.0.0.1:9999/v2",
            "--timeout-secs",
            "5",
            "--write-limit",
            "3",
            "--write-window-secs",
            "10",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(options.timeout(), Duration::from_secs(5));
        assert_eq!(options.write_limit, 3);
        assert_eq!(options.log_format, LogFormat::Json);

        let throttle = options.build_throttle();
        assert_eq!(throttle.max_writes(), 3);
        assert_eq!(throttle.window(), Duration::from_secs(10));
    }

    #[test]
    fn test_build_client_normalises_base_url() {
        let options =
            ServerOptions::try_parse_from(["harvest-mcp", "--base-url", "http://127.0.0.1:9999/v2"])
                .unwrap();
        let client = options
            .build_client(Arc::new(StaticCredentials::new(Credentials::new("1", "t"))))
            .unwrap();

        assert_eq!(client.config().base_url.as_str(), "http://127.0.0.1:9999/v2/");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let options =
            ServerOptions::try_parse_from(["harvest-mcp", "--base-url", "not a url"]).unwrap();

        assert!(options
            .build_client(Arc::new(StaticCredentials::new(Credentials::new("1", "t"))))
            .is_err());
    }

    #[test]
    fn test_unknown_log_format_rejected() {
        assert!(ServerOptions::try_parse_from(["harvest-mcp", "--log-format", "xml"]).is_err());
    }
}
