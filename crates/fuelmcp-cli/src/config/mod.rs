//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── client: ClientConfig   # HTTP timeout, user agent
//! └── command: Command       # describe | schema | query | status
//! ```
//!
//! HTTP settings can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.

use std::process;

use clap::{Parser, Subcommand};
use fuelmcp_node::client::ClientConfig;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "fuelmcp")]
#[command(about = "Fuel MCP correction node harness")]
#[command(version)]
pub struct Cli {
    /// HTTP client configuration for the correction service.
    #[clap(flatten)]
    pub client: ClientConfig,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Clone, Subcommand, Serialize, Deserialize)]
pub enum Command {
    /// Print the node declaration as JSON.
    Describe,
    /// Print the node as a function-calling tool schema.
    Schema,
    /// Execute the node once and print the result.
    Query {
        /// Natural-language correction query.
        text: String,
        /// Query endpoint of the correction service.
        #[arg(long, env = "FUELMCP_API_URL")]
        api_url: Option<String>,
    },
    /// Check the correction service status endpoint.
    Status {
        /// Query endpoint of the correction service.
        #[arg(long, env = "FUELMCP_API_URL")]
        api_url: Option<String>,
    },
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    ///
    /// Logs go to stderr so command output on stdout stays machine-readable.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    /// Logs configuration at debug level.
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            http_timeout_secs = self.client.effective_timeout().as_secs(),
            user_agent = %self.client.effective_user_agent(),
            "Client configuration"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query() {
        let cli = Cli::try_parse_from([
            "fuelmcp",
            "--http-timeout",
            "5",
            "query",
            "--api-url",
            "http://10.0.0.7:8000/query",
            "calculate VCF for diesel at 25°C",
        ])
        .unwrap();

        assert_eq!(cli.client.http_timeout, 5);
        match cli.command {
            Command::Query { text, api_url } => {
                assert_eq!(text, "calculate VCF for diesel at 25°C");
                assert_eq!(api_url.as_deref(), Some("http://10.0.0.7:8000/query"));
            }
            other => panic!("Expected query command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_describe_defaults() {
        let cli = Cli::try_parse_from(["fuelmcp", "describe"]).unwrap();
        assert_eq!(cli.client, ClientConfig::default());
        assert!(matches!(cli.command, Command::Describe));
    }

    #[test]
    fn test_query_requires_text() {
        assert!(Cli::try_parse_from(["fuelmcp", "query"]).is_err());
    }
}
