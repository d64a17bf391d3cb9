#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;

use std::process;

use anyhow::Context;
use fuelmcp_node::client::CorrectionClient;
use fuelmcp_node::{
    API_URL_INPUT, CorrectionNode, DEFAULT_API_URL, InvocationRequest, NodeService, QUERY_INPUT,
};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::{Cli, Command};

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "fuelmcp_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "fuelmcp_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "fuelmcp_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %error,
            "command failed"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    Cli::init_tracing();
    cli.log();

    let client = CorrectionClient::try_new(cli.client.clone())
        .context("failed to create correction client")?;
    let service = NodeService::new(CorrectionNode::with_client(client.clone()));

    match cli.command {
        Command::Describe => print_json(service.declaration()),
        Command::Schema => print_json(&service.declaration().tool_schema()),
        Command::Query { text, api_url } => {
            let mut invocation = InvocationRequest::new().with_input(QUERY_INPUT, text);
            if let Some(api_url) = api_url {
                invocation = invocation.with_input(API_URL_INPUT, api_url);
            }

            let cancel = CancellationToken::new();
            tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

            let result = service
                .execute_with_cancellation(&invocation, cancel)
                .await
                .context("correction query failed")?;
            print_json(&result.result)
        }
        Command::Status { api_url } => {
            let api_url = api_url.as_deref().unwrap_or(DEFAULT_API_URL);
            let api_url = Url::parse(api_url)
                .with_context(|| format!("invalid api url: {api_url}"))?;

            let health = client.status(&api_url).await;
            print_json(&health)?;
            anyhow::ensure!(health.is_healthy(), "correction service is not healthy");
            Ok(())
        }
    }
}

/// Cancels `token` on the first Ctrl-C.
async fn cancel_on_ctrl_c(token: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!(
            target: TRACING_TARGET_SHUTDOWN,
            "interrupt received, cancelling query"
        );
        token.cancel();
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let output = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{output}");
    Ok(())
}
