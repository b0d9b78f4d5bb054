// Standalone MCP server binary for Harvest

use anyhow::Result;
use clap::Parser;
use harvest_mcp::sanitize::log_safe_anyhow;
use harvest_mcp::tools::{register_harvest_tools, ToolRegistry};
use harvest_mcp::{LogFormat, McpServer, ServerOptions};
use harvest_sdk::{CredentialProvider, EnvCredentials};
use std::sync::Arc;

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "harvest_mcp=info,harvest_sdk=info".into());

    // stdout is reserved for protocol messages.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() {
    let options = ServerOptions::parse();
    init_tracing(options.log_format);

    if let Err(e) = run(options).await {
        let credentials = EnvCredentials::new().current().ok();
        let secrets = credentials
            .as_ref()
            .map(|c| c.secrets().to_vec())
            .unwrap_or_default();
        let message = log_safe_anyhow(&e, &secrets);
        tracing::error!(error = %message, "Harvest MCP server stopped");
        std::process::exit(1);
    }
}

async fn run(options: ServerOptions) -> Result<()> {
    tracing::info!("Harvest MCP server starting");

    let credentials = EnvCredentials::new();
    credentials.validate()?;

    let ctx = options.build_context(Arc::new(credentials))?;
    tracing::info!(
        base_url = %ctx.client.config().base_url,
        write_limit = options.write_limit,
        write_window_secs = options.write_window_secs,
        "Harvest client configured"
    );

    let mut registry = ToolRegistry::new();
    register_harvest_tools(&mut registry, &ctx);
    tracing::info!("Registered {} tools", registry.len());

    let server = McpServer::new(registry);
    server.run_stdio().await
}
