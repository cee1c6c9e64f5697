// ABOUTME: Server binary for the Pocket Assistant chat backend
// ABOUTME: Loads configuration, initializes logging and serves the HTTP API until shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Pocket Assistant server
//!
//! ## Usage
//!
//! ```bash
//! # Serve on the configured HOST/HTTP_PORT (default 0.0.0.0:5000)
//! OPENAI_API_KEY=sk-... OPENWEATHER_API_KEY=... cargo run --bin pocket-assistant
//!
//! # Override the listen address and log format
//! cargo run --bin pocket-assistant -- --host 127.0.0.1 --port 8080 --log-format json
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use pocket_assistant::config::{LogFormat, ServerConfig};
use pocket_assistant::logging::init_logging;
use pocket_assistant::resources::ServerResources;
use pocket_assistant::server::AssistantServer;

#[derive(Parser)]
#[command(
    name = "pocket-assistant",
    about = "Pocket Assistant chat backend",
    long_about = "Serve the assistant web UI API: chat, weather, radio and speed test"
)]
struct ServerArgs {
    /// Listen host override
    #[arg(long)]
    host: Option<String>,

    /// Listen port override
    #[arg(long)]
    port: Option<u16>,

    /// Log format override (json, pretty, compact)
    #[arg(long)]
    log_format: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = ServerArgs::parse();

    let mut config = ServerConfig::from_env().context("Failed to load configuration")?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.http_port = port;
    }
    if let Some(format) = args.log_format {
        config.logging.format = format.parse::<LogFormat>()?;
    }

    init_logging(&config.logging)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        model = %config.openai.model,
        "Starting Pocket Assistant"
    );

    let resources = Arc::new(ServerResources::from_config(&config)?);
    AssistantServer::new(resources)
        .run(&config.bind_address())
        .await?;

    Ok(())
}
