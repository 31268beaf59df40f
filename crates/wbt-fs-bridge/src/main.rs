// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Standalone filesystem bridge, for developing against the page runtime
//! without the full test harness

use anyhow::Context as _;
use clap::Parser;
use std::net::SocketAddr;
use wbt_fs_bridge::{Bridge, BridgeConfig, SecurityToken, Server, ServerConfig};
use wbt_logging::{redact, CliLoggingArgs};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Bind address for the server; port 0 picks a free port
    #[arg(short, long, default_value = "127.0.0.1:0")]
    bind: SocketAddr,

    /// Capability token; a random one is generated when absent
    #[arg(long, env = "WBT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// API path prefix, also stripped from filesystem paths
    #[arg(long, default_value = wbt_fs_bridge::config::DEFAULT_API_PREFIX)]
    prefix: String,

    /// Log request and response bodies
    #[arg(long)]
    debug: bool,

    #[command(flatten)]
    logging: CliLoggingArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    args.logging.init("wbt-fs-bridge")?;

    let token = match args.token {
        Some(token) => SecurityToken::new(token),
        None => SecurityToken::generate().context("failed to generate capability token")?,
    };

    let config = ServerConfig {
        bind_addr: args.bind,
        bridge: BridgeConfig {
            api_prefix: args.prefix,
            debug: args.debug,
            ..Default::default()
        },
    };

    let bridge = Bridge::new(token.clone(), config.bridge.clone());
    let server = Server::bind(config.clone(), bridge)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    let addr = server.local_addr()?;

    tracing::info!(%addr, token = %redact(token.as_str()), "filesystem bridge ready");
    println!("url=http://{}{}", addr, config.bridge.api_prefix);
    println!("token={}", token.as_str());

    server.run().await?;
    Ok(())
}
