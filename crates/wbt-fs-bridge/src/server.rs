// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Standalone server for the bridge

use crate::config::ServerConfig;
use crate::dispatcher::Bridge;
use std::io;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

/// Bridge served on its own listener
pub struct Server {
    listener: TcpListener,
    bridge: Bridge,
}

impl Server {
    /// Bind the listener; port 0 picks a free port
    pub async fn bind(config: ServerConfig, bridge: Bridge) -> io::Result<Self> {
        let listener = TcpListener::bind(config.bind_addr).await?;
        Ok(Self { listener, bridge })
    }

    /// Address actually bound
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until the process is stopped
    pub async fn run(self) -> io::Result<()> {
        info!("Serving filesystem bridge on {}", self.listener.local_addr()?);
        axum::serve(self.listener, self.bridge.router()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SecurityToken;
    use crate::config::BridgeConfig;

    #[tokio::test]
    async fn binds_an_ephemeral_loopback_port() {
        let bridge = Bridge::new(SecurityToken::new("t"), BridgeConfig::default());
        let server = Server::bind(ServerConfig::default(), bridge).await.unwrap();

        let addr = server.local_addr().unwrap();
        assert!(addr.ip().is_loopback());
        assert_ne!(addr.port(), 0);
    }
}
