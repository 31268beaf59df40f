// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Bridge and server configuration

use std::net::SocketAddr;

/// Prefix shared by the API paths and the filesystem paths sent by the page
pub const DEFAULT_API_PREFIX: &str = "/fs/";

/// Header carrying the per-instance capability token
pub const DEFAULT_TOKEN_HEADER: &str = "WBT-Token";

/// Filesystem bridge configuration
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Leading path segment of every operation path, also stripped from
    /// filesystem paths before use
    pub api_prefix: String,

    /// Name of the header that must carry the capability token
    pub token_header: String,

    /// Log request and response bodies at debug level
    pub debug: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            token_header: DEFAULT_TOKEN_HEADER.to_string(),
            debug: false,
        }
    }
}

impl BridgeConfig {
    /// Remove the API prefix from a filesystem path sent by the page.
    ///
    /// Paths without the prefix are used unchanged.
    pub fn host_path<'a>(&self, path: &'a str) -> &'a str {
        path.strip_prefix(self.api_prefix.as_str()).unwrap_or(path)
    }

    /// Map a request path onto the operation name, if it carries the prefix
    pub fn operation_name<'a>(&self, request_path: &'a str) -> Option<&'a str> {
        request_path.strip_prefix(self.api_prefix.as_str())
    }
}

/// Standalone server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to; port 0 picks a free port
    pub bind_addr: SocketAddr,

    /// Bridge settings
    pub bridge: BridgeConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            bridge: BridgeConfig::default(),
        }
    }
}
