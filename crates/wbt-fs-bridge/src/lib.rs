// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Host filesystem bridge for in-browser WebAssembly tests
//!
//! A WebAssembly test running inside a browser page has no filesystem. This
//! crate exposes a small set of host filesystem calls over HTTP with JSON
//! bodies, one path per operation under a common prefix (`/fs/stat`,
//! `/fs/open`, ...), guarded by a per-instance capability token.
//!
//! ```no_run
//! use wbt_fs_bridge::{Bridge, BridgeConfig, SecurityToken};
//!
//! # async fn serve() -> anyhow::Result<()> {
//! let token = SecurityToken::generate()?;
//! let bridge = Bridge::new(token, BridgeConfig::default());
//! let app = bridge.router();
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod host;
pub mod protocol;
pub mod server;
pub mod stat;

pub use auth::{SecurityGate, SecurityToken};
pub use config::{BridgeConfig, ServerConfig};
pub use dispatcher::Bridge;
pub use error::{BridgeError, BridgeResult, ErrorCode, ErrorEnvelope};
pub use server::Server;
pub use stat::{MetadataNormalizer, StatAttributes};
