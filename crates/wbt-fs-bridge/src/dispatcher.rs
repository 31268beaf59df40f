// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Request dispatch: gate, route, decode, execute, encode

use crate::auth::{SecurityGate, SecurityToken};
use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::handlers::{self, Context};
use crate::protocol::{Operation, OperationKind};
use crate::stat::{host_normalizer, MetadataNormalizer};
use axum::{
    body::Bytes,
    extract::{OriginalUri, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

/// Filesystem bridge instance.
///
/// Token, configuration and normalizer are fixed at construction; clones
/// share them.
#[derive(Clone)]
pub struct Bridge {
    inner: Arc<BridgeInner>,
}

struct BridgeInner {
    config: BridgeConfig,
    gate: SecurityGate,
    normalizer: Arc<dyn MetadataNormalizer>,
}

impl Bridge {
    /// Bridge backed by the host's metadata calls
    pub fn new(token: SecurityToken, config: BridgeConfig) -> Self {
        Self::with_normalizer(token, config, host_normalizer())
    }

    pub fn with_normalizer(
        token: SecurityToken,
        config: BridgeConfig,
        normalizer: Arc<dyn MetadataNormalizer>,
    ) -> Self {
        let gate = SecurityGate::new(config.token_header.clone(), token);
        Self {
            inner: Arc::new(BridgeInner {
                config,
                gate,
                normalizer,
            }),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.inner.config
    }

    /// Axum router answering every method on every path.
    ///
    /// Paths are matched on the original request URI, so the router can be
    /// nested inside another server without changing the API paths.
    pub fn router(&self) -> Router {
        Router::new()
            .fallback(serve)
            .with_state(self.clone())
            .layer(TraceLayer::new_for_http())
    }

    /// Handle one request synchronously. Performs blocking host calls.
    pub fn handle(&self, request_path: &str, headers: &HeaderMap, body: &[u8]) -> Response {
        match self.dispatch(request_path, headers, body) {
            Ok(json) => {
                (StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], json).into_response()
            }
            Err(err) => {
                match &err {
                    BridgeError::NotFound(source) => {
                        debug!(path = request_path, error = %source, "fs operation: not found");
                    }
                    other => warn!(path = request_path, error = %other, "fs operation failed"),
                }
                err.into_response()
            }
        }
    }

    fn dispatch(
        &self,
        request_path: &str,
        headers: &HeaderMap,
        body: &[u8],
    ) -> BridgeResult<Vec<u8>> {
        let config = &self.inner.config;
        self.inner.gate.check(headers)?;

        let kind = config
            .operation_name(request_path)
            .and_then(OperationKind::from_name)
            .ok_or_else(|| BridgeError::UnknownOperation(request_path.to_string()))?;

        let operation = Operation::decode(kind, body)?;
        if config.debug {
            debug!(%kind, request = ?operation, "fs request");
        }

        let ctx = Context {
            config,
            normalizer: self.inner.normalizer.as_ref(),
            kind,
        };
        let reply = handlers::execute(&ctx, operation)?;
        let json = serde_json::to_vec(&reply).map_err(BridgeError::Encode)?;

        if config.debug {
            debug!(%kind, response = %String::from_utf8_lossy(&json), "fs response");
        }
        Ok(json)
    }
}

async fn serve(
    State(bridge): State<Bridge>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    tokio::task::spawn_blocking(move || bridge.handle(&path, &headers, &body))
        .await
        .unwrap_or_else(|err| {
            BridgeError::Internal(format!("fs operation task failed: {err}")).into_response()
        })
}
