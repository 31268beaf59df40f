// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Capability token and the security gate in front of every operation
//!
//! The token is also embedded in the page that the browser loads, so anything
//! able to read that page can call the bridge. The gate only keeps other local
//! pages and processes from stumbling onto the filesystem; it is not a trust
//! boundary against a hostile actor.

use crate::error::{BridgeError, BridgeResult};
use axum::http::HeaderMap;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;
use std::fmt;

const TOKEN_BYTES: usize = 32;

/// Per-instance shared secret
#[derive(Clone, PartialEq, Eq)]
pub struct SecurityToken(String);

impl SecurityToken {
    /// Wrap an existing token value
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generate a token from 32 bytes of OS randomness, base64 encoded
    pub fn generate() -> Result<Self, rand::Error> {
        let mut buf = [0u8; TOKEN_BYTES];
        rand::rngs::OsRng.try_fill_bytes(&mut buf)?;
        Ok(Self(STANDARD.encode(buf)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecurityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SecurityToken").field(&"[REDACTED]").finish()
    }
}

/// Rejects requests whose token header does not carry the instance token
#[derive(Debug, Clone)]
pub struct SecurityGate {
    header: String,
    token: SecurityToken,
}

impl SecurityGate {
    pub fn new(header: impl Into<String>, token: SecurityToken) -> Self {
        Self {
            header: header.into(),
            token,
        }
    }

    /// A missing header, a non-ASCII value and a wrong value are all the same
    /// failure.
    pub fn check(&self, headers: &HeaderMap) -> BridgeResult<()> {
        let provided = headers.get(self.header.as_str()).and_then(|h| h.to_str().ok());

        match provided {
            Some(value) if value == self.token.as_str() => Ok(()),
            _ => Err(BridgeError::Unauthorized),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn gate() -> SecurityGate {
        SecurityGate::new("WBT-Token", SecurityToken::new("secret"))
    }

    #[test]
    fn generated_tokens_are_distinct_base64() {
        let a = SecurityToken::generate().unwrap();
        let b = SecurityToken::generate().unwrap();
        assert_ne!(a, b);
        assert_eq!(STANDARD.decode(a.as_str()).unwrap().len(), TOKEN_BYTES);
    }

    #[test]
    fn debug_output_hides_the_token() {
        let token = SecurityToken::new("secret");
        assert!(!format!("{:?}", token).contains("secret"));
    }

    #[test]
    fn matching_token_passes() {
        let mut headers = HeaderMap::new();
        headers.insert("wbt-token", HeaderValue::from_static("secret"));
        assert!(gate().check(&headers).is_ok());
    }

    #[test]
    fn missing_and_wrong_tokens_are_rejected_alike() {
        let missing = gate().check(&HeaderMap::new()).unwrap_err();
        assert!(matches!(missing, BridgeError::Unauthorized));

        let mut headers = HeaderMap::new();
        headers.insert("wbt-token", HeaderValue::from_static("guess"));
        let wrong = gate().check(&headers).unwrap_err();
        assert!(matches!(wrong, BridgeError::Unauthorized));
        assert_eq!(missing.envelope(), wrong.envelope());
    }
}
