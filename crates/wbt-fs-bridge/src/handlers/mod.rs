// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Operation handlers
//!
//! Handlers are synchronous and perform the host call directly; the
//! dispatcher runs them on the blocking pool.

pub mod fd;
pub mod path;
pub mod stat;

use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::protocol::{
    EmptyResponse, OpenResponse, Operation, OperationKind, ReadResponse, ReaddirResponse,
    WriteResponse,
};
use crate::stat::{MetadataNormalizer, StatAttributes};
use serde::Serialize;
use std::io;
use std::path::Path;

/// What a handler needs from the bridge for one request
pub struct Context<'a> {
    pub config: &'a BridgeConfig,
    pub normalizer: &'a dyn MetadataNormalizer,
    pub kind: OperationKind,
}

impl<'a> Context<'a> {
    /// Filesystem path with the API prefix removed
    pub fn host_path<'p>(&self, path: &'p str) -> &'p Path {
        Path::new(self.config.host_path(path))
    }

    /// Classify a failed host call for this operation
    pub fn fail(&self, err: io::Error) -> BridgeError {
        BridgeError::from_os(err, self.kind.reports_not_found())
    }
}

/// Successful handler output, serialized as-is
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Stat(StatAttributes),
    Open(OpenResponse),
    Write(WriteResponse),
    Read(ReadResponse),
    Readdir(ReaddirResponse),
    Empty(EmptyResponse),
}

/// Run a decoded operation against the host
pub fn execute(ctx: &Context<'_>, operation: Operation) -> BridgeResult<Reply> {
    match operation {
        Operation::Stat(req) => stat::stat(ctx, req).map(Reply::Stat),
        Operation::Lstat(req) => stat::lstat(ctx, req).map(Reply::Stat),
        Operation::Fstat(req) => stat::fstat(ctx, req).map(Reply::Stat),
        Operation::Open(req) => fd::open(ctx, req).map(Reply::Open),
        Operation::Close(req) => fd::close(ctx, req).map(Reply::Empty),
        Operation::Write(req) => fd::write(ctx, req).map(Reply::Write),
        Operation::Read(req) => fd::read(ctx, req).map(Reply::Read),
        Operation::Rename(req) => path::rename(ctx, req).map(Reply::Empty),
        Operation::Readdir(req) => path::readdir(ctx, req).map(Reply::Readdir),
        Operation::Mkdir(req) => path::mkdir(ctx, req).map(Reply::Empty),
        Operation::Unlink(req) => path::unlink(ctx, req).map(Reply::Empty),
        Operation::Rmdir(req) => path::rmdir(ctx, req).map(Reply::Empty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replies_serialize_without_a_tag() {
        let open = serde_json::to_value(Reply::Open(OpenResponse { fd: 7 })).unwrap();
        assert_eq!(open, serde_json::json!({ "fd": 7 }));

        let empty = serde_json::to_string(&Reply::Empty(EmptyResponse {})).unwrap();
        assert_eq!(empty, "{}");
    }
}
