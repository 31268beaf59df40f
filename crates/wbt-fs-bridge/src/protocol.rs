// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Wire protocol: request/response bodies and the operation table
//!
//! Every request field falls back to its zero value when absent and unknown
//! fields are ignored, matching what the page runtime sends. Descriptors are
//! raw OS values (POSIX fds, Windows handles) carried as integers.

use crate::error::{BridgeError, BridgeResult};
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request naming a single path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathRequest {
    pub path: String,
}

pub type StatRequest = PathRequest;
pub type LstatRequest = PathRequest;
pub type ReaddirRequest = PathRequest;
pub type UnlinkRequest = PathRequest;
pub type RmdirRequest = PathRequest;

/// Request naming a single descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FdRequest {
    pub fd: i64,
}

pub type FstatRequest = FdRequest;
pub type CloseRequest = FdRequest;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenRequest {
    pub path: String,
    /// Host open(2) flag bitmask
    pub flags: i32,
    /// Permission bits used when the file is created
    pub mode: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenResponse {
    pub fd: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteRequest {
    pub fd: i64,
    /// Base64 (standard alphabet, padded) payload
    pub buffer: String,
    /// Offset into `buffer`; only 0 is supported
    pub offset: i64,
    /// Informational; the whole decoded buffer is written
    pub length: i64,
    /// Absolute file position to seek to before writing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteResponse {
    pub written: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadRequest {
    pub fd: i64,
    /// Offset into the caller's buffer; only 0 is supported
    pub offset: i64,
    /// Maximum number of bytes to read
    pub length: i64,
    /// Absolute file position to seek to before reading
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadResponse {
    pub read: usize,
    /// Base64 of exactly the bytes read
    pub buffer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenameRequest {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaddirResponse {
    /// Entry names in directory order
    pub entries: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MkdirRequest {
    pub path: String,
    pub perm: u32,
}

/// `{}` body for operations without a payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyResponse {}

/// Fixed operation table, one entry per API path suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Stat,
    Lstat,
    Fstat,
    Open,
    Close,
    Write,
    Read,
    Rename,
    Readdir,
    Mkdir,
    Unlink,
    Rmdir,
}

impl OperationKind {
    pub const ALL: [OperationKind; 12] = [
        OperationKind::Stat,
        OperationKind::Lstat,
        OperationKind::Fstat,
        OperationKind::Open,
        OperationKind::Close,
        OperationKind::Write,
        OperationKind::Read,
        OperationKind::Rename,
        OperationKind::Readdir,
        OperationKind::Mkdir,
        OperationKind::Unlink,
        OperationKind::Rmdir,
    ];

    /// Exact match on the path suffix
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            OperationKind::Stat => "stat",
            OperationKind::Lstat => "lstat",
            OperationKind::Fstat => "fstat",
            OperationKind::Open => "open",
            OperationKind::Close => "close",
            OperationKind::Write => "write",
            OperationKind::Read => "read",
            OperationKind::Rename => "rename",
            OperationKind::Readdir => "readdir",
            OperationKind::Mkdir => "mkdir",
            OperationKind::Unlink => "unlink",
            OperationKind::Rmdir => "rmdir",
        }
    }

    /// Whether a missing path is reported as `ENOENT` rather than the
    /// generic code
    pub fn reports_not_found(self) -> bool {
        matches!(
            self,
            OperationKind::Open
                | OperationKind::Stat
                | OperationKind::Lstat
                | OperationKind::Rename
                | OperationKind::Rmdir
        )
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded request, ready to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Stat(StatRequest),
    Lstat(LstatRequest),
    Fstat(FstatRequest),
    Open(OpenRequest),
    Close(CloseRequest),
    Write(WriteRequest),
    Read(ReadRequest),
    Rename(RenameRequest),
    Readdir(ReaddirRequest),
    Mkdir(MkdirRequest),
    Unlink(UnlinkRequest),
    Rmdir(RmdirRequest),
}

impl Operation {
    /// Decode a JSON body into the request type of `kind`.
    ///
    /// Only the first JSON value is read and anything after it is ignored.
    /// `null` yields a request with every field at its zero value. An empty
    /// body is a decode error.
    pub fn decode(kind: OperationKind, body: &[u8]) -> BridgeResult<Self> {
        fn parse<T: DeserializeOwned + Default>(body: &[u8]) -> BridgeResult<T> {
            let mut values = serde_json::Deserializer::from_slice(body).into_iter::<Option<T>>();
            match values.next() {
                Some(value) => Ok(value.map_err(BridgeError::Decode)?.unwrap_or_default()),
                None => Err(BridgeError::Decode(de::Error::custom("empty request body"))),
            }
        }

        Ok(match kind {
            OperationKind::Stat => Operation::Stat(parse(body)?),
            OperationKind::Lstat => Operation::Lstat(parse(body)?),
            OperationKind::Fstat => Operation::Fstat(parse(body)?),
            OperationKind::Open => Operation::Open(parse(body)?),
            OperationKind::Close => Operation::Close(parse(body)?),
            OperationKind::Write => Operation::Write(parse(body)?),
            OperationKind::Read => Operation::Read(parse(body)?),
            OperationKind::Rename => Operation::Rename(parse(body)?),
            OperationKind::Readdir => Operation::Readdir(parse(body)?),
            OperationKind::Mkdir => Operation::Mkdir(parse(body)?),
            OperationKind::Unlink => Operation::Unlink(parse(body)?),
            OperationKind::Rmdir => Operation::Rmdir(parse(body)?),
        })
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Stat(_) => OperationKind::Stat,
            Operation::Lstat(_) => OperationKind::Lstat,
            Operation::Fstat(_) => OperationKind::Fstat,
            Operation::Open(_) => OperationKind::Open,
            Operation::Close(_) => OperationKind::Close,
            Operation::Write(_) => OperationKind::Write,
            Operation::Read(_) => OperationKind::Read,
            Operation::Rename(_) => OperationKind::Rename,
            Operation::Readdir(_) => OperationKind::Readdir,
            Operation::Mkdir(_) => OperationKind::Mkdir,
            Operation::Unlink(_) => OperationKind::Unlink,
            Operation::Rmdir(_) => OperationKind::Rmdir,
        }
    }
}
