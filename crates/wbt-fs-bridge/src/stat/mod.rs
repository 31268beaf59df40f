// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Uniform file metadata for stat, lstat and fstat
//!
//! Host metadata comes in different shapes per platform (a POSIX `struct stat`,
//! Windows generic file info, Windows `BY_HANDLE_FILE_INFORMATION`). Each shape
//! is normalized into [`StatAttributes`], the one schema the page runtime
//! understands. Handlers only see the [`MetadataNormalizer`] trait; the host
//! implementation is picked at build time by [`host_normalizer`].

#[cfg(unix)]
pub mod posix;
pub mod windows;

use crate::host::RawDescriptor;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Metadata in the shape the page runtime expects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatAttributes {
    pub dev: u64,
    pub ino: u64,
    pub mode: u32,
    pub nlink: u64,
    pub uid: u32,
    pub gid: u32,
    pub rdev: u64,
    pub size: i64,
    pub blksize: i64,
    pub blocks: i64,
    /// Milliseconds since the Unix epoch
    pub atime_ms: i64,
    pub mtime_ms: i64,
    pub ctime_ms: i64,
}

/// Produces [`StatAttributes`] from the host's metadata calls
#[cfg_attr(test, mockall::automock)]
pub trait MetadataNormalizer: Send + Sync {
    /// Metadata for `path`, following symlinks
    fn stat(&self, path: &Path) -> io::Result<StatAttributes>;

    /// Metadata for `path` itself, without following a final symlink
    fn lstat(&self, path: &Path) -> io::Result<StatAttributes>;

    /// Metadata for an open descriptor
    fn fstat(&self, fd: RawDescriptor) -> io::Result<StatAttributes>;
}

#[cfg(unix)]
pub type HostNormalizer = posix::PosixNormalizer;

#[cfg(windows)]
pub type HostNormalizer = windows::WindowsNormalizer;

/// Normalizer for the platform this binary was built for
pub fn host_normalizer() -> Arc<dyn MetadataNormalizer> {
    Arc::new(HostNormalizer::default())
}

/// `(seconds, nanoseconds)` to whole milliseconds
pub fn timespec_to_ms(sec: i64, nsec: i64) -> i64 {
    sec * 1000 + nsec / 1_000_000
}

/// Milliseconds since the Unix epoch, negative before it
pub fn system_time_to_ms(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(since) => since.as_millis() as i64,
        Err(err) => -(err.duration().as_millis() as i64),
    }
}
