// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Descriptor-level host calls
//!
//! Descriptors are whatever the host hands out (POSIX fds, Windows handles),
//! carried on the wire as integers. The bridge keeps no table of them: it
//! never invents, tracks or recycles a descriptor, and a value that does not
//! fit the host type fails like a closed descriptor would.

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub use self::unix::*;
#[cfg(windows)]
pub use self::windows::*;

/// Descriptor as carried on the wire
pub type RawDescriptor = i64;
