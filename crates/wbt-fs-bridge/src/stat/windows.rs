// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Windows metadata normalization
//!
//! Windows exposes no POSIX permission bits, owners, inodes or link counts
//! here. Permissions are synthesized from the read-only attribute, the
//! directory attribute sets the `S_IFDIR` bit, owners are reported as a fixed
//! non-root id and the remaining fields are zero.
//!
//! The conversions are plain functions over [`FileInfo`] and [`HandleInfo`]
//! so they build and test on every platform; only [`WindowsNormalizer`]
//! touches the Win32 API.

use super::StatAttributes;

/// uid/gid reported for every entry
pub const PLACEHOLDER_ID: u32 = 1000;

/// Directory bit of the POSIX mode (`S_IFDIR`)
pub const MODE_DIRECTORY: u32 = 1 << 14;

const MODE_READ_ONLY: u32 = 0o444;
const MODE_READ_WRITE: u32 = 0o666;

const FILE_ATTRIBUTE_READONLY: u32 = 0x1;
const FILE_ATTRIBUTE_DIRECTORY: u32 = 0x10;

/// FILETIME ticks (100 ns) between 1601-01-01 and 1970-01-01
const FILETIME_UNIX_EPOCH_TICKS: i64 = 116_444_736_000_000_000;
const FILETIME_TICKS_PER_MS: i64 = 10_000;

/// What the generic, path-based file info offers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileInfo {
    pub readonly: bool,
    pub is_dir: bool,
    pub size: u64,
    /// Last modification, milliseconds since the Unix epoch
    pub modified_ms: i64,
}

/// The subset of `BY_HANDLE_FILE_INFORMATION` that is reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandleInfo {
    pub file_attributes: u32,
    pub file_size_high: u32,
    pub file_size_low: u32,
    /// FILETIME values as 64-bit tick counts
    pub creation_time: u64,
    pub last_access_time: u64,
    pub last_write_time: u64,
}

fn synthesized_mode(readonly: bool, is_dir: bool) -> u32 {
    let mut mode = if readonly { MODE_READ_ONLY } else { MODE_READ_WRITE };
    if is_dir {
        mode |= MODE_DIRECTORY;
    }
    mode
}

fn windows_attributes(mode: u32, size: i64) -> StatAttributes {
    StatAttributes {
        mode,
        uid: PLACEHOLDER_ID,
        gid: PLACEHOLDER_ID,
        size,
        ..Default::default()
    }
}

/// Path-based stat/lstat. All three timestamps carry the modification time.
pub fn attributes_from_file_info(info: &FileInfo) -> StatAttributes {
    StatAttributes {
        atime_ms: info.modified_ms,
        mtime_ms: info.modified_ms,
        ctime_ms: info.modified_ms,
        ..windows_attributes(
            synthesized_mode(info.readonly, info.is_dir),
            info.size as i64,
        )
    }
}

/// Handle-based fstat
pub fn attributes_from_handle_info(info: &HandleInfo) -> StatAttributes {
    let size = ((info.file_size_high as i64) << 32) + info.file_size_low as i64;
    let mode = synthesized_mode(
        info.file_attributes & FILE_ATTRIBUTE_READONLY != 0,
        info.file_attributes & FILE_ATTRIBUTE_DIRECTORY != 0,
    );

    StatAttributes {
        atime_ms: filetime_to_unix_ms(info.last_access_time),
        mtime_ms: filetime_to_unix_ms(info.last_write_time),
        ctime_ms: filetime_to_unix_ms(info.creation_time),
        ..windows_attributes(mode, size)
    }
}

/// FILETIME ticks since 1601 to milliseconds since the Unix epoch
pub fn filetime_to_unix_ms(ticks: u64) -> i64 {
    (ticks as i64 - FILETIME_UNIX_EPOCH_TICKS) / FILETIME_TICKS_PER_MS
}

#[cfg(windows)]
pub use self::win32::WindowsNormalizer;

#[cfg(windows)]
mod win32 {
    use super::{attributes_from_file_info, attributes_from_handle_info, FileInfo, HandleInfo};
    use crate::host::{raw_handle, RawDescriptor};
    use crate::stat::{system_time_to_ms, MetadataNormalizer, StatAttributes};
    use std::fs::Metadata;
    use std::io;
    use std::mem::MaybeUninit;
    use std::path::Path;
    use winapi::shared::minwindef::FILETIME;
    use winapi::um::fileapi::{GetFileInformationByHandle, BY_HANDLE_FILE_INFORMATION};

    /// Win32 metadata via `std::fs` and `GetFileInformationByHandle`
    #[derive(Debug, Clone, Copy, Default)]
    pub struct WindowsNormalizer;

    impl MetadataNormalizer for WindowsNormalizer {
        fn stat(&self, path: &Path) -> io::Result<StatAttributes> {
            let meta = std::fs::metadata(path)?;
            Ok(attributes_from_file_info(&file_info(&meta)?))
        }

        fn lstat(&self, path: &Path) -> io::Result<StatAttributes> {
            let meta = std::fs::symlink_metadata(path)?;
            Ok(attributes_from_file_info(&file_info(&meta)?))
        }

        fn fstat(&self, fd: RawDescriptor) -> io::Result<StatAttributes> {
            let handle = raw_handle(fd)?;
            let mut info = MaybeUninit::<BY_HANDLE_FILE_INFORMATION>::uninit();
            // SAFETY: an invalid handle makes the call fail, it never writes
            // outside `info`
            if unsafe { GetFileInformationByHandle(handle as _, info.as_mut_ptr()) } == 0 {
                return Err(io::Error::last_os_error());
            }
            // SAFETY: the call succeeded and filled the structure
            let info = unsafe { info.assume_init() };

            Ok(attributes_from_handle_info(&HandleInfo {
                file_attributes: info.dwFileAttributes,
                file_size_high: info.nFileSizeHigh,
                file_size_low: info.nFileSizeLow,
                creation_time: ticks(&info.ftCreationTime),
                last_access_time: ticks(&info.ftLastAccessTime),
                last_write_time: ticks(&info.ftLastWriteTime),
            }))
        }
    }

    fn file_info(meta: &Metadata) -> io::Result<FileInfo> {
        Ok(FileInfo {
            readonly: meta.permissions().readonly(),
            is_dir: meta.is_dir(),
            size: meta.len(),
            modified_ms: system_time_to_ms(meta.modified()?),
        })
    }

    fn ticks(ft: &FILETIME) -> u64 {
        ((ft.dwHighDateTime as u64) << 32) | ft.dwLowDateTime as u64
    }
}
