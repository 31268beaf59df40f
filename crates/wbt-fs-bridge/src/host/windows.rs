// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use super::RawDescriptor;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::mem::ManuallyDrop;
use std::os::windows::fs::OpenOptionsExt;
use std::os::windows::io::{FromRawHandle, IntoRawHandle, RawHandle};
use std::path::Path;
use winapi::shared::winerror::ERROR_INVALID_HANDLE;
use winapi::um::handleapi::CloseHandle;
use winapi::um::winnt::FILE_ATTRIBUTE_READONLY;

/// open(2) flags as the page runtime sends them. The runtime speaks
/// Linux numbering, so these keep the Linux values.
pub mod open_flags {
    pub const O_RDONLY: i32 = 0x0;
    pub const O_WRONLY: i32 = 0x1;
    pub const O_RDWR: i32 = 0x2;
    pub const O_CREAT: i32 = 0x40;
    pub const O_EXCL: i32 = 0x80;
    pub const O_TRUNC: i32 = 0x200;
    pub const O_APPEND: i32 = 0x400;
}

const ACCESS_MODE_MASK: i32 = 0x3;

pub(crate) fn raw_handle(fd: RawDescriptor) -> io::Result<RawHandle> {
    let value = isize::try_from(fd)
        .map_err(|_| io::Error::from_raw_os_error(ERROR_INVALID_HANDLE as i32))?;
    Ok(value as RawHandle)
}

/// Borrow a handle as a `File` without taking ownership of it
fn borrowed(fd: RawDescriptor) -> io::Result<ManuallyDrop<File>> {
    let handle = raw_handle(fd)?;
    // SAFETY: ManuallyDrop keeps the File from closing a handle it does not own
    Ok(ManuallyDrop::new(unsafe { File::from_raw_handle(handle) }))
}

/// Translates POSIX-style flags onto `OpenOptions`.
///
/// Creating and truncating need write access here: `O_RDONLY` combined with
/// `O_TRUNC` or `O_CREAT` fails with `InvalidInput`, where Linux would
/// truncate or create the file.
pub fn open(path: &Path, flags: i32, mode: u32) -> io::Result<RawDescriptor> {
    use self::open_flags::*;

    let mut options = OpenOptions::new();
    match flags & ACCESS_MODE_MASK {
        O_WRONLY => options.write(true),
        O_RDWR => options.read(true).write(true),
        _ => options.read(true),
    };
    if flags & O_APPEND != 0 {
        options.append(true);
    }
    if flags & O_TRUNC != 0 {
        options.truncate(true);
    }
    if flags & O_CREAT != 0 {
        if flags & O_EXCL != 0 {
            options.create_new(true);
        } else {
            options.create(true);
        }
        if mode & 0o200 == 0 {
            options.attributes(FILE_ATTRIBUTE_READONLY);
        }
    }

    let file = options.open(path)?;
    Ok(file.into_raw_handle() as isize as RawDescriptor)
}

pub fn close(fd: RawDescriptor) -> io::Result<()> {
    let handle = raw_handle(fd)?;
    if unsafe { CloseHandle(handle as _) } == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Absolute seek from the start of the file
pub fn seek(fd: RawDescriptor, position: i64) -> io::Result<()> {
    let position = u64::try_from(position)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "negative seek position"))?;
    borrowed(fd)?.seek(SeekFrom::Start(position))?;
    Ok(())
}

pub fn read(fd: RawDescriptor, buf: &mut [u8]) -> io::Result<usize> {
    borrowed(fd)?.read(buf)
}

pub fn write(fd: RawDescriptor, buf: &[u8]) -> io::Result<usize> {
    borrowed(fd)?.write(buf)
}

#[cfg(test)]
mod tests {
    use super::open_flags::*;
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn positional_io_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("io.bin");

        let fd = open(&path, O_RDWR | O_CREAT | O_TRUNC, 0o666).unwrap();
        assert_eq!(write(fd, b"1234567890").unwrap(), 10);
        seek(fd, 5).unwrap();
        assert_eq!(write(fd, b"ZZZ").unwrap(), 3);

        seek(fd, 0).unwrap();
        let mut buf = [0u8; 16];
        let n = read(fd, &mut buf).unwrap();
        assert_eq!(&buf[..n], b"12345ZZZ90");
        close(fd).unwrap();
    }

    #[test]
    fn exclusive_create_refuses_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("taken.txt");
        std::fs::write(&path, b"x").unwrap();

        let err = open(&path, O_WRONLY | O_CREAT | O_EXCL, 0o666).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    }

    #[test]
    fn read_only_truncate_is_rejected_and_leaves_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keep.txt");
        std::fs::write(&path, b"keep").unwrap();

        let err = open(&path, O_RDONLY | O_TRUNC, 0).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert_eq!(std::fs::read(&path).unwrap(), b"keep");
    }

    #[test]
    fn negative_seek_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("seek.bin");
        std::fs::write(&path, b"abc").unwrap();

        let fd = open(&path, O_RDONLY, 0).unwrap();
        assert!(seek(fd, -1).is_err());
        close(fd).unwrap();
    }
}
