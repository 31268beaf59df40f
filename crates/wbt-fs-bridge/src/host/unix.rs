// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use super::RawDescriptor;
use std::ffi::CString;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::RawFd;
use std::path::Path;

/// open(2) flags as the page runtime sends them
pub mod open_flags {
    pub use libc::{O_APPEND, O_CREAT, O_EXCL, O_RDONLY, O_RDWR, O_TRUNC, O_WRONLY};
}

pub(crate) fn c_path(path: &Path) -> io::Result<CString> {
    CString::new(path.as_os_str().as_bytes())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "path contains a NUL byte"))
}

pub(crate) fn raw_fd(fd: RawDescriptor) -> io::Result<RawFd> {
    RawFd::try_from(fd).map_err(|_| io::Error::from_raw_os_error(libc::EBADF))
}

fn check(ret: libc::c_int) -> io::Result<libc::c_int> {
    if ret == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(ret)
    }
}

fn check_len(ret: libc::ssize_t) -> io::Result<usize> {
    if ret < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(ret as usize)
    }
}

/// open(2) with the caller's raw flags and mode
pub fn open(path: &Path, flags: i32, mode: u32) -> io::Result<RawDescriptor> {
    let c_path = c_path(path)?;
    let fd = check(unsafe { libc::open(c_path.as_ptr(), flags, mode as libc::c_uint) })?;
    Ok(fd as RawDescriptor)
}

pub fn close(fd: RawDescriptor) -> io::Result<()> {
    let fd = raw_fd(fd)?;
    check(unsafe { libc::close(fd) })?;
    Ok(())
}

/// Absolute seek from the start of the file
pub fn seek(fd: RawDescriptor, position: i64) -> io::Result<()> {
    let fd = raw_fd(fd)?;
    if unsafe { libc::lseek(fd, position as libc::off_t, libc::SEEK_SET) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

pub fn read(fd: RawDescriptor, buf: &mut [u8]) -> io::Result<usize> {
    let fd = raw_fd(fd)?;
    check_len(unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) })
}

pub fn write(fd: RawDescriptor, buf: &[u8]) -> io::Result<usize> {
    let fd = raw_fd(fd)?;
    check_len(unsafe { libc::write(fd, buf.as_ptr().cast(), buf.len()) })
}
