// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! POSIX `struct stat` normalization

use super::{timespec_to_ms, MetadataNormalizer, StatAttributes};
use crate::host::{self, RawDescriptor};
use std::io;
use std::mem::MaybeUninit;
use std::path::Path;

/// Copies `struct stat` fields straight through
#[derive(Debug, Clone, Copy, Default)]
pub struct PosixNormalizer;

impl MetadataNormalizer for PosixNormalizer {
    fn stat(&self, path: &Path) -> io::Result<StatAttributes> {
        let c_path = host::c_path(path)?;
        stat_with(|buf| unsafe { libc::stat(c_path.as_ptr(), buf) })
    }

    fn lstat(&self, path: &Path) -> io::Result<StatAttributes> {
        let c_path = host::c_path(path)?;
        stat_with(|buf| unsafe { libc::lstat(c_path.as_ptr(), buf) })
    }

    fn fstat(&self, fd: RawDescriptor) -> io::Result<StatAttributes> {
        let fd = host::raw_fd(fd)?;
        stat_with(|buf| unsafe { libc::fstat(fd, buf) })
    }
}

fn stat_with(call: impl FnOnce(*mut libc::stat) -> libc::c_int) -> io::Result<StatAttributes> {
    let mut buf = MaybeUninit::<libc::stat>::uninit();
    if call(buf.as_mut_ptr()) != 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: the call returned 0, so the kernel filled the buffer
    let st = unsafe { buf.assume_init() };
    Ok(attributes_from_stat(&st))
}

/// Field widths of `struct stat` differ between Linux and macOS, hence the casts
#[allow(clippy::unnecessary_cast)]
pub fn attributes_from_stat(st: &libc::stat) -> StatAttributes {
    StatAttributes {
        dev: st.st_dev as u64,
        ino: st.st_ino as u64,
        mode: st.st_mode as u32,
        nlink: st.st_nlink as u64,
        uid: st.st_uid,
        gid: st.st_gid,
        rdev: st.st_rdev as u64,
        size: st.st_size as i64,
        blksize: st.st_blksize as i64,
        blocks: st.st_blocks as i64,
        atime_ms: timespec_to_ms(st.st_atime as i64, st.st_atime_nsec as i64),
        mtime_ms: timespec_to_ms(st.st_mtime as i64, st.st_mtime_nsec as i64),
        ctime_ms: timespec_to_ms(st.st_ctime as i64, st.st_ctime_nsec as i64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stat::system_time_to_ms;
    use std::os::unix::fs::{MetadataExt, PermissionsExt};
    use tempfile::TempDir;

    #[test]
    fn stat_matches_std_metadata() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, b"some data").unwrap();

        let attrs = PosixNormalizer.stat(&path).unwrap();
        let meta = std::fs::metadata(&path).unwrap();

        assert_eq!(attrs.size, 9);
        assert_eq!(attrs.ino, meta.ino());
        assert_eq!(attrs.dev, meta.dev());
        assert_eq!(attrs.mode, meta.mode());
        assert_eq!(attrs.uid, meta.uid());
        assert_eq!(attrs.nlink, 1);
        assert_eq!(attrs.mtime_ms, system_time_to_ms(meta.modified().unwrap()));
    }

    #[test]
    fn lstat_does_not_follow_symlinks() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("target.txt");
        let link = dir.path().join("link.txt");
        std::fs::write(&target, b"0123456789").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let followed = PosixNormalizer.stat(&link).unwrap();
        let own = PosixNormalizer.lstat(&link).unwrap();

        assert_eq!(followed.size, 10);
        assert_eq!(followed.mode & libc::S_IFMT as u32, libc::S_IFREG as u32);
        assert_eq!(own.mode & libc::S_IFMT as u32, libc::S_IFLNK as u32);
    }

    #[test]
    fn fstat_reports_the_open_file() {
        use std::os::unix::io::AsRawFd;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("open.txt");
        std::fs::write(&path, b"abc").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();
        let file = std::fs::File::open(&path).unwrap();

        let attrs = PosixNormalizer.fstat(file.as_raw_fd() as RawDescriptor).unwrap();
        assert_eq!(attrs.size, 3);
        assert_eq!(attrs.mode & 0o777, 0o640);
    }

    #[test]
    fn missing_path_and_bad_descriptor_fail() {
        let dir = TempDir::new().unwrap();
        let err = PosixNormalizer.stat(&dir.path().join("missing")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);

        assert!(PosixNormalizer.fstat(i64::MAX).is_err());
        assert!(PosixNormalizer.fstat(-1).is_err());
    }
}
