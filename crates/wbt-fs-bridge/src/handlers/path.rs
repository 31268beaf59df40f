// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Path operations: rename, readdir, mkdir, unlink, rmdir

use super::Context;
use crate::error::BridgeResult;
use crate::protocol::{
    EmptyResponse, MkdirRequest, ReaddirRequest, ReaddirResponse, RenameRequest, RmdirRequest,
    UnlinkRequest,
};
use std::fs;
use std::path::Path;

pub fn rename(ctx: &Context<'_>, req: RenameRequest) -> BridgeResult<EmptyResponse> {
    fs::rename(ctx.host_path(&req.from), ctx.host_path(&req.to)).map_err(|e| ctx.fail(e))?;
    Ok(EmptyResponse {})
}

/// Entry names in directory order; `.` and `..` are never included
pub fn readdir(ctx: &Context<'_>, req: ReaddirRequest) -> BridgeResult<ReaddirResponse> {
    let entries = fs::read_dir(ctx.host_path(&req.path))
        .and_then(|dir| {
            dir.map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
                .collect::<Result<Vec<_>, _>>()
        })
        .map_err(|e| ctx.fail(e))?;
    Ok(ReaddirResponse { entries })
}

pub fn mkdir(ctx: &Context<'_>, req: MkdirRequest) -> BridgeResult<EmptyResponse> {
    create_dir(ctx.host_path(&req.path), req.perm).map_err(|e| ctx.fail(e))?;
    Ok(EmptyResponse {})
}

#[cfg(unix)]
fn create_dir(path: &Path, perm: u32) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().mode(perm).create(path)
}

/// No permission bits to apply on Windows
#[cfg(windows)]
fn create_dir(path: &Path, _perm: u32) -> std::io::Result<()> {
    fs::create_dir(path)
}

pub fn unlink(ctx: &Context<'_>, req: UnlinkRequest) -> BridgeResult<EmptyResponse> {
    fs::remove_file(ctx.host_path(&req.path)).map_err(|e| ctx.fail(e))?;
    Ok(EmptyResponse {})
}

pub fn rmdir(ctx: &Context<'_>, req: RmdirRequest) -> BridgeResult<EmptyResponse> {
    fs::remove_dir(ctx.host_path(&req.path)).map_err(|e| ctx.fail(e))?;
    Ok(EmptyResponse {})
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BridgeConfig;
    use crate::error::BridgeError;
    use crate::protocol::{OperationKind, PathRequest};
    use crate::stat::MockMetadataNormalizer;
    use tempfile::TempDir;

    fn with_ctx<T>(kind: OperationKind, f: impl FnOnce(&Context<'_>) -> T) -> T {
        let config = BridgeConfig::default();
        let normalizer = MockMetadataNormalizer::new();
        f(&Context {
            config: &config,
            normalizer: &normalizer,
            kind,
        })
    }

    fn path_of(dir: &TempDir, name: &str) -> String {
        dir.path().join(name).to_string_lossy().into_owned()
    }

    #[test]
    fn rename_moves_the_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();

        with_ctx(OperationKind::Rename, |ctx| {
            rename(
                ctx,
                RenameRequest {
                    from: path_of(&dir, "a.txt"),
                    to: path_of(&dir, "b.txt"),
                },
            )
        })
        .unwrap();

        assert!(!dir.path().join("a.txt").exists());
        assert_eq!(fs::read(dir.path().join("b.txt")).unwrap(), b"a");
    }

    #[test]
    fn rename_of_missing_source_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = with_ctx(OperationKind::Rename, |ctx| {
            rename(
                ctx,
                RenameRequest {
                    from: path_of(&dir, "nope"),
                    to: path_of(&dir, "b.txt"),
                },
            )
        })
        .unwrap_err();
        assert!(matches!(err, BridgeError::NotFound(_)));
    }

    #[test]
    fn readdir_lists_entry_names() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("one"), b"").unwrap();
        fs::create_dir(dir.path().join("two")).unwrap();

        let mut entries = with_ctx(OperationKind::Readdir, |ctx| {
            readdir(
                ctx,
                PathRequest {
                    path: dir.path().to_string_lossy().into_owned(),
                },
            )
        })
        .unwrap()
        .entries;
        entries.sort();
        assert_eq!(entries, ["one", "two"]);
    }

    #[test]
    fn readdir_of_missing_directory_is_generic() {
        let dir = TempDir::new().unwrap();
        let err = with_ctx(OperationKind::Readdir, |ctx| {
            readdir(
                ctx,
                PathRequest {
                    path: path_of(&dir, "missing"),
                },
            )
        })
        .unwrap_err();
        assert!(matches!(err, BridgeError::Os(_)));
    }

    #[test]
    fn mkdir_then_rmdir() {
        let dir = TempDir::new().unwrap();
        let target = path_of(&dir, "sub");

        with_ctx(OperationKind::Mkdir, |ctx| {
            mkdir(
                ctx,
                MkdirRequest {
                    path: target.clone(),
                    perm: 0o755,
                },
            )
        })
        .unwrap();
        assert!(dir.path().join("sub").is_dir());

        with_ctx(OperationKind::Rmdir, |ctx| {
            rmdir(
                ctx,
                PathRequest {
                    path: target.clone(),
                },
            )
        })
        .unwrap();
        assert!(!dir.path().join("sub").exists());

        let err = with_ctx(OperationKind::Rmdir, |ctx| {
            rmdir(ctx, PathRequest { path: target })
        })
        .unwrap_err();
        assert!(matches!(err, BridgeError::NotFound(_)));
    }

    #[cfg(unix)]
    #[test]
    fn mkdir_applies_permission_bits() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        with_ctx(OperationKind::Mkdir, |ctx| {
            mkdir(
                ctx,
                MkdirRequest {
                    path: path_of(&dir, "private"),
                    perm: 0o700,
                },
            )
        })
        .unwrap();

        let mode = fs::metadata(dir.path().join("private")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }

    #[test]
    fn unlink_of_missing_file_is_generic() {
        let dir = TempDir::new().unwrap();
        let err = with_ctx(OperationKind::Unlink, |ctx| {
            unlink(
                ctx,
                PathRequest {
                    path: path_of(&dir, "missing"),
                },
            )
        })
        .unwrap_err();
        assert!(matches!(err, BridgeError::Os(_)));
    }
}
