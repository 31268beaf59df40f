// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Descriptor operations: open, close, write, read

use super::Context;
use crate::error::{BridgeError, BridgeResult};
use crate::host;
use crate::protocol::{
    CloseRequest, EmptyResponse, OpenRequest, OpenResponse, ReadRequest, ReadResponse,
    WriteRequest, WriteResponse,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Largest `length` a single read accepts
pub const MAX_READ_LENGTH: usize = 64 * 1024 * 1024;

pub fn open(ctx: &Context<'_>, req: OpenRequest) -> BridgeResult<OpenResponse> {
    let fd = host::open(ctx.host_path(&req.path), req.flags, req.mode).map_err(|e| ctx.fail(e))?;
    Ok(OpenResponse { fd })
}

pub fn close(ctx: &Context<'_>, req: CloseRequest) -> BridgeResult<EmptyResponse> {
    host::close(req.fd).map_err(|e| ctx.fail(e))?;
    Ok(EmptyResponse {})
}

/// Writes the whole decoded buffer; `length` is not consulted
pub fn write(ctx: &Context<'_>, req: WriteRequest) -> BridgeResult<WriteResponse> {
    if req.offset != 0 {
        return Err(BridgeError::UnsupportedOffset {
            operation: "write",
            offset: req.offset,
        });
    }
    let data = STANDARD.decode(req.buffer.as_bytes())?;

    if let Some(position) = req.position {
        host::seek(req.fd, position).map_err(|e| ctx.fail(e))?;
    }
    let written = host::write(req.fd, &data).map_err(|e| ctx.fail(e))?;
    Ok(WriteResponse { written })
}

pub fn read(ctx: &Context<'_>, req: ReadRequest) -> BridgeResult<ReadResponse> {
    if req.offset != 0 {
        return Err(BridgeError::UnsupportedOffset {
            operation: "read",
            offset: req.offset,
        });
    }
    let mut buf = read_buffer(req.length)?;

    if let Some(position) = req.position {
        host::seek(req.fd, position).map_err(|e| ctx.fail(e))?;
    }
    let read = host::read(req.fd, &mut buf).map_err(|e| ctx.fail(e))?;
    buf.truncate(read);

    Ok(ReadResponse {
        read,
        buffer: STANDARD.encode(&buf),
    })
}

/// Zeroed buffer for one read; lengths past [`MAX_READ_LENGTH`] or that cannot
/// be allocated are invalid arguments
fn read_buffer(length: i64) -> BridgeResult<Vec<u8>> {
    let invalid = || BridgeError::InvalidArgument(format!("read length {length}"));

    let length = usize::try_from(length).map_err(|_| invalid())?;
    if length > MAX_READ_LENGTH {
        return Err(invalid());
    }
    let mut buf = Vec::new();
    buf.try_reserve_exact(length).map_err(|_| invalid())?;
    buf.resize(length, 0);
    Ok(buf)
}
