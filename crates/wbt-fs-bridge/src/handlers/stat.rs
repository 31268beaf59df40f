// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use super::Context;
use crate::error::BridgeResult;
use crate::protocol::{FstatRequest, LstatRequest, StatRequest};
use crate::stat::StatAttributes;

pub fn stat(ctx: &Context<'_>, req: StatRequest) -> BridgeResult<StatAttributes> {
    ctx.normalizer.stat(ctx.host_path(&req.path)).map_err(|e| ctx.fail(e))
}

pub fn lstat(ctx: &Context<'_>, req: LstatRequest) -> BridgeResult<StatAttributes> {
    ctx.normalizer.lstat(ctx.host_path(&req.path)).map_err(|e| ctx.fail(e))
}

pub fn fstat(ctx: &Context<'_>, req: FstatRequest) -> BridgeResult<StatAttributes> {
    ctx.normalizer.fstat(req.fd).map_err(|e| ctx.fail(e))
}
