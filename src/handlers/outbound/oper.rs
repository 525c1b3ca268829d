//! IRC operator commands.

use slirc_proto::LineBuilder;

use super::passthrough_required;
use crate::error::HandlerResult;
use crate::handlers::context::Context;

pub fn die(ctx: &mut Context<'_>, _args: Option<&str>) -> HandlerResult {
    ctx.send(LineBuilder::new("DIE"))
}

pub fn rehash(ctx: &mut Context<'_>, _args: Option<&str>) -> HandlerResult {
    ctx.send(LineBuilder::new("REHASH"))
}

pub fn restart(ctx: &mut Context<'_>, _args: Option<&str>) -> HandlerResult {
    ctx.send(LineBuilder::new("RESTART"))
}

pub fn kill(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    passthrough_required(ctx, "KILL", args)
}

pub fn squit(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    passthrough_required(ctx, "SQUIT", args)
}
