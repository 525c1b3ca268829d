//! Outbound command handlers, one function per user command.
//!
//! Handlers receive the target server through the [`Context`] and either
//! the argument text as typed or the arguments split on spaces, depending
//! on the shape declared in the registry. Argument bounds are already
//! checked when a handler runs.

pub mod channel;
pub mod connection;
pub mod dcc;
pub mod messaging;
pub mod oper;
pub mod query;

use slirc_proto::LineBuilder;

use super::context::Context;
use crate::error::{HandlerError, HandlerResult};

/// Argument text with surrounding blanks removed, `None` when empty.
pub(crate) fn non_empty(args: Option<&str>) -> Option<&str> {
    args.map(str::trim).filter(|a| !a.is_empty())
}

/// Argument text for commands that cannot run without one.
pub(crate) fn required<'s>(ctx: &Context<'_>, args: Option<&'s str>) -> Result<&'s str, HandlerError> {
    non_empty(args).ok_or_else(|| HandlerError::NeedMoreParams(ctx.command.to_owned()))
}

/// `VERB [args]` with the arguments passed through word by word.
pub(crate) fn passthrough(ctx: &mut Context<'_>, verb: &str, args: Option<&str>) -> HandlerResult {
    ctx.send(LineBuilder::new(verb).raw(non_empty(args).unwrap_or_default()))
}

/// `VERB args` for commands whose arguments are mandatory.
pub(crate) fn passthrough_required(
    ctx: &mut Context<'_>,
    verb: &str,
    args: Option<&str>,
) -> HandlerResult {
    let args = required(ctx, args)?;
    ctx.send(LineBuilder::new(verb).raw(args))
}
