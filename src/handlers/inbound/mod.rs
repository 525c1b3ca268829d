//! Inbound reply handlers.
//!
//! Each handler gets one parsed line from the server it arrived on. It
//! updates the mirrored state and prints what the user should see. A
//! malformed line fails only its own handler; the dispatcher reports the
//! error and moves on to the next line.

pub mod channel;
pub mod membership;
pub mod messages;
pub mod registration;
pub mod whois;

use slirc_proto::MessageRef;

use super::context::Context;
use crate::error::HandlerError;

/// Parameter `n`, or `NeedMoreParams`.
pub(crate) fn arg<'m>(
    ctx: &Context<'_>,
    msg: &MessageRef<'m>,
    n: usize,
) -> Result<&'m str, HandlerError> {
    msg.arg(n)
        .ok_or_else(|| HandlerError::NeedMoreParams(ctx.command.to_owned()))
}

/// Nickname of the sender, for lines that only users send.
pub(crate) fn source<'m>(ctx: &Context<'_>, msg: &MessageRef<'m>) -> Result<&'m str, HandlerError> {
    msg.source_nickname().ok_or_else(|| {
        HandlerError::InvalidArgument(format!("\"{}\" without a user source", ctx.command))
    })
}
