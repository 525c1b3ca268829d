//! `/dcc`: the entry point for file transfers and chats.
//!
//! Creating a transfer only records it as waiting; connecting and moving
//! data is the transport's job.

use std::path::PathBuf;

use slirc_proto::explode;

use super::required;
use crate::display::PrefixKind;
use crate::error::{HandlerError, HandlerResult};
use crate::handlers::context::Context;
use crate::state::DccKind;

/// `/dcc send|chat nickname [file]` or `/dcc close id`.
pub fn dcc(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    let args = required(ctx, args)?;
    let words = explode(args, " ", 3);
    let need_more = || HandlerError::NeedMoreParams("dcc".to_owned());
    let action = words.first().copied().ok_or_else(need_more)?;

    match action.to_ascii_lowercase().as_str() {
        "send" => {
            let nick = words.get(1).copied().ok_or_else(need_more)?;
            let file = words.get(2).copied().ok_or_else(need_more)?;
            let server = ctx.server_name();
            let transfer = ctx.client.dcc.create(DccKind::FileSend, Some(&server), Some(nick));
            transfer.filename = Some(file.to_owned());
            transfer.local_filename = Some(PathBuf::from(file));
            let text = format!("DCC #{}: offering \"{file}\" to {nick}", transfer.id);
            ctx.print_server(PrefixKind::Info, &text);
            Ok(())
        }
        "chat" => {
            let nick = words.get(1).copied().ok_or_else(need_more)?;
            let server = ctx.server_name();
            let id = ctx.client.dcc.create(DccKind::ChatSend, Some(&server), Some(nick)).id;
            ctx.print_server(PrefixKind::Info, &format!("DCC #{id}: chat with {nick}"));
            Ok(())
        }
        "close" => {
            let raw = words.get(1).copied().ok_or_else(need_more)?;
            let id: u32 = raw
                .parse()
                .map_err(|_| HandlerError::InvalidArgument(format!("invalid DCC id \"{raw}\"")))?;
            let transfer = ctx.client.dcc.cancel(id)?;
            let text = format!("DCC #{}: {}", transfer.id, transfer.status.as_str());
            ctx.print_server(PrefixKind::Info, &text);
            Ok(())
        }
        other => Err(HandlerError::InvalidArgument(format!("unknown DCC action \"{other}\""))),
    }
}
