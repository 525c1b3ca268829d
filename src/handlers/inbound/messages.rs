//! PRIVMSG and NOTICE, including CTCP requests and DCC offers.

use slirc_proto::{ChannelExt, Ctcp, CtcpKind, LineBuilder, MessageRef};
use tracing::{debug, warn};

use super::{arg, source};
use crate::display::PrefixKind;
use crate::error::HandlerResult;
use crate::handlers::context::Context;
use crate::state::{ChannelKind, DccOffer};

/// Where a message to `target` from `nick` is displayed. Messages to us
/// open a private conversation with the sender.
fn conversation(ctx: &mut Context<'_>, target: &str, nick: &str) -> HandlerResult<String> {
    if target.is_channel_name() {
        return Ok(target.to_owned());
    }
    let chan = ctx.server_mut()?.add_channel(ChannelKind::Private, nick);
    Ok(chan.name.clone())
}

pub fn privmsg(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    let nick = source(ctx, msg)?;
    let target = arg(ctx, msg, 0)?;
    let text = arg(ctx, msg, 1)?;

    if let Some(ctcp) = Ctcp::parse(text) {
        return ctcp_request(ctx, nick, target, &ctcp);
    }

    let window = conversation(ctx, target, nick)?;
    let prefix = ctx
        .channel(&window)
        .and_then(|chan| chan.nick(nick))
        .map(|n| n.flags.prefix())
        .unwrap_or_default();
    ctx.print_channel(&window, PrefixKind::Message, &format!("<{prefix}{nick}> {text}"));
    Ok(())
}

fn ctcp_request(ctx: &mut Context<'_>, nick: &str, target: &str, ctcp: &Ctcp<'_>) -> HandlerResult {
    match &ctcp.kind {
        CtcpKind::Action => {
            let window = conversation(ctx, target, nick)?;
            let text = format!("{nick} {}", ctcp.params.unwrap_or_default());
            ctx.print_channel(&window, PrefixKind::Action, &text);
        }
        CtcpKind::Version => {
            let reply = format!("{} v{}", crate::NAME, crate::VERSION);
            ctx.send(LineBuilder::new("NOTICE").param(nick).ctcp("VERSION", Some(&reply)))?;
            ctx.print_server(PrefixKind::Info, &format!("CTCP VERSION received from {nick}"));
        }
        CtcpKind::Ping => {
            ctx.send(LineBuilder::new("NOTICE").param(nick).ctcp("PING", ctcp.params))?;
            ctx.print_server(PrefixKind::Info, &format!("CTCP PING received from {nick}"));
        }
        CtcpKind::Dcc => {
            let params = ctcp.params.unwrap_or_default();
            let Some(offer) = DccOffer::parse(params) else {
                warn!(from = %nick, params = %params, "malformed DCC offer");
                ctx.print_server(PrefixKind::Error, &format!("invalid DCC offer from {nick}"));
                return Ok(());
            };
            let pending = ctx.client.dcc.pending_offers();
            let cap = ctx.client.options.integer("dcc_max_pending").unwrap_or(16);
            if i64::try_from(pending).unwrap_or(i64::MAX) >= cap {
                warn!(from = %nick, pending, "too many pending DCC offers");
                let text = format!("DCC offer from {nick} refused: {pending} offers already waiting");
                ctx.print_server(PrefixKind::Error, &text);
                return Ok(());
            }
            let server = ctx.server_name();
            let transfer = ctx.client.dcc.accept_offer(&offer, &server, nick);
            let text = if offer.kind.is_chat() {
                format!("DCC #{}: chat request from {nick}", transfer.id)
            } else {
                format!(
                    "DCC #{}: {nick} offers \"{}\" ({} bytes)",
                    transfer.id, offer.filename, offer.size
                )
            };
            ctx.print_server(PrefixKind::Info, &text);
        }
        CtcpKind::Unknown(kind) => {
            debug!(from = %nick, kind = %kind, "unknown CTCP");
            let text = format!("unknown CTCP {kind} received from {nick}");
            ctx.print_server(PrefixKind::Info, &text);
        }
        _ => {}
    }
    Ok(())
}

/// NOTICE. Server notices and CTCP replies go to the server buffer; notices
/// from users go there too unless `irc_notice_as_pv` is on.
pub fn notice(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    let text = msg.trailing().unwrap_or_default();
    let Some(nick) = msg.source_nickname() else {
        ctx.print_server(PrefixKind::Server, text);
        return Ok(());
    };

    if let Some(ctcp) = Ctcp::parse(text) {
        let reply = format!(
            "CTCP {} reply from {nick}: {}",
            ctcp.kind.as_str(),
            ctcp.params.unwrap_or_default()
        );
        ctx.print_server(PrefixKind::Info, &reply);
        return Ok(());
    }

    let target = arg(ctx, msg, 0)?;
    if !target.is_channel_name() && ctx.client.options.bool("irc_notice_as_pv") {
        let window = conversation(ctx, target, nick)?;
        ctx.print_channel(&window, PrefixKind::Message, &format!("-{nick}- {text}"));
    } else {
        ctx.print_server(PrefixKind::Message, &format!("-{nick}- {text}"));
    }
    Ok(())
}
