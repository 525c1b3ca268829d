//! Server and user queries.
//!
//! Most of these pass the user's arguments through unchanged; the server
//! does the work and the replies come back through the inbound handlers.

use slirc_proto::LineBuilder;

use super::{non_empty, passthrough, passthrough_required};
use crate::display::PrefixKind;
use crate::error::HandlerResult;
use crate::handlers::context::Context;

pub fn admin(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    passthrough(ctx, "ADMIN", args)
}

pub fn info(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    passthrough(ctx, "INFO", args)
}

pub fn links(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    passthrough(ctx, "LINKS", args)
}

pub fn list(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    passthrough(ctx, "LIST", args)
}

pub fn lusers(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    passthrough(ctx, "LUSERS", args)
}

pub fn motd(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    passthrough(ctx, "MOTD", args)
}

pub fn servlist(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    passthrough(ctx, "SERVLIST", args)
}

pub fn stats(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    passthrough(ctx, "STATS", args)
}

pub fn time(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    passthrough(ctx, "TIME", args)
}

pub fn trace(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    passthrough(ctx, "TRACE", args)
}

pub fn users(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    passthrough(ctx, "USERS", args)
}

pub fn who(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    passthrough(ctx, "WHO", args)
}

pub fn whois(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    passthrough_required(ctx, "WHOIS", args)
}

pub fn whowas(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    passthrough_required(ctx, "WHOWAS", args)
}

pub fn userhost(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    passthrough_required(ctx, "USERHOST", args)
}

pub fn ison(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    passthrough_required(ctx, "ISON", args)
}

pub fn summon(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    passthrough_required(ctx, "SUMMON", args)
}

pub fn squery(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    passthrough_required(ctx, "SQUERY", args)
}

/// `/version [server | nickname]`.
///
/// A nick present in the current channel gets a CTCP VERSION; anything
/// else is a server query. Without arguments our own version is shown
/// before asking the server for its one.
pub fn version(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    match non_empty(args) {
        Some(target) => {
            let nick_in_channel = ctx
                .view_public_channel()
                .ok()
                .and_then(|name| ctx.channel(&name))
                .is_some_and(|chan| chan.nick(target).is_some());
            if nick_in_channel {
                ctx.send(LineBuilder::new("PRIVMSG").param(target).ctcp("VERSION", None))
            } else {
                ctx.send(LineBuilder::new("VERSION").param(target))
            }
        }
        None => {
            let text = format!("{} {}", crate::NAME, crate::VERSION);
            ctx.print_server(PrefixKind::Info, &text);
            ctx.send(LineBuilder::new("VERSION"))
        }
    }
}
