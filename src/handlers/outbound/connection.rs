//! Connection-level commands: nick, away, quit, ping and raw lines.

use slirc_proto::format::{strip_line_breaks, truncate_text};
use slirc_proto::{LineBuilder, MAX_LINE_LEN};

use super::{non_empty, passthrough_required, required};
use crate::error::{HandlerError, HandlerResult};
use crate::handlers::context::Context;

fn away_line(message: Option<&str>) -> LineBuilder {
    match message {
        Some(message) => LineBuilder::new("AWAY").trailing(message),
        None => LineBuilder::new("AWAY"),
    }
}

/// `/away [-all] [message]`. No message clears the away status.
pub fn away(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    let args = non_empty(args);
    let all = args
        .and_then(|a| a.strip_prefix("-all"))
        .filter(|rest| rest.is_empty() || rest.starts_with(' '));

    match all {
        Some(rest) => {
            let message = non_empty(Some(rest));
            for server in ctx.client.servers.iter_mut().filter(|s| s.is_connected()) {
                server.send(away_line(message))?;
            }
            Ok(())
        }
        None => ctx.send(away_line(args)),
    }
}

pub fn nick(ctx: &mut Context<'_>, args: &[&str]) -> HandlerResult {
    let nick = args
        .first()
        .ok_or_else(|| HandlerError::NeedMoreParams(ctx.command.to_owned()))?;
    ctx.send(LineBuilder::new("NICK").param(nick))
}

/// `/quit [message]`: leave every connected server and stop the client.
pub fn quit(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    let default = ctx
        .client
        .options
        .string("irc_default_msg_quit")
        .filter(|m| !m.is_empty())
        .map(str::to_owned);
    let message = non_empty(args).map(str::to_owned).or(default);

    for server in ctx.client.servers.iter_mut().filter(|s| s.is_connected()) {
        let line = match &message {
            Some(message) => LineBuilder::new("QUIT").trailing(message),
            None => LineBuilder::new("QUIT"),
        };
        server.send(line)?;
    }
    ctx.client.quit_requested = true;
    Ok(())
}

pub fn ping(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    passthrough_required(ctx, "PING", args)
}

pub fn pong(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    passthrough_required(ctx, "PONG", args)
}

pub fn oper(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    passthrough_required(ctx, "OPER", args)
}

pub fn service(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    passthrough_required(ctx, "SERVICE", args)
}

/// `/quote data`: the text goes out as typed, minus line breaks.
pub fn quote(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    let data = strip_line_breaks(required(ctx, args)?);
    let data = truncate_text(&data, MAX_LINE_LEN - 2).to_owned();
    ctx.send_line(data)
}
