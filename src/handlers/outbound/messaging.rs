//! Messages, notices, actions and CTCP requests.

use chrono::Utc;
use slirc_proto::util::split_first_word;
use slirc_proto::{ChannelExt, LineBuilder};

use super::{non_empty, required};
use crate::display::PrefixKind;
use crate::error::{HandlerError, HandlerResult};
use crate::handlers::context::Context;
use crate::state::ChannelKind;

/// `/msg receiver[,receiver] text`.
///
/// `*` is the current channel or private view. Messages to a channel we
/// have open are echoed there; messages to a nick open a private
/// conversation if needed and are echoed in it.
pub fn msg(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    let args = required(ctx, args)?;
    let (targets, text) = split_first_word(args);
    let text = text.ok_or_else(|| HandlerError::WrongArgCount {
        command: ctx.command.to_owned(),
        min: 2,
        max: None,
    })?;

    for target in targets.split(',').filter(|t| !t.is_empty()) {
        if target == "*" {
            let channel = ctx.view_channel_name()?;
            send_privmsg(ctx, &channel, text)?;
            echo(ctx, &channel, text);
        } else if target.is_channel_name() {
            send_privmsg(ctx, target, text)?;
            if ctx.channel(target).is_some() {
                echo(ctx, target, text);
            }
        } else if is_mask(target) {
            send_privmsg(ctx, target, text)?;
        } else {
            if target.starts_with(':') || target.chars().any(char::is_control) {
                return Err(HandlerError::CannotCreatePrivate(target.to_owned()));
            }
            send_privmsg(ctx, target, text)?;
            ctx.server_mut()?.add_channel(ChannelKind::Private, target);
            echo(ctx, target, text);
        }
    }
    Ok(())
}

/// Server and host masks (`$*.fi`, `#*.edu` is a channel) address many
/// users at once and get no conversation of their own.
fn is_mask(target: &str) -> bool {
    target.starts_with('$') || target.contains(['*', '?'])
}

fn send_privmsg(ctx: &mut Context<'_>, target: &str, text: &str) -> HandlerResult {
    ctx.send(LineBuilder::new("PRIVMSG").param(target).trailing(text))
}

/// Show our own message in an open channel or private view.
fn echo(ctx: &mut Context<'_>, target: &str, text: &str) {
    let Ok(own) = ctx.own_nick() else { return };
    let line = match ctx.channel(target) {
        Some(chan) if chan.is_private() => Some(format!("<{own}> {text}")),
        Some(chan) => chan
            .nick(&own)
            .map(|nick| format!("<{}{}> {text}", nick.flags.prefix(), nick.name)),
        None => return,
    };
    match line {
        Some(line) => ctx.print_channel(target, PrefixKind::Message, &line),
        None => {
            let err = HandlerError::NickNotFound(ctx.command.to_owned());
            ctx.print_error(&err);
        }
    }
}

/// `/me message`: CTCP ACTION to the current view.
pub fn me(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    let text = required(ctx, args)?;
    let channel = ctx.view_channel_name()?;
    ctx.send(LineBuilder::new("PRIVMSG").param(&channel).ctcp("ACTION", Some(text)))?;
    let own = ctx.own_nick()?;
    ctx.print_channel(&channel, PrefixKind::ActionMe, &format!("{own} {text}"));
    Ok(())
}

/// `/notice nickname text`.
pub fn notice(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    let args = required(ctx, args)?;
    let (target, text) = split_first_word(args);
    let line = LineBuilder::new("NOTICE").param(target);
    ctx.send(match text {
        Some(text) => line.trailing(text.strip_prefix(':').unwrap_or(text)),
        None => line,
    })
}

/// `/wallops text`.
pub fn wallops(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    let text = required(ctx, args)?;
    ctx.send(LineBuilder::new("WALLOPS").trailing(text.strip_prefix(':').unwrap_or(text)))
}

/// `/ctcp nickname type [arguments]`.
///
/// `ping` carries the current time so the reply can be timed; any other
/// type is sent upper-cased with the remaining arguments.
pub fn ctcp(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    let args = required(ctx, args)?;
    let (target, rest) = split_first_word(args);
    let rest = rest.ok_or_else(|| HandlerError::NeedMoreParams(ctx.command.to_owned()))?;
    let (kind, payload) = split_first_word(rest);
    let kind = kind.to_ascii_uppercase();

    let line = LineBuilder::new("PRIVMSG").param(target);
    let line = if kind == "PING" {
        let now = Utc::now();
        let stamp = format!("{} {}", now.timestamp(), now.timestamp_subsec_micros());
        line.ctcp(&kind, Some(&stamp))
    } else {
        line.ctcp(&kind, non_empty(payload))
    };
    ctx.send(line)
}
