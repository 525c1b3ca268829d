//! Channel commands: join, part, kick, topic, modes and names.

use slirc_proto::util::split_first_word;
use slirc_proto::{ChannelExt, LineBuilder};
use tracing::debug;

use super::{non_empty, passthrough_required, required};
use crate::error::{HandlerError, HandlerResult};
use crate::handlers::context::Context;
use crate::state::View;

pub fn join(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    passthrough_required(ctx, "JOIN", args)
}

pub fn mode(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    passthrough_required(ctx, "MODE", args)
}

pub fn invite(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    passthrough_required(ctx, "INVITE", args)
}

/// `/names [channel[,channel]]`, defaulting to the current channel.
pub fn names(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    let target = match non_empty(args) {
        Some(channels) => channels.to_owned(),
        None => ctx.view_public_channel()?,
    };
    ctx.send(LineBuilder::new("NAMES").raw(&target))
}

/// `/part [channel] [message]`.
///
/// Without a channel argument the current view is left. A private view is
/// closed locally and nothing is sent.
pub fn part(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    let args = non_empty(args);
    let (channel, reason) = match args {
        Some(a) if a.is_channel_name() => {
            let (channel, reason) = split_first_word(a);
            (channel.to_owned(), reason)
        }
        _ => {
            let channel = ctx.view_channel_name()?;
            if ctx.channel(&channel).is_some_and(|c| c.is_private()) {
                return close_private(ctx, &channel);
            }
            (channel, args)
        }
    };

    let line = LineBuilder::new("PART").param(&channel);
    ctx.send(match reason {
        Some(reason) => line.trailing(reason),
        None => line,
    })
}

fn close_private(ctx: &mut Context<'_>, name: &str) -> HandlerResult {
    let server = ctx.server.ok_or_else(|| HandlerError::NotConnected(ctx.command.to_owned()))?;
    ctx.server_mut()?.remove_channel(name);
    debug!(channel = %name, "closed private conversation");
    if ctx.client.view.channel_name().is_some_and(|c| c == name) {
        ctx.client.set_view(View::Server(server));
    }
    Ok(())
}

/// `/kick [channel] nickname [comment]`.
pub fn kick(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    let args = required(ctx, args)?;
    let (channel, rest) = match split_first_word(args) {
        (channel, rest) if channel.is_channel_name() => (channel.to_owned(), rest),
        _ => (ctx.view_public_channel()?, Some(args)),
    };
    let rest = rest.ok_or_else(|| HandlerError::NeedMoreParams(ctx.command.to_owned()))?;
    let (nick, comment) = split_first_word(rest);

    let line = LineBuilder::new("KICK").param(&channel).param(nick);
    ctx.send(match comment {
        Some(comment) => line.trailing(comment),
        None => line,
    })
}

/// `/topic [channel] [topic]`. The topic `-delete` clears it.
pub fn topic(ctx: &mut Context<'_>, args: Option<&str>) -> HandlerResult {
    let (channel, topic) = match non_empty(args) {
        Some(a) if a.is_channel_name() => {
            let (channel, topic) = split_first_word(a);
            (Some(channel), topic)
        }
        other => (None, other),
    };
    let channel = match channel {
        Some(channel) => channel.to_owned(),
        None => ctx.view_channel_name()?,
    };

    let line = LineBuilder::new("TOPIC").param(&channel);
    ctx.send(match topic {
        Some("-delete") => line.trailing(""),
        Some(topic) => line.trailing(topic),
        None => line,
    })
}

/// One `MODE <current channel> <change> <nick>` per nick.
fn mode_each(ctx: &mut Context<'_>, change: &str, nicks: &[&str]) -> HandlerResult {
    let channel = ctx.view_public_channel()?;
    for nick in nicks {
        ctx.send(LineBuilder::new("MODE").param(&channel).param(change).param(nick))?;
    }
    Ok(())
}

pub fn op(ctx: &mut Context<'_>, args: &[&str]) -> HandlerResult {
    mode_each(ctx, "+o", args)
}

pub fn deop(ctx: &mut Context<'_>, args: &[&str]) -> HandlerResult {
    mode_each(ctx, "-o", args)
}

pub fn voice(ctx: &mut Context<'_>, args: &[&str]) -> HandlerResult {
    mode_each(ctx, "+v", args)
}

pub fn devoice(ctx: &mut Context<'_>, args: &[&str]) -> HandlerResult {
    mode_each(ctx, "-v", args)
}
