//! Membership changes: JOIN, PART, KICK, QUIT and NICK.
//!
//! Each of these distinguishes our own nick, which opens or tears down
//! channels locally, from other users, who are only added to or removed
//! from nick lists.

use slirc_proto::{irc_eq, LineBuilder, MessageRef};
use tracing::debug;

use super::{arg, source};
use crate::display::PrefixKind;
use crate::error::HandlerResult;
use crate::handlers::context::Context;
use crate::state::{ChannelKind, NickFlags, View};

fn user_host(msg: &MessageRef<'_>) -> String {
    msg.prefix
        .and_then(|p| p.user_host())
        .unwrap_or_default()
}

pub fn join(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    let nick = source(ctx, msg)?;
    let channel = arg(ctx, msg, 0)?;
    let index = ctx.server_index()?;

    let server = ctx.server_mut()?;
    if server.is_self(nick) {
        server.add_channel(ChannelKind::Channel, channel);
        ctx.client.set_view(View::channel(index, channel));
    } else {
        match server.channel_mut(channel) {
            Some(chan) => {
                chan.add_nick(nick, NickFlags::empty());
            }
            None => debug!(channel = %channel, "join for a channel we are not on"),
        }
    }

    let text = format!("{nick} ({}) has joined {channel}", user_host(msg));
    ctx.print_channel(channel, PrefixKind::Join, &text);
    Ok(())
}

pub fn part(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    let nick = source(ctx, msg)?;
    let channel = arg(ctx, msg, 0)?;
    let reason = msg.arg(1).filter(|r| !r.is_empty());
    let index = ctx.server_index()?;

    let mut text = format!("{nick} ({}) has left {channel}", user_host(msg));
    if let Some(reason) = reason {
        text.push_str(&format!(" ({reason})"));
    }
    // Print before a self-part closes the channel buffer.
    ctx.print_channel(channel, PrefixKind::Part, &text);

    let server = ctx.server_mut()?;
    if server.is_self(nick) {
        server.remove_channel(channel);
        let viewing = ctx.client.view.channel_name().is_some_and(|c| irc_eq(c, channel));
        if viewing {
            ctx.client.set_view(View::Server(index));
        }
    } else if let Some(chan) = server.channel_mut(channel) {
        chan.remove_nick(nick);
    }
    Ok(())
}

/// KICK. Being kicked keeps the channel open but empty; with autorejoin
/// we join again, with the key if one is known.
pub fn kick(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    let by = source(ctx, msg)?;
    let channel = arg(ctx, msg, 0)?;
    let target = arg(ctx, msg, 1)?;
    let reason = msg.arg(2).filter(|r| !r.is_empty()).unwrap_or(by);

    let server = ctx.server_mut()?;
    if server.is_self(target) {
        let autorejoin = server.autorejoin;
        let key = server.channel_mut(channel).and_then(|chan| {
            chan.clear_nicks();
            chan.key.clone()
        });
        let text = format!("You have been kicked from {channel} by {by} ({reason})");
        ctx.print_channel(channel, PrefixKind::Part, &text);
        if autorejoin {
            ctx.send(LineBuilder::new("JOIN").param(channel).param_opt(key.as_deref()))?;
        }
    } else {
        if let Some(chan) = server.channel_mut(channel) {
            chan.remove_nick(target);
        }
        let text = format!("{by} has kicked {target} from {channel} ({reason})");
        ctx.print_channel(channel, PrefixKind::Part, &text);
    }
    Ok(())
}

/// QUIT: the nick leaves every channel on this server.
pub fn quit(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    let nick = source(ctx, msg)?;
    let reason = msg.arg(0).unwrap_or_default();
    let text = format!("{nick} ({}) has quit ({reason})", user_host(msg));

    let server = ctx.server_mut()?;
    let mut seen_in = Vec::new();
    for chan in &mut server.channels {
        let present = if chan.is_private() {
            irc_eq(&chan.name, nick)
        } else {
            chan.remove_nick(nick).is_some()
        };
        if present {
            seen_in.push(chan.name.clone());
        }
    }

    for channel in seen_in {
        ctx.print_channel(&channel, PrefixKind::Quit, &text);
    }
    Ok(())
}

/// NICK: rename in every channel of this server, keeping flags. A private
/// conversation with the old nick follows the rename, and merges into an
/// existing conversation with the new nick.
pub fn nick(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    let old = source(ctx, msg)?;
    let new = arg(ctx, msg, 0)?;

    let server = ctx.server_mut()?;
    let own = server.is_self(old);
    if own {
        server.nick = Some(new.to_owned());
    }

    let mut seen_in = Vec::new();
    let merges_private = !irc_eq(old, new)
        && server
            .channels
            .iter()
            .any(|c| c.is_private() && irc_eq(&c.name, new));
    if merges_private {
        let before = server.channels.len();
        server
            .channels
            .retain(|c| !(c.is_private() && irc_eq(&c.name, old)));
        if server.channels.len() < before {
            debug!(old = %old, new = %new, "private buffer merged");
            seen_in.push(new.to_owned());
        }
    }
    for chan in &mut server.channels {
        let renamed = if chan.is_private() {
            let matches = irc_eq(&chan.name, old);
            if matches {
                chan.name = new.to_owned();
            }
            matches
        } else {
            chan.rename_nick(old, new)
        };
        if renamed {
            seen_in.push(chan.name.clone());
        }
    }

    let index = ctx.server_index()?;
    if let View::Channel { server, channel } = &mut ctx.client.view {
        if *server == index && irc_eq(channel, old) {
            *channel = new.to_owned();
        }
    }

    let text = if own {
        format!("You are now known as {new}")
    } else {
        format!("{old} is now known as {new}")
    };
    if seen_in.is_empty() {
        ctx.print_server(PrefixKind::Info, &text);
    }
    for channel in seen_in {
        ctx.print_channel(&channel, PrefixKind::Info, &text);
    }
    Ok(())
}
