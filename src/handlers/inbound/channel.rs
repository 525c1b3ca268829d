//! Channel state replies: MODE, TOPIC, NAMES, WHO and LIST.

use chrono::{Local, TimeZone};
use slirc_proto::{ChannelExt, MessageRef};
use tracing::debug;

use super::arg;
use crate::display::PrefixKind;
use crate::error::{HandlerError, HandlerResult};
use crate::handlers::context::Context;
use crate::state::{Nick, NickFlags};

fn origin(msg: &MessageRef<'_>) -> String {
    msg.prefix.map(|p| p.to_string()).unwrap_or_default()
}

/// MODE on a channel updates the mirror; user modes are only shown.
pub fn mode(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    let target = arg(ctx, msg, 0)?;
    let modes = arg(ctx, msg, 1)?;
    let params = msg.args().get(2..).unwrap_or_default();
    let by = origin(msg);

    if !target.is_channel_name() {
        ctx.print_server(PrefixKind::Info, &format!("user mode [{modes}] by {by}"));
        return Ok(());
    }

    match ctx.channel_mut(target) {
        Some(chan) => chan.apply_modes(modes, params),
        None => debug!(channel = %target, "mode for a channel we are not on"),
    }

    let mut change = modes.to_owned();
    for param in params {
        change.push(' ');
        change.push_str(param);
    }
    ctx.print_channel(target, PrefixKind::Info, &format!("mode {target} [{change}] by {by}"));
    Ok(())
}

pub fn topic(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    let channel = arg(ctx, msg, 0)?;
    let text = msg.arg(1).filter(|t| !t.is_empty());
    let by = msg.source_nickname().unwrap_or_default();

    if let Some(chan) = ctx.channel_mut(channel) {
        chan.topic = text.map(str::to_owned);
    }
    let line = match text {
        Some(text) => format!("{by} has changed topic for {channel} to: \"{text}\""),
        None => format!("{by} has unset topic for {channel}"),
    };
    ctx.print_channel(channel, PrefixKind::Info, &line);
    Ok(())
}

/// `331`
pub fn no_topic(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    let channel = arg(ctx, msg, 1)?;
    if let Some(chan) = ctx.channel_mut(channel) {
        chan.topic = None;
    }
    ctx.print_channel(channel, PrefixKind::Info, &format!("No topic set for {channel}"));
    Ok(())
}

/// `332`
pub fn topic_reply(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    let channel = arg(ctx, msg, 1)?;
    let text = arg(ctx, msg, 2)?;
    if let Some(chan) = ctx.channel_mut(channel) {
        chan.topic = Some(text.to_owned());
    }
    ctx.print_channel(channel, PrefixKind::Info, &format!("Topic for {channel} is: \"{text}\""));
    Ok(())
}

/// `333`: who set the topic and when. An unparsable timestamp is shown as
/// received.
pub fn topic_who_time(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    let channel = arg(ctx, msg, 1)?;
    let setter = arg(ctx, msg, 2)?;
    let raw_time = msg.arg(3).unwrap_or_default();

    let when = raw_time
        .parse::<i64>()
        .ok()
        .and_then(|secs| Local.timestamp_opt(secs, 0).single())
        .map(|t| t.format("%a, %d %b %Y %H:%M:%S").to_string())
        .unwrap_or_else(|| raw_time.to_owned());
    ctx.print_channel(channel, PrefixKind::Info, &format!("Topic set by {setter}, {when}"));
    Ok(())
}

/// `353`: one batch of names. The channel is the parameter before the
/// names; the optional visibility marker before it is ignored.
pub fn names_reply(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    let count = msg.args().len();
    if count < 3 {
        return Err(HandlerError::NeedMoreParams(ctx.command.to_owned()));
    }
    let channel = arg(ctx, msg, count - 2)?;
    let names = arg(ctx, msg, count - 1)?;

    match ctx.channel_mut(channel) {
        Some(chan) => {
            for token in names.split(' ').filter(|t| !t.is_empty()) {
                let nick = Nick::from_names_token(token);
                chan.add_nick(&nick.name, nick.flags);
            }
        }
        None => {
            let text = format!("Nicks {channel}: [{names}]");
            ctx.print_server(PrefixKind::Server, &text);
        }
    }
    Ok(())
}

/// `366`: end of NAMES, summarised.
pub fn end_of_names(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    let channel = arg(ctx, msg, 1)?;
    let Some(chan) = ctx.channel(channel) else {
        ctx.print_server(PrefixKind::Server, &msg.args_from(1));
        return Ok(());
    };

    let counts = chan.counts();
    let list = chan
        .nicks()
        .iter()
        .map(|n| format!("{}{}", n.flags.prefix(), n.name))
        .collect::<Vec<_>>()
        .join(" ");
    let summary = format!(
        "Channel {channel}: {} nicks ({} ops, {} halfops, {} voices, {} normal)",
        counts.total, counts.ops, counts.halfops, counts.voices, counts.normal
    );
    ctx.print_channel(channel, PrefixKind::Info, &format!("Nicks {channel}: [{list}]"));
    ctx.print_channel(channel, PrefixKind::Info, &summary);
    Ok(())
}

/// `352`: `<me> <channel> <user> <host> <server> <nick> <H|G>[*][@+] :<hops> <realname>`
pub fn who_reply(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    let channel = arg(ctx, msg, 1)?;
    let user = arg(ctx, msg, 2)?;
    let host = arg(ctx, msg, 3)?;
    let nick = arg(ctx, msg, 5)?;
    let status = arg(ctx, msg, 6)?;
    let tail = msg.arg(7).unwrap_or_default();

    if let Some(entry) = ctx.channel_mut(channel).and_then(|c| c.nick_mut(nick)) {
        entry.flags.set(NickFlags::AWAY, status.starts_with('G'));
    }

    let realname = tail.split_once(' ').map_or("", |(_, name)| name);
    let text = format!("{nick} on {channel}: {user}@{host} {status} ({realname})");
    ctx.print_server(PrefixKind::Server, &text);
    Ok(())
}

/// `315`
pub fn end_of_who(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    let text = msg.args_from(1);
    ctx.print_server(PrefixKind::Server, &text);
    Ok(())
}

/// `321`
pub fn list_start(ctx: &mut Context<'_>, _msg: &MessageRef<'_>) -> HandlerResult {
    ctx.print_server(PrefixKind::Server, "Channel             Users  Topic");
    Ok(())
}

/// `322`
pub fn list_entry(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    let channel = arg(ctx, msg, 1)?;
    let users = arg(ctx, msg, 2)?;
    let topic = msg.arg(3).unwrap_or_default();
    let text = format!("{channel:<20}{users:>5}  {topic}");
    ctx.print_server(PrefixKind::Server, &text);
    Ok(())
}

/// `323`
pub fn list_end(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    let text = msg.args_from(1);
    ctx.print_server(PrefixKind::Server, &text);
    Ok(())
}
