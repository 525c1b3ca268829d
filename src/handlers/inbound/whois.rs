//! Replies about users: WHOIS, WHOWAS, AWAY, USERHOST, ISON and VERSION.
//!
//! WHOIS numerics all carry `<me> <nick> ...` and are rendered as
//! `[nick] ...` lines in the server buffer.

use chrono::{Local, TimeZone};
use slirc_proto::MessageRef;

use super::arg;
use crate::display::PrefixKind;
use crate::error::HandlerResult;
use crate::handlers::context::Context;

fn whois_line(ctx: &mut Context<'_>, nick: &str, text: &str) {
    ctx.print_server(PrefixKind::Server, &format!("[{nick}] {text}"));
}

/// `301`: shown in the private conversation with that nick if one is open.
pub fn away(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    let nick = arg(ctx, msg, 1)?;
    let reason = msg.arg(2).unwrap_or_default();
    let text = format!("{nick} is away: {reason}");
    ctx.print_channel(nick, PrefixKind::Info, &text);
    Ok(())
}

/// `302`: one line per `nick[*]=(+|-)user@host` entry.
pub fn userhost(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    let replies = arg(ctx, msg, 1)?;
    for entry in replies.split(' ').filter(|e| !e.is_empty()) {
        match entry.split_once('=') {
            Some((nick, host)) => {
                let host = host.trim_start_matches(['+', '-']);
                ctx.print_server(PrefixKind::Server, &format!("{nick} = {host}"));
            }
            None => ctx.print_server(PrefixKind::Server, entry),
        }
    }
    Ok(())
}

/// `303`
pub fn ison(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    let nicks = msg.arg(1).unwrap_or_default().trim();
    let text = if nicks.is_empty() {
        "Users online: none".to_owned()
    } else {
        format!("Users online: {nicks}")
    };
    ctx.print_server(PrefixKind::Server, &text);
    Ok(())
}

/// `305`
pub fn unaway(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    let server = ctx.server_mut()?;
    server.is_away = false;
    server.away_since = None;
    let text = msg.args_from(1);
    ctx.print_server(PrefixKind::Server, &text);
    Ok(())
}

/// `306`
pub fn now_away(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    let server = ctx.server_mut()?;
    server.is_away = true;
    server.away_since = Some(Local::now());
    let text = msg.args_from(1);
    ctx.print_server(PrefixKind::Server, &text);
    Ok(())
}

/// `311`: `<me> <nick> <user> <host> * :<realname>`
pub fn whois_user(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    let nick = arg(ctx, msg, 1)?;
    let user = arg(ctx, msg, 2)?;
    let host = arg(ctx, msg, 3)?;
    let realname = msg.arg(5).unwrap_or_default();
    whois_line(ctx, nick, &format!("({user}@{host}): {realname}"));
    Ok(())
}

/// `312`
pub fn whois_server(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    let nick = arg(ctx, msg, 1)?;
    let server = arg(ctx, msg, 2)?;
    let info = msg.arg(3).unwrap_or_default();
    whois_line(ctx, nick, &format!("{server} ({info})"));
    Ok(())
}

/// `313`, `320` and anything else of the form `<me> <nick> :<text>`.
fn whois_text(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    let nick = arg(ctx, msg, 1)?;
    let text = msg.args_from(2);
    whois_line(ctx, nick, &text);
    Ok(())
}

pub fn whois_operator(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    whois_text(ctx, msg)
}

pub fn whois_identified(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    whois_text(ctx, msg)
}

/// `314`: same layout as `311`.
pub fn whowas_user(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    let nick = arg(ctx, msg, 1)?;
    let user = arg(ctx, msg, 2)?;
    let host = arg(ctx, msg, 3)?;
    let realname = msg.arg(5).unwrap_or_default();
    whois_line(ctx, nick, &format!("({user}@{host}) was {realname}"));
    Ok(())
}

fn format_idle(seconds: u64) -> String {
    let (days, rest) = (seconds / 86_400, seconds % 86_400);
    let (hours, rest) = (rest / 3600, rest % 3600);
    let (minutes, seconds) = (rest / 60, rest % 60);
    if days > 0 {
        format!("{days} days {hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }
}

/// `317`: `<me> <nick> <idle secs> [<signon>] :seconds idle[, signon time]`
pub fn whois_idle(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    let nick = arg(ctx, msg, 1)?;
    let idle = arg(ctx, msg, 2)?;

    let mut text = match idle.parse::<u64>() {
        Ok(secs) => format!("idle: {}", format_idle(secs)),
        Err(_) => format!("idle: {idle}"),
    };
    // Servers that omit the signon time put the text in its place.
    let signon = msg
        .arg(3)
        .and_then(|s| s.parse::<i64>().ok())
        .and_then(|secs| Local.timestamp_opt(secs, 0).single());
    if let Some(signon) = signon {
        text.push_str(&format!(", signon at: {}", signon.format("%a, %d %b %Y %H:%M:%S")));
    }
    whois_line(ctx, nick, &text);
    Ok(())
}

/// `318`
pub fn end_of_whois(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    whois_text(ctx, msg)
}

/// `319`
pub fn whois_channels(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    let nick = arg(ctx, msg, 1)?;
    let channels = msg.arg(2).unwrap_or_default().trim();
    whois_line(ctx, nick, &format!("Channels: {channels}"));
    Ok(())
}

/// `351`: `<me> <version> <server> :<comments>`
pub fn version_reply(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    let version = arg(ctx, msg, 1)?;
    let server = arg(ctx, msg, 2)?;
    let text = match msg.arg(3).filter(|c| !c.is_empty()) {
        Some(comments) => format!("{server} {version} ({comments})"),
        None => format!("{server} {version}"),
    };
    ctx.print_server(PrefixKind::Server, &text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::format_idle;

    #[test]
    fn test_format_idle() {
        assert_eq!(format_idle(59), "00:00:59");
        assert_eq!(format_idle(3_725), "01:02:05");
        assert_eq!(format_idle(90_061), "1 days 01:01:01");
    }
}
