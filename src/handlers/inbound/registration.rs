//! Registration, keepalive and generic server replies.

use chrono::Utc;
use slirc_proto::{LineBuilder, MessageRef};
use tracing::{debug, info};

use super::arg;
use crate::display::PrefixKind;
use crate::error::HandlerResult;
use crate::handlers::context::Context;
use crate::state::{ConnectionState, View};

/// Informational numerics: the text after our nick goes to the server
/// buffer.
pub fn server_msg(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    let text = msg.args_from(1);
    ctx.print_server(PrefixKind::Server, &text);
    Ok(())
}

/// `001`: registration is complete under the nick the server confirms.
pub fn welcome(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    let nick = arg(ctx, msg, 0)?;
    let server = ctx.server_mut()?;
    server.state = ConnectionState::Registered;
    server.nick = Some(nick.to_owned());
    info!(server = %server.name, nick = %nick, "registered");
    server_msg(ctx, msg)
}

/// `004`: the welcome burst is over; run the configured command and join
/// the autojoin channels.
pub fn myinfo(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    server_msg(ctx, msg)?;

    let index = ctx.server_index()?;
    let (command, autojoin) = {
        let server = ctx.server()?;
        (server.command.clone(), server.autojoin.clone())
    };

    if let Some(command) = command {
        for line in command.split(';').map(str::trim).filter(|l| !l.is_empty()) {
            debug!(command = %line, "running connect command");
            // Failures are already shown by the dispatcher.
            let _ = crate::dispatch::execute_input(ctx.client, View::Server(index), line);
        }
    }
    if let Some(channels) = autojoin.filter(|c| !c.trim().is_empty()) {
        ctx.send(LineBuilder::new("JOIN").raw(&channels))?;
    }
    Ok(())
}

/// `433`: during registration, retry with the next configured nick. Once
/// all three were refused the user has to pick one with `/nick`.
pub fn nick_in_use(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    let server = ctx.server_mut()?;
    if server.state == ConnectionState::Registered {
        let text = msg.args_from(1);
        ctx.print_server(PrefixKind::Error, &text);
        return Ok(());
    }

    let refused = msg
        .arg(1)
        .map_or_else(|| server.current_nick().to_owned(), str::to_owned);
    match server.next_nick().map(str::to_owned) {
        Some(next) => {
            ctx.send(LineBuilder::new("NICK").param(&next))?;
            let text = format!("nickname \"{refused}\" is already in use, trying \"{next}\"");
            ctx.print_server(PrefixKind::Info, &text);
        }
        None => {
            ctx.print_server(
                PrefixKind::Error,
                "all declared nicknames are already in use, use /nick to choose another one",
            );
        }
    }
    Ok(())
}

/// `ERROR` and error numerics are shown, never acted on.
pub fn error(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    let skip = usize::from(msg.is_numeric());
    let text = msg.args_from(skip);
    ctx.print_server(PrefixKind::Error, &text);
    Ok(())
}

/// Answer server keepalives.
pub fn ping(ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
    match msg.arg(0) {
        Some(token) => ctx.send(LineBuilder::new("PONG").trailing(token)),
        None => ctx.send(LineBuilder::new("PONG")),
    }
}

/// Completes a lag check sent by the network driver.
pub fn pong(ctx: &mut Context<'_>, _msg: &MessageRef<'_>) -> HandlerResult {
    let server = ctx.server_mut()?;
    if let Some(lag) = server.finish_lag_check(Utc::now()) {
        debug!(server = %server.name, lag_ms = lag, "lag measured");
    }
    Ok(())
}
