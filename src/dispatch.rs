//! Message dispatch pipeline.
//!
//! Two entry points share the registry:
//!
//! - [`dispatch_line`] takes one line received from a server. Pipeline
//!   stages:
//!   1. Parse; a malformed line is logged and dropped
//!   2. Plugin message handlers, in registration order; one of them may
//!      eat the line
//!   3. Registry lookup and the built-in inbound handler
//!   4. Handler errors are printed in the server buffer
//!
//! - [`execute_input`] takes one line typed by the user (or run by a plugin
//!   or a server's connect command) in a given view. Pipeline stages:
//!   1. Split command name from argument text; plain text becomes `msg *`
//!   2. Plugin command handlers take precedence over built-ins
//!   3. Registry lookup, argument count and connection checks
//!   4. The outbound handler, with split or joined arguments
//!   5. Errors are printed in the server buffer and returned
//!
//! Neither path ever closes a connection.

use slirc_proto::{explode, MessageRef};
use tracing::{debug, warn};

use crate::client::Client;
use crate::display::{BufferRef, PrefixKind};
use crate::error::{HandlerError, HandlerResult};
use crate::handlers::registry::{self, OutboundFn};
use crate::handlers::Context;
use crate::plugin::{self, HandlerKind, HandlerOutcome};
use crate::state::View;
use crate::telemetry::{spans, CommandTimer};

/// Process one line received from server `index`.
pub fn dispatch_line(client: &mut Client, index: usize, line: &str) {
    let Some(server_name) = client.server(index).map(|s| s.name.clone()) else {
        warn!(server = index, "line for unknown server dropped");
        return;
    };

    let msg = match MessageRef::parse(line) {
        Ok(msg) => msg,
        Err(e) => {
            warn!(server = %server_name, error = %e, line = %line, "failed to parse line");
            return;
        }
    };
    let command = msg.command.to_ascii_lowercase();

    let span = spans::dispatch(&server_name, &command);
    let _enter = span.enter();
    let _timer = CommandTimer::new(command.clone());
    debug!(raw = %msg.raw, "received");

    // Stage 2: plugins see the line first
    let outcome = plugin::run_handlers(
        client,
        HandlerKind::Message,
        &command,
        Some(server_name.as_str()),
        msg.raw,
    );
    if outcome == HandlerOutcome::Eat {
        debug!("line eaten by plugin");
        return;
    }

    // Stage 3: built-in handler
    let Some(handler) = registry::lookup(&command).and_then(|spec| spec.inbound()) else {
        debug!("no handler for command");
        return;
    };

    let view = client.view.clone();
    let mut ctx = Context::new(client, Some(index), view, &command);
    if let Err(e) = handler(&mut ctx, &msg) {
        debug!(error = %e, code = e.error_code(), "inbound handler failed");
        ctx.print_error(&e);
    }
}

/// Split user input into command name and argument text. `None` for plain
/// text.
fn split_command(text: &str) -> Option<(&str, Option<&str>)> {
    let body = text.strip_prefix('/')?;
    if body.starts_with('/') {
        return None;
    }
    Some(match body.split_once(' ') {
        Some((name, args)) => (name, Some(args).filter(|a| !a.trim().is_empty())),
        None => (body, None),
    })
}

/// Run one line of user input in `view`.
///
/// Text not starting with `/` is sent to the view's channel or private
/// conversation; `//text` sends `/text` literally.
pub fn execute_input(client: &mut Client, view: View, text: &str) -> HandlerResult {
    let text = text.trim_end_matches(['\r', '\n']);
    let (name, args) = match split_command(text) {
        Some(parsed) => parsed,
        None => {
            let message = text.strip_prefix('/').unwrap_or(text);
            if message.is_empty() {
                return Ok(());
            }
            return run_command(client, view, "msg", Some(&format!("* {message}")));
        }
    };
    run_command(client, view, name, args)
}

fn run_command(client: &mut Client, view: View, name: &str, args: Option<&str>) -> HandlerResult {
    let command = name.to_ascii_lowercase();

    // The view's server, or the first server from a core view.
    let index = view
        .server()
        .or_else(|| (!client.servers.is_empty()).then_some(0));
    let server_name = index
        .and_then(|i| client.server(i))
        .map(|s| s.name.clone());

    let span = spans::command(&command, server_name.as_deref());
    let _enter = span.enter();
    let _timer = CommandTimer::new(command.clone());

    if client.plugins.has_command(&command) {
        let outcome = plugin::run_handlers(
            client,
            HandlerKind::Command,
            &command,
            server_name.as_deref(),
            args.unwrap_or_default(),
        );
        if outcome == HandlerOutcome::Failed {
            let buffer = client.buffer_for(&view);
            let text = format!("plugin command \"{command}\" failed");
            client.print(&buffer, PrefixKind::Error, &text);
        }
        return Ok(());
    }

    let result = run_builtin(client, index, view, &command, args);
    if let Err(e) = &result {
        debug!(error = %e, code = e.error_code(), "command failed");
        let buffer = match index {
            Some(i) => client.server_buffer(i),
            None => BufferRef::Core,
        };
        client.print(&buffer, PrefixKind::Error, &e.to_string());
    }
    result
}

fn run_builtin(
    client: &mut Client,
    index: Option<usize>,
    view: View,
    command: &str,
    args: Option<&str>,
) -> HandlerResult {
    let (spec, handler) = registry::lookup(command)
        .and_then(|spec| Some((spec, spec.outbound()?)))
        .ok_or_else(|| HandlerError::UnknownCommand(command.to_owned()))?;

    let split = args.map(|a| explode(a, " ", 0)).unwrap_or_default();
    spec.check_args(split.len())?;

    if spec.needs_connection {
        let connected = index
            .and_then(|i| client.server(i))
            .is_some_and(|s| s.is_connected());
        if !connected {
            return Err(HandlerError::NotConnected(command.to_owned()));
        }
    }

    let mut ctx = Context::new(client, index, view, command);
    match handler {
        OutboundFn::Split(f) => f(&mut ctx, &split),
        OutboundFn::Joined(f) => f(&mut ctx, args),
    }
}

#[cfg(test)]
mod tests {
    use super::split_command;

    #[test]
    fn test_split_command() {
        assert_eq!(split_command("/join #rust"), Some(("join", Some("#rust"))));
        assert_eq!(split_command("/away"), Some(("away", None)));
        assert_eq!(split_command("/away   "), Some(("away", None)));
        assert_eq!(split_command("hello"), None);
        assert_eq!(split_command("//not a command"), None);
    }
}
