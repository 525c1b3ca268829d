//! Main event loop for a server connection.
//!
//! Wraps the transport in a [`LineCodec`] and multiplexes three sources:
//! lines from the server, lines typed by the user, and the lag check timer.
//! Every event runs synchronously against the [`Client`]; the outbound
//! queue of the driven server is flushed after each one.

use std::time::Duration;

use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use slirc_proto::{LineCodec, ProtocolError};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::codec::Framed;
use tracing::{debug, info, warn, Instrument};

use crate::client::Client;
use crate::telemetry::spans;

/// What the select loop does after one event.
enum SelectResult {
    /// Flush queued lines and keep going.
    Continue,
    /// The server closed the stream.
    Eof,
    /// The transport failed.
    Failed(ProtocolError),
}

/// Drive server `index` over `stream` until the server closes it, the
/// transport fails, or `/quit` is run.
///
/// Login lines queued by [`Client::connect`] are flushed first. Lines
/// arriving on `input` run as user input in the active view.
pub async fn drive<S>(
    client: &mut Client,
    index: usize,
    stream: S,
    mut input: mpsc::UnboundedReceiver<String>,
) -> Result<(), ProtocolError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let Some((name, address)) = client.server(index).map(|s| (s.name.clone(), s.address.clone())) else {
        warn!(server = index, "drive called for unknown server");
        return Ok(());
    };
    let span = spans::connection(&name, &address);

    async move {
        let mut transport = Framed::new(stream, LineCodec::new());
        let mut lag_timer = lag_timer(client);

        if let Err(e) = flush(client, index, &mut transport).await {
            client.disconnected(index);
            return Err(e);
        }
        info!("connection loop started");

        loop {
            let select_result = tokio::select! {
                frame = transport.next() => match frame {
                    Some(Ok(line)) => {
                        client.receive_line(index, &line);
                        SelectResult::Continue
                    }
                    Some(Err(e)) => SelectResult::Failed(e),
                    None => SelectResult::Eof,
                },

                Some(line) = input.recv() => {
                    // Errors were already printed by the dispatcher.
                    if let Err(e) = client.user_input(&line) {
                        debug!(error = %e, "user command failed");
                    }
                    SelectResult::Continue
                }

                () = tick(&mut lag_timer) => {
                    check_lag(client, index);
                    SelectResult::Continue
                }
            };

            match select_result {
                SelectResult::Continue => {}
                SelectResult::Eof => {
                    info!("server closed the connection");
                    client.disconnected(index);
                    return Ok(());
                }
                SelectResult::Failed(e) => {
                    warn!(error = %e, "transport error");
                    client.disconnected(index);
                    return Err(e);
                }
            }

            if let Err(e) = flush(client, index, &mut transport).await {
                warn!(error = %e, "write failed");
                client.disconnected(index);
                return Err(e);
            }

            if client.quit_requested {
                info!("quit requested, closing connection");
                client.disconnected(index);
                return Ok(());
            }
        }
    }
    .instrument(span)
    .await
}

/// Send every line queued on server `index`.
async fn flush<S>(
    client: &mut Client,
    index: usize,
    transport: &mut Framed<S, LineCodec>,
) -> Result<(), ProtocolError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let Some(server) = client.server_mut(index) else {
        return Ok(());
    };
    let lines = server.take_outbound();
    if lines.is_empty() {
        return Ok(());
    }
    for line in lines {
        debug!(line = %line.trim_end(), "sending");
        transport.feed(line).await?;
    }
    transport.flush().await
}

/// Timer for the `irc_lag_check` interval; `None` when lag checks are off.
fn lag_timer(client: &Client) -> Option<Interval> {
    let secs = client
        .options
        .integer("irc_lag_check")
        .filter(|s| *s > 0)?;
    let period = Duration::from_secs(u64::try_from(secs).ok()?);
    let mut timer = tokio::time::interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    Some(timer)
}

/// Resolves on the next timer tick, never when there is no timer.
async fn tick(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Send a lag check unless the previous one is still unanswered.
fn check_lag(client: &mut Client, index: usize) {
    let Some(server) = client.server_mut(index) else {
        return;
    };
    if !server.is_registered() || server.lag_check_sent.is_some() {
        return;
    }
    if let Err(e) = server.start_lag_check(Utc::now()) {
        warn!(error = %e, "failed to queue lag check");
    }
}
