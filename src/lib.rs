//! # slirc-client
//!
//! Core of a terminal IRC client: the state of every configured server and
//! its channels, the table of inbound and user commands, DCC bookkeeping
//! and the plugin surface.
//!
//! The core is synchronous. A [`Client`] is mutated by one event at a time:
//! a line received from a server ([`Client::receive_line`]), a line typed by
//! the user ([`Client::user_input`]) or a plugin call. [`network::drive`]
//! feeds it from a tokio transport and flushes what each event queued.

pub mod client;
pub mod config;
pub mod display;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod network;
pub mod plugin;
pub mod state;
pub mod telemetry;

pub use client::{Client, Paths};
pub use config::Config;
pub use display::{BufferRef, OutputSink, PrefixKind, StdoutSink, Transcript};
pub use error::{HandlerError, HandlerResult, PluginError};
pub use plugin::{Plugin, PluginApi};
pub use state::View;

/// Client name sent in CTCP VERSION replies.
pub const NAME: &str = "slirc-client";

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
