//! Handler context.
//!
//! Defines the `Context` passed to every outbound and inbound handler: the
//! client, the server the command runs against, the view it was issued
//! from and the command name used in error messages.

use slirc_proto::LineBuilder;

use crate::client::Client;
use crate::display::{BufferRef, PrefixKind};
use crate::error::{HandlerError, HandlerResult};
use crate::state::{Channel, ChannelKind, Server, View};

/// Context passed to each handler.
pub struct Context<'a> {
    pub client: &'a mut Client,
    /// Target server, by index into `client.servers`.
    pub server: Option<usize>,
    /// View the command was issued from, or the active view for inbound
    /// lines.
    pub view: View,
    /// Lowercase command name.
    pub command: &'a str,
}

impl<'a> Context<'a> {
    pub fn new(client: &'a mut Client, server: Option<usize>, view: View, command: &'a str) -> Self {
        Self {
            client,
            server,
            view,
            command,
        }
    }

    fn not_connected(&self) -> HandlerError {
        HandlerError::NotConnected(self.command.to_owned())
    }

    /// Index of the target server.
    pub fn server_index(&self) -> Result<usize, HandlerError> {
        self.server.ok_or_else(|| self.not_connected())
    }

    pub fn server(&self) -> Result<&Server, HandlerError> {
        self.server
            .and_then(|i| self.client.servers.get(i))
            .ok_or_else(|| self.not_connected())
    }

    pub fn server_mut(&mut self) -> Result<&mut Server, HandlerError> {
        let err = self.not_connected();
        self.server
            .and_then(|i| self.client.servers.get_mut(i))
            .ok_or(err)
    }

    /// Queue a built line on the target server.
    pub fn send(&mut self, builder: LineBuilder) -> HandlerResult {
        self.server_mut()?.send(builder)
    }

    pub fn send_line(&mut self, line: impl Into<String>) -> HandlerResult {
        self.server_mut()?.send_line(line)
    }

    /// Our nick on the target server.
    pub fn own_nick(&self) -> Result<String, HandlerError> {
        Ok(self.server()?.current_nick().to_owned())
    }

    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.server().ok()?.channel(name)
    }

    pub fn channel_mut(&mut self, name: &str) -> Option<&mut Channel> {
        self.server_mut().ok()?.channel_mut(name)
    }

    // ------------------------------------------------------------------
    // View resolution
    // ------------------------------------------------------------------

    fn view_channel(&self) -> Result<&Channel, HandlerError> {
        match &self.view {
            View::Core | View::Server(_) => {
                Err(HandlerError::NoChannelContext(self.command.to_owned()))
            }
            View::Channel { server, channel } => self
                .server
                .filter(|s| s == server)
                .and_then(|_| self.channel(channel))
                .ok_or_else(|| HandlerError::InvalidContext(self.command.to_owned())),
        }
    }

    /// Name of the channel or private conversation the command was issued
    /// from.
    ///
    /// Fails with `NoChannelContext` on a server view and with
    /// `InvalidContext` when the view's channel is not open on the target
    /// server.
    pub fn view_channel_name(&self) -> Result<String, HandlerError> {
        self.view_channel().map(|c| c.name.clone())
    }

    /// Like [`view_channel_name`](Self::view_channel_name), but private
    /// conversations are rejected with `InvalidContext`.
    pub fn view_public_channel(&self) -> Result<String, HandlerError> {
        let channel = self.view_channel()?;
        if channel.kind == ChannelKind::Private {
            return Err(HandlerError::InvalidContext(self.command.to_owned()));
        }
        Ok(channel.name.clone())
    }

    // ------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------

    pub fn server_buffer(&self) -> BufferRef {
        match self.server {
            Some(i) => self.client.server_buffer(i),
            None => BufferRef::Core,
        }
    }

    /// Buffer of a channel on the target server, or the server buffer when
    /// the channel is not open.
    pub fn channel_buffer(&self, channel: &str) -> BufferRef {
        match self.channel(channel) {
            Some(chan) => BufferRef::channel(&self.server_name(), &chan.name),
            None => self.server_buffer(),
        }
    }

    pub fn server_name(&self) -> String {
        self.server()
            .map(|s| s.name.clone())
            .unwrap_or_default()
    }

    pub fn print_server(&mut self, prefix: PrefixKind, text: &str) {
        let buffer = self.server_buffer();
        self.client.print(&buffer, prefix, text);
    }

    pub fn print_channel(&mut self, channel: &str, prefix: PrefixKind, text: &str) {
        let buffer = self.channel_buffer(channel);
        self.client.print(&buffer, prefix, text);
    }

    /// Report an error in the server buffer without failing the handler.
    pub fn print_error(&mut self, err: &HandlerError) {
        self.print_server(PrefixKind::Error, &err.to_string());
    }
}
