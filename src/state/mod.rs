//! Client-side mirror of the IRC world.
//!
//! Servers own their channels, channels own their nicks. DCC transfers
//! live in one list owned by the client. [`View`] names whatever the user is
//! currently looking at and is how commands find their implicit target.

mod channel;
mod dcc;
mod server;

pub use channel::{Channel, ChannelKind, Nick, NickCounts, NickFlags};
pub use dcc::{DccKind, DccList, DccOffer, DccStatus, DccTransfer};
pub use server::{ConnectionState, Server};

/// The active view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum View {
    /// The top-level buffer.
    #[default]
    Core,
    /// A server buffer, by index into the client's server list.
    Server(usize),
    /// A channel or private conversation on a server.
    Channel { server: usize, channel: String },
}

impl View {
    pub fn channel(server: usize, channel: &str) -> Self {
        Self::Channel {
            server,
            channel: channel.to_owned(),
        }
    }

    /// Index of the server this view belongs to.
    pub fn server(&self) -> Option<usize> {
        match self {
            Self::Core => None,
            Self::Server(server) | Self::Channel { server, .. } => Some(*server),
        }
    }

    pub fn channel_name(&self) -> Option<&str> {
        match self {
            Self::Channel { channel, .. } => Some(channel),
            _ => None,
        }
    }
}
