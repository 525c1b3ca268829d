//! Unified error handling for slirc-client.
//!
//! Three families: usage and protocol failures of a single command
//! ([`HandlerError`]), failures seen by plugin code through the API façade
//! ([`PluginError`]), and configuration loading ([`ConfigError`], defined
//! next to the config types). None of them ever closes a connection.

use thiserror::Error;

pub use crate::config::{ConfigError, ValidationError};

// ============================================================================
// Handler Errors (command processing)
// ============================================================================

/// Errors raised while running one user command or inbound handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    #[error("wrong argument count for \"{command}\" command")]
    WrongArgCount {
        command: String,
        min: usize,
        max: Option<usize>,
    },

    #[error("\"{0}\" command requires a connected server")]
    NotConnected(String),

    #[error("\"{0}\" command can not be executed on a server window")]
    NoChannelContext(String),

    #[error("\"{0}\" command can only be executed in a channel window")]
    InvalidContext(String),

    #[error("unknown command \"{0}\"")]
    UnknownCommand(String),

    #[error("not enough parameters for \"{0}\"")]
    NeedMoreParams(String),

    #[error("nick not found for \"{0}\" command")]
    NickNotFound(String),

    #[error("cannot create new private window \"{0}\"")]
    CannotCreatePrivate(String),

    #[error("server \"{0}\" not found")]
    NoSuchServer(String),

    #[error("channel \"{0}\" not found")]
    NoSuchChannel(String),

    #[error("DCC #{0} not found")]
    NoSuchTransfer(u32),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl HandlerError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::WrongArgCount { .. } => "wrong_arg_count",
            Self::NotConnected(_) => "not_connected",
            Self::NoChannelContext(_) => "no_channel_context",
            Self::InvalidContext(_) => "invalid_context",
            Self::UnknownCommand(_) => "unknown_command",
            Self::NeedMoreParams(_) => "need_more_params",
            Self::NickNotFound(_) => "nick_not_found",
            Self::CannotCreatePrivate(_) => "cannot_create_private",
            Self::NoSuchServer(_) => "no_such_server",
            Self::NoSuchChannel(_) => "no_such_channel",
            Self::NoSuchTransfer(_) => "no_such_transfer",
            Self::InvalidArgument(_) => "invalid_argument",
        }
    }

    /// True for errors caused by how the user typed the command, as opposed
    /// to the state the client is in.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::WrongArgCount { .. }
                | Self::NoChannelContext(_)
                | Self::InvalidContext(_)
                | Self::UnknownCommand(_)
                | Self::NeedMoreParams(_)
                | Self::InvalidArgument(_)
        )
    }
}

/// Result type for command and reply handlers.
pub type HandlerResult<T = ()> = Result<T, HandlerError>;

// ============================================================================
// Plugin Errors (API façade)
// ============================================================================

/// Errors returned to plugin code. Every lookup miss is reported here rather
/// than substituted with a default.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("server \"{0}\" not found")]
    ServerNotFound(String),

    #[error("channel \"{0}\" not found")]
    ChannelNotFound(String),

    #[error("no buffer for server/channel ({server}/{channel})")]
    BufferNotFound { server: String, channel: String },

    #[error("unknown info \"{0}\"")]
    UnknownInfo(String),

    #[error("unknown option \"{0}\"")]
    UnknownOption(String),

    #[error("invalid value \"{value}\" for option \"{option}\"")]
    InvalidValue { option: String, value: String },

    #[error("path \"{0}\" is not inside the home directory")]
    InvalidPath(String),

    #[error("handler {0} not found")]
    HandlerNotFound(u64),

    #[error("command \"{0}\" is already handled by a plugin")]
    CommandExists(String),

    #[error("plugin \"{0}\" is already loaded")]
    AlreadyLoaded(String),

    #[error("plugin \"{0}\" is not loaded")]
    NotLoaded(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("plugin config: {0}")]
    Config(#[from] ConfigError),

    #[error("snapshot allocation failed")]
    Snapshot,
}

impl PluginError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ServerNotFound(_) => "server_not_found",
            Self::ChannelNotFound(_) => "channel_not_found",
            Self::BufferNotFound { .. } => "buffer_not_found",
            Self::UnknownInfo(_) => "unknown_info",
            Self::UnknownOption(_) => "unknown_option",
            Self::InvalidValue { .. } => "invalid_value",
            Self::InvalidPath(_) => "invalid_path",
            Self::HandlerNotFound(_) => "handler_not_found",
            Self::CommandExists(_) => "command_exists",
            Self::AlreadyLoaded(_) => "already_loaded",
            Self::NotLoaded(_) => "not_loaded",
            Self::Io(_) => "io",
            Self::Config(_) => "config",
            Self::Snapshot => "snapshot",
        }
    }
}
