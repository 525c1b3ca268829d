//! Owned copies of client state handed to plugins.
//!
//! A snapshot shares nothing with the live state: plugins can keep it as
//! long as they like and drop it whenever they want. Every allocation made
//! while copying is fallible, and a failure drops whatever was already
//! copied before returning [`PluginError::Snapshot`].

use std::net::Ipv4Addr;
use std::path::Path;

use chrono::{DateTime, Local};

use crate::error::PluginError;
use crate::state::{Channel, ChannelKind, DccKind, DccStatus, DccTransfer, Nick, NickFlags, Server};

/// Copy of one DCC transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct DccInfo {
    pub id: u32,
    /// Empty when the transfer is not tied to a server.
    pub server: String,
    pub channel: String,
    pub kind: DccKind,
    pub status: DccStatus,
    pub start_time: DateTime<Local>,
    pub start_transfer: Option<DateTime<Local>>,
    pub addr: Option<Ipv4Addr>,
    pub port: u16,
    pub nick: String,
    pub filename: String,
    pub local_filename: String,
    pub filename_suffix: u32,
    pub size: u64,
    pub pos: u64,
    pub start_resume: u64,
    pub bytes_per_sec: u64,
}

/// Copy of one server's configuration and connection state.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerInfo {
    pub name: String,
    pub autoconnect: bool,
    pub autoreconnect: bool,
    pub autoreconnect_delay: u32,
    pub address: String,
    pub port: u16,
    pub ipv6: bool,
    pub ssl: bool,
    pub password: String,
    pub nick1: String,
    pub nick2: String,
    pub nick3: String,
    pub username: String,
    pub realname: String,
    pub command: String,
    pub command_delay: u32,
    pub autojoin: String,
    pub autorejoin: bool,
    pub notify_levels: String,
    pub charset_decode_iso: String,
    pub charset_decode_utf: String,
    pub charset_encode: String,
    pub is_connected: bool,
    /// Current nick, empty before registration.
    pub nick: String,
    pub is_away: bool,
    pub away_time: Option<DateTime<Local>>,
    pub lag_ms: i64,
}

/// Copy of one channel or private conversation, without its nicks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub kind: ChannelKind,
    pub name: String,
    pub topic: String,
    pub modes: String,
    pub limit: Option<u32>,
    pub key: String,
    pub nicks_count: usize,
}

/// Copy of one nick in a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NickInfo {
    pub nick: String,
    pub flags: NickFlags,
}

fn copy_str(s: &str) -> Result<String, PluginError> {
    let mut out = String::new();
    out.try_reserve_exact(s.len())
        .map_err(|_| PluginError::Snapshot)?;
    out.push_str(s);
    Ok(out)
}

fn copy_opt(s: Option<&str>) -> Result<String, PluginError> {
    copy_str(s.unwrap_or_default())
}

/// Copy every item of `source` with `copy`, reserving the whole sequence
/// up front. The first failed copy aborts the snapshot; items copied so far
/// are dropped with the partial vector.
pub(crate) fn collect_snapshot<'s, S, T, I, F>(source: I, mut copy: F) -> Result<Vec<T>, PluginError>
where
    S: 's,
    I: IntoIterator<Item = &'s S>,
    I::IntoIter: ExactSizeIterator,
    F: FnMut(&S) -> Result<T, PluginError>,
{
    let source = source.into_iter();
    let mut out = Vec::new();
    out.try_reserve_exact(source.len())
        .map_err(|_| PluginError::Snapshot)?;
    for item in source {
        out.push(copy(item)?);
    }
    Ok(out)
}

impl DccInfo {
    pub(crate) fn copy_of(dcc: &DccTransfer) -> Result<Self, PluginError> {
        Ok(Self {
            id: dcc.id,
            server: copy_opt(dcc.server.as_deref())?,
            channel: copy_opt(dcc.channel.as_deref())?,
            kind: dcc.kind,
            status: dcc.status,
            start_time: dcc.start_time,
            start_transfer: dcc.start_transfer,
            addr: dcc.addr,
            port: dcc.port,
            nick: copy_opt(dcc.nick.as_deref())?,
            filename: copy_opt(dcc.filename.as_deref())?,
            local_filename: copy_opt(
                dcc.local_filename
                    .as_deref()
                    .and_then(Path::to_str),
            )?,
            filename_suffix: dcc.filename_suffix,
            size: dcc.size,
            pos: dcc.pos,
            start_resume: dcc.start_resume,
            bytes_per_sec: dcc.bytes_per_sec,
        })
    }
}

impl ServerInfo {
    pub(crate) fn copy_of(server: &Server) -> Result<Self, PluginError> {
        Ok(Self {
            name: copy_str(&server.name)?,
            autoconnect: server.autoconnect,
            autoreconnect: server.autoreconnect,
            autoreconnect_delay: server.autoreconnect_delay,
            address: copy_str(&server.address)?,
            port: server.port,
            ipv6: server.ipv6,
            ssl: server.ssl,
            password: copy_opt(server.password.as_deref())?,
            nick1: copy_str(&server.nicks[0])?,
            nick2: copy_str(&server.nicks[1])?,
            nick3: copy_str(&server.nicks[2])?,
            username: copy_str(&server.username)?,
            realname: copy_str(&server.realname)?,
            command: copy_opt(server.command.as_deref())?,
            command_delay: server.command_delay,
            autojoin: copy_opt(server.autojoin.as_deref())?,
            autorejoin: server.autorejoin,
            notify_levels: copy_opt(server.notify_levels.as_deref())?,
            charset_decode_iso: copy_opt(server.charset_decode_iso.as_deref())?,
            charset_decode_utf: copy_opt(server.charset_decode_utf.as_deref())?,
            charset_encode: copy_opt(server.charset_encode.as_deref())?,
            is_connected: server.is_connected(),
            nick: copy_opt(server.nick.as_deref())?,
            is_away: server.is_away,
            away_time: server.away_since,
            lag_ms: server.lag_ms,
        })
    }
}

impl ChannelInfo {
    pub(crate) fn copy_of(channel: &Channel) -> Result<Self, PluginError> {
        Ok(Self {
            kind: channel.kind,
            name: copy_str(&channel.name)?,
            topic: copy_opt(channel.topic.as_deref())?,
            modes: copy_str(&channel.modes)?,
            limit: channel.limit,
            key: copy_opt(channel.key.as_deref())?,
            nicks_count: channel.nick_count(),
        })
    }
}

impl NickInfo {
    pub(crate) fn copy_of(nick: &Nick) -> Result<Self, PluginError> {
        Ok(Self {
            nick: copy_str(&nick.name)?,
            flags: nick.flags,
        })
    }
}
