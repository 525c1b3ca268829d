//! Server entities: connection identity, registration state and the
//! channels and queries opened on it.

use std::collections::VecDeque;

use chrono::{DateTime, Local, Utc};
use slirc_proto::{irc_eq, LineBuilder};
use tracing::debug;

use super::channel::{Channel, ChannelKind};
use crate::config::options::{server_option_def, OptionValue, SetError, ValueError};
use crate::config::ServerBlock;
use crate::error::{HandlerError, HandlerResult};

/// Connection state of one server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Disconnected,
    /// Socket open, registration in progress.
    Connecting,
    /// The server sent its welcome.
    Registered,
}

impl ConnectionState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Registered => "registered",
        }
    }
}

/// One configured IRC server.
#[derive(Debug)]
pub struct Server {
    pub name: String,
    pub address: String,
    pub port: u16,
    pub ipv6: bool,
    pub ssl: bool,
    pub password: Option<String>,
    pub nicks: [String; 3],
    pub username: String,
    pub realname: String,
    pub command: Option<String>,
    pub command_delay: u32,
    pub autojoin: Option<String>,
    pub autorejoin: bool,
    pub autoconnect: bool,
    pub autoreconnect: bool,
    pub autoreconnect_delay: u32,
    pub notify_levels: Option<String>,
    pub charset_decode_iso: Option<String>,
    pub charset_decode_utf: Option<String>,
    pub charset_encode: Option<String>,

    pub state: ConnectionState,
    /// Nick confirmed by the server, once registered.
    pub nick: Option<String>,
    /// Index into `nicks` of the nick currently being tried.
    pub nick_attempt: usize,
    pub is_away: bool,
    pub away_since: Option<DateTime<Local>>,
    /// Last measured round trip, in milliseconds.
    pub lag_ms: i64,
    pub lag_check_sent: Option<DateTime<Utc>>,
    /// Channels and private conversations, in opening order.
    pub channels: Vec<Channel>,
    outbound: VecDeque<String>,
}

impl Server {
    pub fn from_block(block: &ServerBlock) -> Self {
        Self {
            name: block.name.clone(),
            address: block.address.clone(),
            port: block.port,
            ipv6: block.ipv6,
            ssl: block.ssl,
            password: block.password.clone().filter(|p| !p.is_empty()),
            nicks: block.nick_candidates(),
            username: block.username.clone(),
            realname: block.realname.clone(),
            command: block.command.clone(),
            command_delay: block.command_delay,
            autojoin: block.autojoin.clone(),
            autorejoin: block.autorejoin,
            autoconnect: block.autoconnect,
            autoreconnect: block.autoreconnect,
            autoreconnect_delay: block.autoreconnect_delay,
            notify_levels: block.notify_levels.clone(),
            charset_decode_iso: block.charset_decode_iso.clone(),
            charset_decode_utf: block.charset_decode_utf.clone(),
            charset_encode: block.charset_encode.clone(),
            state: ConnectionState::Disconnected,
            nick: None,
            nick_attempt: 0,
            is_away: false,
            away_since: None,
            lag_ms: 0,
            lag_check_sent: None,
            channels: Vec::new(),
            outbound: VecDeque::new(),
        }
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.state != ConnectionState::Disconnected
    }

    #[inline]
    pub fn is_registered(&self) -> bool {
        self.state == ConnectionState::Registered
    }

    /// The nick we are known by, or the one being tried during registration.
    pub fn current_nick(&self) -> &str {
        match &self.nick {
            Some(nick) => nick,
            None => &self.nicks[self.nick_attempt.min(2)],
        }
    }

    /// True if `nick` is our own nick on this server.
    pub fn is_self(&self, nick: &str) -> bool {
        irc_eq(self.current_nick(), nick)
    }

    // ------------------------------------------------------------------
    // Outbound queue
    // ------------------------------------------------------------------

    /// Queue one line for the transport. A missing CRLF is added.
    pub fn send_line(&mut self, line: impl Into<String>) -> HandlerResult {
        let mut line = line.into();
        if !self.is_connected() {
            let verb = line.split(' ').next().unwrap_or_default().trim_end();
            return Err(HandlerError::NotConnected(verb.to_ascii_lowercase()));
        }
        if !line.ends_with("\r\n") {
            line.push_str("\r\n");
        }
        debug!(server = %self.name, line = %line.trim_end(), "queue line");
        self.outbound.push_back(line);
        Ok(())
    }

    /// Finish a builder and queue the line.
    pub fn send(&mut self, builder: LineBuilder) -> HandlerResult {
        self.send_line(builder.finish())
    }

    /// Next line waiting for the transport.
    pub fn pop_outbound(&mut self) -> Option<String> {
        self.outbound.pop_front()
    }

    /// Drain every queued line.
    pub fn take_outbound(&mut self) -> Vec<String> {
        self.outbound.drain(..).collect()
    }

    pub fn outbound_len(&self) -> usize {
        self.outbound.len()
    }

    // ------------------------------------------------------------------
    // Connection lifecycle
    // ------------------------------------------------------------------

    /// Start registration: queue `PASS`, `NICK` and `USER`.
    ///
    /// Returns the hostname actually sent, `unknown` when `hostname` is
    /// empty.
    pub fn login(&mut self, hostname: &str) -> Result<String, HandlerError> {
        self.state = ConnectionState::Connecting;
        self.nick = None;
        self.nick_attempt = 0;

        let hostname = match hostname.trim() {
            "" => "unknown",
            h => h,
        }
        .to_owned();

        if let Some(password) = self.password.clone() {
            self.send(LineBuilder::new("PASS").param(&password))?;
        }
        let nick = self.nicks[0].clone();
        self.send(LineBuilder::new("NICK").param(&nick))?;
        let user = LineBuilder::new("USER")
            .param(&self.username)
            .param(&hostname)
            .param("servername")
            .trailing(&self.realname);
        self.send(user)?;
        Ok(hostname)
    }

    /// Advance to the next configured nick after a collision.
    ///
    /// Returns `None` once all three candidates were rejected.
    pub fn next_nick(&mut self) -> Option<&str> {
        if self.nick_attempt + 1 >= self.nicks.len() {
            return None;
        }
        self.nick_attempt += 1;
        Some(&self.nicks[self.nick_attempt])
    }

    /// Reset session state after the transport closed.
    pub fn disconnected(&mut self) {
        self.state = ConnectionState::Disconnected;
        self.nick = None;
        self.nick_attempt = 0;
        self.is_away = false;
        self.away_since = None;
        self.lag_check_sent = None;
        self.outbound.clear();
        for channel in &mut self.channels {
            channel.clear_nicks();
        }
    }

    /// Send a lag check and remember when it left.
    pub fn start_lag_check(&mut self, now: DateTime<Utc>) -> HandlerResult {
        let address = self.address.clone();
        self.send(LineBuilder::new("PING").trailing(&address))?;
        self.lag_check_sent = Some(now);
        Ok(())
    }

    /// Complete a pending lag check. Returns the measured lag.
    pub fn finish_lag_check(&mut self, now: DateTime<Utc>) -> Option<i64> {
        let sent = self.lag_check_sent.take()?;
        self.lag_ms = (now - sent).num_milliseconds().max(0);
        Some(self.lag_ms)
    }

    // ------------------------------------------------------------------
    // Channels
    // ------------------------------------------------------------------

    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| irc_eq(&c.name, name))
    }

    pub fn channel_mut(&mut self, name: &str) -> Option<&mut Channel> {
        self.channels.iter_mut().find(|c| irc_eq(&c.name, name))
    }

    /// Open a channel or private conversation, returning the existing one
    /// if the name is already open.
    pub fn add_channel(&mut self, kind: ChannelKind, name: &str) -> &mut Channel {
        let index = match self.channels.iter().position(|c| irc_eq(&c.name, name)) {
            Some(i) => i,
            None => {
                self.channels.push(Channel::new(kind, name));
                self.channels.len() - 1
            }
        };
        &mut self.channels[index]
    }

    pub fn remove_channel(&mut self, name: &str) -> Option<Channel> {
        let index = self.channels.iter().position(|c| irc_eq(&c.name, name))?;
        Some(self.channels.remove(index))
    }

    // ------------------------------------------------------------------
    // Server options (`servername.option`)
    // ------------------------------------------------------------------

    /// Current value of a server option, rendered like any other option.
    pub fn option_value(&self, option: &str) -> Option<String> {
        let def = server_option_def(option)?;
        let on_off = |b: bool| if b { "on" } else { "off" }.to_owned();
        let opt = |s: &Option<String>| s.clone().unwrap_or_default();
        Some(match def.name {
            "server_name" => self.name.clone(),
            "server_autoconnect" => on_off(self.autoconnect),
            "server_autoreconnect" => on_off(self.autoreconnect),
            "server_autoreconnect_delay" => self.autoreconnect_delay.to_string(),
            "server_address" => self.address.clone(),
            "server_port" => self.port.to_string(),
            "server_ipv6" => on_off(self.ipv6),
            "server_ssl" => on_off(self.ssl),
            "server_password" => opt(&self.password),
            "server_nick1" => self.nicks[0].clone(),
            "server_nick2" => self.nicks[1].clone(),
            "server_nick3" => self.nicks[2].clone(),
            "server_username" => self.username.clone(),
            "server_realname" => self.realname.clone(),
            "server_command" => opt(&self.command),
            "server_command_delay" => self.command_delay.to_string(),
            "server_autojoin" => opt(&self.autojoin),
            "server_autorejoin" => on_off(self.autorejoin),
            "server_notify_levels" => opt(&self.notify_levels),
            "server_charset_decode_iso" => opt(&self.charset_decode_iso),
            "server_charset_decode_utf" => opt(&self.charset_decode_utf),
            "server_charset_encode" => opt(&self.charset_encode),
            _ => return None,
        })
    }

    /// Parse, validate and store a server option.
    pub fn set_option(&mut self, option: &str, value: &str) -> Result<(), SetError> {
        let def = server_option_def(option).ok_or(SetError::Unknown)?;
        let parsed = def.kind.parse(value).map_err(SetError::Invalid)?;
        let text = || (!value.is_empty()).then(|| value.to_owned());

        match (def.name, parsed) {
            ("server_autoconnect", OptionValue::Boolean(b)) => self.autoconnect = b,
            ("server_autoreconnect", OptionValue::Boolean(b)) => self.autoreconnect = b,
            ("server_ipv6", OptionValue::Boolean(b)) => self.ipv6 = b,
            ("server_ssl", OptionValue::Boolean(b)) => self.ssl = b,
            ("server_autorejoin", OptionValue::Boolean(b)) => self.autorejoin = b,
            ("server_autoreconnect_delay", OptionValue::Integer(n)) => {
                self.autoreconnect_delay = to_u32(n)?;
            }
            ("server_command_delay", OptionValue::Integer(n)) => self.command_delay = to_u32(n)?,
            ("server_port", OptionValue::Integer(n)) => {
                self.port = u16::try_from(n)
                    .map_err(|_| SetError::Invalid(ValueError::OutOfRange { min: 0, max: 65535 }))?;
            }
            ("server_name", _) => {
                if value.contains('.') {
                    return Err(SetError::Invalid(ValueError::DottedName));
                }
                self.name = non_empty(value)?;
            }
            ("server_address", _) => self.address = value.to_owned(),
            ("server_password", _) => self.password = text(),
            ("server_nick1", _) => self.nicks[0] = non_empty(value)?,
            ("server_nick2", _) => self.nicks[1] = non_empty(value)?,
            ("server_nick3", _) => self.nicks[2] = non_empty(value)?,
            ("server_username", _) => self.username = value.to_owned(),
            ("server_realname", _) => self.realname = value.to_owned(),
            ("server_command", _) => self.command = text(),
            ("server_autojoin", _) => self.autojoin = text(),
            ("server_notify_levels", _) => self.notify_levels = text(),
            ("server_charset_decode_iso", _) => self.charset_decode_iso = text(),
            ("server_charset_decode_utf", _) => self.charset_decode_utf = text(),
            ("server_charset_encode", _) => self.charset_encode = text(),
            _ => return Err(SetError::Unknown),
        }
        debug!(server = %self.name, option = %def.name, "server option changed");
        Ok(())
    }
}

fn non_empty(value: &str) -> Result<String, SetError> {
    if value.is_empty() {
        Err(SetError::Invalid(ValueError::Empty))
    } else {
        Ok(value.to_owned())
    }
}

fn to_u32(n: i64) -> Result<u32, SetError> {
    u32::try_from(n).map_err(|_| {
        SetError::Invalid(ValueError::OutOfRange {
            min: 0,
            max: i64::from(u32::MAX),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> Server {
        let mut block = ServerBlock::new("libera", "irc.libera.chat", "alice");
        block.password = Some("hunter2".into());
        block.realname = "Alice Liddell".into();
        block.username = "alice".into();
        Server::from_block(&block)
    }

    #[test]
    fn test_send_requires_connection() {
        let mut server = server();
        let err = server.send_line("JOIN #rust").unwrap_err();
        assert_eq!(err, HandlerError::NotConnected("join".into()));
        assert_eq!(server.outbound_len(), 0);
    }

    #[test]
    fn test_login_sequence() {
        let mut server = server();
        let host = server.login("").unwrap();
        assert_eq!(host, "unknown");
        assert_eq!(
            server.take_outbound(),
            vec![
                "PASS hunter2\r\n",
                "NICK alice\r\n",
                "USER alice unknown servername :Alice Liddell\r\n",
            ]
        );
        assert_eq!(server.state, ConnectionState::Connecting);
    }

    #[test]
    fn test_login_without_password() {
        let mut server = server();
        server.password = None;
        server.login("box.local").unwrap();
        let lines = server.take_outbound();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "USER alice box.local servername :Alice Liddell\r\n");
    }

    #[test]
    fn test_next_nick_stops_after_three() {
        let mut server = server();
        assert_eq!(server.current_nick(), "alice");
        assert_eq!(server.next_nick(), Some("alice_"));
        assert_eq!(server.next_nick(), Some("alice__"));
        assert_eq!(server.next_nick(), None);
        assert_eq!(server.current_nick(), "alice__");
    }

    #[test]
    fn test_lag_check() {
        let mut server = server();
        server.state = ConnectionState::Registered;
        let sent = Utc::now();
        server.start_lag_check(sent).unwrap();
        assert_eq!(server.pop_outbound().as_deref(), Some("PING :irc.libera.chat\r\n"));
        let lag = server
            .finish_lag_check(sent + chrono::Duration::milliseconds(250))
            .unwrap();
        assert_eq!(lag, 250);
        assert_eq!(server.finish_lag_check(Utc::now()), None);
    }

    #[test]
    fn test_channels_are_case_insensitive() {
        let mut server = server();
        server.add_channel(ChannelKind::Channel, "#Rust");
        server.add_channel(ChannelKind::Channel, "#rust");
        assert_eq!(server.channels.len(), 1);
        assert!(server.remove_channel("#RUST").is_some());
        assert!(server.channels.is_empty());
    }

    #[test]
    fn test_server_options() {
        let mut server = server();
        assert_eq!(server.option_value("server_port").as_deref(), Some("6667"));
        assert_eq!(server.option_value("SERVER_SSL").as_deref(), Some("off"));

        server.set_option("server_port", "6697").unwrap();
        server.set_option("server_ssl", "on").unwrap();
        server.set_option("server_password", "").unwrap();
        assert_eq!(server.port, 6697);
        assert!(server.ssl);
        assert_eq!(server.password, None);

        assert!(matches!(
            server.set_option("server_port", "70000"),
            Err(SetError::Invalid(_))
        ));
        assert_eq!(server.set_option("server_bogus", "x"), Err(SetError::Unknown));
        assert_eq!(server.option_value("server_bogus"), None);
    }

    #[test]
    fn test_server_name_and_nicks_rejected_when_unusable() {
        let mut server = server();
        let original = server.name.clone();
        assert_eq!(
            server.set_option("server_name", "a.b"),
            Err(SetError::Invalid(ValueError::DottedName))
        );
        assert_eq!(
            server.set_option("server_name", ""),
            Err(SetError::Invalid(ValueError::Empty))
        );
        assert_eq!(server.name, original);

        for option in ["server_nick1", "server_nick2", "server_nick3"] {
            assert_eq!(
                server.set_option(option, ""),
                Err(SetError::Invalid(ValueError::Empty)),
                "{option}"
            );
        }
        assert!(server.nicks.iter().all(|n| !n.is_empty()));

        server.set_option("server_name", "libera").unwrap();
        server.set_option("server_nick2", "bob").unwrap();
        assert_eq!(server.name, "libera");
        assert_eq!(server.nicks[1], "bob");
    }
}
