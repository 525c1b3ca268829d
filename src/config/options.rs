//! Typed built-in options.
//!
//! Options live in named sections. Values are parsed and validated per
//! [`OptionKind`] and rendered back as strings the same way for every
//! caller: booleans as `on`/`off`, integers in decimal, labelled integers as
//! their label, colours by name. The `keys`, `alias` and `ignore` sections
//! are structural and never exposed to plugins; server options are kept on
//! the server entities and addressed as `servername.option`.

use std::fmt;
use std::str::FromStr;

use slirc_proto::ascii_casecmp;
use tracing::debug;

/// Option sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Look,
    Colors,
    History,
    Log,
    Irc,
    Dcc,
    Proxy,
    Keys,
    Alias,
    Ignore,
    Server,
}

impl Section {
    /// Whether plugins may read and write options of this section by name.
    pub fn is_exposed(self) -> bool {
        !matches!(self, Self::Keys | Self::Alias | Self::Ignore | Self::Server)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Look => "look",
            Self::Colors => "colors",
            Self::History => "history",
            Self::Log => "log",
            Self::Irc => "irc",
            Self::Dcc => "dcc",
            Self::Proxy => "proxy",
            Self::Keys => "keys",
            Self::Alias => "alias",
            Self::Ignore => "ignore",
            Self::Server => "server",
        }
    }
}

/// Terminal colours options can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Default,
    Black,
    Red,
    LightRed,
    Green,
    LightGreen,
    Brown,
    Yellow,
    Blue,
    LightBlue,
    Magenta,
    LightMagenta,
    Cyan,
    LightCyan,
    Gray,
    White,
}

impl Color {
    const ALL: [(Color, &'static str); 16] = [
        (Color::Default, "default"),
        (Color::Black, "black"),
        (Color::Red, "red"),
        (Color::LightRed, "lightred"),
        (Color::Green, "green"),
        (Color::LightGreen, "lightgreen"),
        (Color::Brown, "brown"),
        (Color::Yellow, "yellow"),
        (Color::Blue, "blue"),
        (Color::LightBlue, "lightblue"),
        (Color::Magenta, "magenta"),
        (Color::LightMagenta, "lightmagenta"),
        (Color::Cyan, "cyan"),
        (Color::LightCyan, "lightcyan"),
        (Color::Gray, "gray"),
        (Color::White, "white"),
    ];

    pub fn name(self) -> &'static str {
        Self::ALL
            .iter()
            .find(|(c, _)| *c == self)
            .map_or("default", |(_, name)| name)
    }
}

impl FromStr for Color {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        Self::ALL
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(s))
            .map(|(c, _)| *c)
            .ok_or(())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared type of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Boolean,
    Integer { min: i64, max: i64 },
    /// Integer stored as an index into a fixed label set.
    IntWithString(&'static [&'static str]),
    Color,
    String,
}

/// Current value of an option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Boolean(bool),
    Integer(i64),
    Label(usize),
    Color(Color),
    String(String),
}

/// Why a textual value was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    NotBoolean,
    NotInteger,
    OutOfRange { min: i64, max: i64 },
    UnknownLabel,
    UnknownColor,
    Empty,
    DottedName,
    DuplicateName,
}

/// Parse a boolean the way option files and `/set` accept them.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

impl OptionKind {
    /// Parse and validate `value` for this kind.
    pub fn parse(self, value: &str) -> Result<OptionValue, ValueError> {
        match self {
            Self::Boolean => parse_bool(value)
                .map(OptionValue::Boolean)
                .ok_or(ValueError::NotBoolean),
            Self::Integer { min, max } => {
                let n: i64 = value.trim().parse().map_err(|_| ValueError::NotInteger)?;
                if (min..=max).contains(&n) {
                    Ok(OptionValue::Integer(n))
                } else {
                    Err(ValueError::OutOfRange { min, max })
                }
            }
            Self::IntWithString(labels) => labels
                .iter()
                .position(|l| l.eq_ignore_ascii_case(value))
                .map(OptionValue::Label)
                .ok_or(ValueError::UnknownLabel),
            Self::Color => value
                .parse::<Color>()
                .map(OptionValue::Color)
                .map_err(|()| ValueError::UnknownColor),
            Self::String => Ok(OptionValue::String(value.to_owned())),
        }
    }

    /// Render a value of this kind.
    pub fn format(self, value: &OptionValue) -> String {
        match (self, value) {
            (_, OptionValue::Boolean(b)) => if *b { "on" } else { "off" }.to_owned(),
            (_, OptionValue::Integer(n)) => n.to_string(),
            (Self::IntWithString(labels), OptionValue::Label(i)) => {
                labels.get(*i).copied().unwrap_or_default().to_owned()
            }
            (_, OptionValue::Label(i)) => i.to_string(),
            (_, OptionValue::Color(c)) => c.name().to_owned(),
            (_, OptionValue::String(s)) => s.clone(),
        }
    }
}

/// Static description of one option.
#[derive(Debug, Clone, Copy)]
pub struct OptionDef {
    pub section: Section,
    pub name: &'static str,
    pub description: &'static str,
    pub kind: OptionKind,
    pub default: &'static str,
}

const fn opt(
    section: Section,
    name: &'static str,
    description: &'static str,
    kind: OptionKind,
    default: &'static str,
) -> OptionDef {
    OptionDef {
        section,
        name,
        description,
        kind,
        default,
    }
}

const fn int(min: i64, max: i64) -> OptionKind {
    OptionKind::Integer { min, max }
}

const INT_MAX: i64 = i32::MAX as i64;

use OptionKind::{Boolean as BOOL, Color as COLOR, String as STR};
use Section::*;

/// Built-in options.
pub static BUILTIN_OPTIONS: &[OptionDef] = &[
    opt(Look, "look_set_title", "set title for terminal window", BOOL, "on"),
    opt(Look, "look_startup_logo", "display logo at startup", BOOL, "on"),
    opt(Look, "look_startup_version", "display version at startup", BOOL, "on"),
    opt(Look, "look_slogan", "client slogan", STR, "the geekiest chat client"),
    opt(Look, "look_buffer_timestamp", "timestamp for buffers", STR, "[%H:%M:%S]"),
    opt(Look, "look_color_nicks", "display nick names with different colors", BOOL, "on"),
    opt(Look, "look_color_actions", "display actions with different colors", BOOL, "on"),
    opt(Look, "look_remove_colors_from_msgs", "remove colors from incoming messages", BOOL, "on"),
    opt(Look, "look_nicklist", "display nicklist window", BOOL, "on"),
    opt(
        Look,
        "look_nicklist_position",
        "nicklist position",
        OptionKind::IntWithString(&["left", "right", "top", "bottom"]),
        "right",
    ),
    opt(Look, "look_nicklist_min_size", "min size for nicklist", int(0, 100), "0"),
    opt(Look, "look_nicklist_max_size", "max size for nicklist", int(0, 100), "0"),
    opt(Look, "look_nickmode", "display nick mode (op, voice) before each nick", BOOL, "on"),
    opt(Look, "look_nick_completor", "string inserted after nick completion", STR, ":"),
    opt(Look, "look_infobar", "enable info bar", BOOL, "on"),
    opt(Look, "look_infobar_timestamp", "timestamp for time in infobar", STR, "%B, %A %d %Y"),
    opt(Look, "look_infobar_delay_highlight", "delay for highlights in infobar", int(0, INT_MAX), "7"),
    opt(Colors, "col_title", "color for title bar", COLOR, "gray"),
    opt(Colors, "col_chat", "color for chat text", COLOR, "default"),
    opt(Colors, "col_chat_time", "color for time in chat window", COLOR, "gray"),
    opt(Colors, "col_chat_prefix1", "color for first char of prefix", COLOR, "lightcyan"),
    opt(Colors, "col_chat_nick", "color for nicks in actions", COLOR, "lightcyan"),
    opt(Colors, "col_chat_host", "color for hostnames", COLOR, "cyan"),
    opt(Colors, "col_chat_channel", "color for channel names in actions", COLOR, "white"),
    opt(Colors, "col_chat_highlight", "color for highlighted nick", COLOR, "yellow"),
    opt(Colors, "col_nick_op", "color for operator symbol", COLOR, "lightgreen"),
    opt(Colors, "col_nick_voice", "color for voice symbol", COLOR, "yellow"),
    opt(Colors, "col_nick_away", "color for away nicknames", COLOR, "cyan"),
    opt(History, "history_max_lines", "maximum number of lines in history per buffer", int(0, INT_MAX), "4096"),
    opt(History, "history_max_commands", "maximum number of user commands in history", int(0, INT_MAX), "100"),
    opt(Log, "log_auto_server", "automatically log server messages", BOOL, "off"),
    opt(Log, "log_auto_channel", "automatically log channel chats", BOOL, "off"),
    opt(Log, "log_auto_private", "automatically log private chats", BOOL, "off"),
    opt(Log, "log_path", "path for log files", STR, "~/.slirc/logs/"),
    opt(Log, "log_timestamp", "timestamp for log", STR, "%Y %b %d %H:%M:%S"),
    opt(
        Irc,
        "irc_display_away",
        "display message to all channels when away",
        OptionKind::IntWithString(&["off", "local", "channel"]),
        "local",
    ),
    opt(Irc, "irc_default_msg_away", "default message when away", STR, "away"),
    opt(Irc, "irc_default_msg_part", "default part message (leaving channel)", STR, ""),
    opt(Irc, "irc_default_msg_quit", "default quit message", STR, "slirc"),
    opt(Irc, "irc_notice_as_pv", "display notices as private messages", BOOL, "off"),
    opt(Irc, "irc_away_check", "interval between two checks for away (in minutes, 0 = never)", int(0, INT_MAX), "0"),
    opt(Irc, "irc_lag_check", "interval between two checks for lag (in seconds, 0 = never)", int(0, INT_MAX), "60"),
    opt(Irc, "irc_lag_min_show", "minimum lag to show (in seconds)", int(0, INT_MAX), "1"),
    opt(Irc, "irc_highlight", "comma separated list of words to highlight", STR, ""),
    opt(Dcc, "dcc_auto_accept_files", "automatically accept incoming dcc files", BOOL, "off"),
    opt(Dcc, "dcc_auto_accept_chats", "automatically accept dcc chats", BOOL, "off"),
    opt(Dcc, "dcc_timeout", "timeout for dcc request (in seconds)", int(1, INT_MAX), "300"),
    opt(Dcc, "dcc_max_pending", "maximum number of incoming dcc offers left waiting", int(1, 1000), "16"),
    opt(Dcc, "dcc_blocksize", "block size for dcc packets in bytes", int(1024, 102400), "65536"),
    opt(Dcc, "dcc_download_path", "path for writing incoming files with dcc", STR, "~"),
    opt(Dcc, "dcc_upload_path", "default path for reading files when sending via dcc", STR, "~"),
    opt(Dcc, "dcc_auto_rename", "rename incoming files if already exists", BOOL, "on"),
    opt(Dcc, "dcc_auto_resume", "automatically resume dcc transfer if connection was lost", BOOL, "on"),
    opt(Proxy, "proxy_use", "use a proxy server to connect to irc server", BOOL, "off"),
    opt(
        Proxy,
        "proxy_type",
        "proxy type",
        OptionKind::IntWithString(&["http", "socks4", "socks5"]),
        "http",
    ),
    opt(Proxy, "proxy_ipv6", "connect to proxy in ipv6", BOOL, "off"),
    opt(Proxy, "proxy_address", "proxy server address", STR, ""),
    opt(Proxy, "proxy_port", "port for connecting to proxy server", int(0, 65535), "3128"),
    opt(Proxy, "proxy_username", "username for proxy server", STR, ""),
    opt(Proxy, "proxy_password", "password for proxy server", STR, ""),
];

/// Server options, stored on each `Server` and addressed as `name.option`.
pub static SERVER_OPTIONS: &[OptionDef] = &[
    opt(Server, "server_name", "name associated to IRC server", STR, ""),
    opt(Server, "server_autoconnect", "automatically connect to server", BOOL, "on"),
    opt(Server, "server_autoreconnect", "automatically reconnect after disconnection", BOOL, "on"),
    opt(Server, "server_autoreconnect_delay", "delay before trying again to reconnect", int(0, 65535), "30"),
    opt(Server, "server_address", "IP address or hostname of IRC server", STR, ""),
    opt(Server, "server_port", "port for connecting to server", int(0, 65535), "6667"),
    opt(Server, "server_ipv6", "use IPv6 protocol for server communication", BOOL, "off"),
    opt(Server, "server_ssl", "use SSL for server communication", BOOL, "off"),
    opt(Server, "server_password", "password for IRC server", STR, ""),
    opt(Server, "server_nick1", "nickname to use on IRC server", STR, ""),
    opt(Server, "server_nick2", "alternate nickname to use on IRC server", STR, ""),
    opt(Server, "server_nick3", "2nd alternate nickname to use on IRC server", STR, ""),
    opt(Server, "server_username", "user name to use on IRC server", STR, ""),
    opt(Server, "server_realname", "real name to use on IRC server", STR, ""),
    opt(Server, "server_command", "command to run when connected to server", STR, ""),
    opt(Server, "server_command_delay", "delay (in seconds) after command was executed", int(0, 5), "0"),
    opt(Server, "server_autojoin", "comma separated list of channels to join", STR, ""),
    opt(Server, "server_autorejoin", "automatically rejoin channels when kicked", BOOL, "on"),
    opt(Server, "server_notify_levels", "comma separated list of notify levels for channels", STR, ""),
    opt(Server, "server_charset_decode_iso", "charset for decoding ISO on server and channels", STR, ""),
    opt(Server, "server_charset_decode_utf", "charset for decoding UTF on server and channels", STR, ""),
    opt(Server, "server_charset_encode", "charset for encoding messages on server and channels", STR, ""),
];

/// Look up a server option definition by name, ignoring case.
pub fn server_option_def(name: &str) -> Option<&'static OptionDef> {
    SERVER_OPTIONS
        .iter()
        .find(|d| d.name.eq_ignore_ascii_case(name))
}

/// Callback invoked after an option changed.
pub type ChangeCallback = Box<dyn FnMut(&str, &OptionValue) + Send>;

/// One option with its current value.
pub struct OptionEntry {
    pub def: OptionDef,
    pub value: OptionValue,
    on_change: Option<ChangeCallback>,
}

impl fmt::Debug for OptionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionEntry")
            .field("name", &self.def.name)
            .field("value", &self.value)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

impl OptionEntry {
    /// The value rendered per its kind.
    pub fn formatted(&self) -> String {
        self.def.kind.format(&self.value)
    }
}

/// Error setting an option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetError {
    Unknown,
    Invalid(ValueError),
}

/// The option store.
#[derive(Debug)]
pub struct OptionStore {
    entries: Vec<OptionEntry>,
}

impl Default for OptionStore {
    fn default() -> Self {
        Self::with_defs(BUILTIN_OPTIONS)
    }
}

impl OptionStore {
    /// Store holding `defs` at their default values. A default that does
    /// not parse for its kind falls back to the kind's zero value.
    pub fn with_defs(defs: &[OptionDef]) -> Self {
        let entries = defs
            .iter()
            .map(|def| OptionEntry {
                def: *def,
                value: def.kind.parse(def.default).unwrap_or(match def.kind {
                    OptionKind::Boolean => OptionValue::Boolean(false),
                    OptionKind::Integer { min, .. } => OptionValue::Integer(min),
                    OptionKind::IntWithString(_) => OptionValue::Label(0),
                    OptionKind::Color => OptionValue::Color(Color::Default),
                    OptionKind::String => OptionValue::String(String::new()),
                }),
                on_change: None,
            })
            .collect();
        Self { entries }
    }

    /// Find an option by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&OptionEntry> {
        self.entries
            .iter()
            .find(|e| ascii_casecmp(e.def.name, name).is_eq())
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut OptionEntry> {
        self.entries
            .iter_mut()
            .find(|e| ascii_casecmp(e.def.name, name).is_eq())
    }

    /// All options in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &OptionEntry> {
        self.entries.iter()
    }

    /// Boolean value, `false` for unknown or non-boolean options.
    pub fn bool(&self, name: &str) -> bool {
        matches!(self.get(name).map(|e| &e.value), Some(OptionValue::Boolean(true)))
    }

    /// Integer value, if the option is an integer.
    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.get(name).map(|e| &e.value) {
            Some(OptionValue::Integer(n)) => Some(*n),
            _ => None,
        }
    }

    /// String value, if the option is a string.
    pub fn string(&self, name: &str) -> Option<&str> {
        match self.get(name).map(|e| &e.value) {
            Some(OptionValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Register the callback run after `name` changes.
    pub fn on_change(&mut self, name: &str, callback: ChangeCallback) -> bool {
        match self.get_mut(name) {
            Some(entry) => {
                entry.on_change = Some(callback);
                true
            }
            None => false,
        }
    }

    /// Parse, validate and apply a value, then run the change callback.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), SetError> {
        let entry = self.get_mut(name).ok_or(SetError::Unknown)?;
        entry.value = entry.def.kind.parse(value).map_err(SetError::Invalid)?;
        debug!(option = %entry.def.name, value = %value, "option changed");
        let OptionEntry {
            def,
            value,
            on_change,
        } = entry;
        if let Some(callback) = on_change {
            callback(def.name, value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_defaults_parse() {
        let store = OptionStore::default();
        for entry in store.iter() {
            assert_eq!(
                entry.def.kind.parse(entry.def.default).as_ref(),
                Ok(&entry.value),
                "default of {}",
                entry.def.name
            );
        }
    }

    #[test]
    fn test_format_per_kind() {
        let store = OptionStore::default();
        assert_eq!(store.get("look_nicklist").unwrap().formatted(), "on");
        assert_eq!(store.get("history_max_commands").unwrap().formatted(), "100");
        assert_eq!(store.get("look_nicklist_position").unwrap().formatted(), "right");
        assert_eq!(store.get("col_chat_nick").unwrap().formatted(), "lightcyan");
        assert_eq!(store.get("look_nick_completor").unwrap().formatted(), ":");
    }

    #[test]
    fn test_set_validates() {
        let mut store = OptionStore::default();
        assert_eq!(store.set("LOOK_NICKLIST", "no"), Ok(()));
        assert!(!store.bool("look_nicklist"));
        assert_eq!(
            store.set("proxy_port", "70000"),
            Err(SetError::Invalid(ValueError::OutOfRange { min: 0, max: 65535 }))
        );
        assert_eq!(
            store.set("proxy_type", "socks9"),
            Err(SetError::Invalid(ValueError::UnknownLabel))
        );
        assert_eq!(store.set("col_title", "mauve"), Err(SetError::Invalid(ValueError::UnknownColor)));
        assert_eq!(store.set("no_such_option", "1"), Err(SetError::Unknown));
    }

    #[test]
    fn test_change_callback_runs_after_set() {
        let mut store = OptionStore::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        assert!(store.on_change(
            "irc_lag_check",
            Box::new(move |name, value| {
                assert_eq!(name, "irc_lag_check");
                assert_eq!(value, &OptionValue::Integer(15));
                seen.fetch_add(1, Ordering::SeqCst);
            })
        ));
        store.set("irc_lag_check", "15").unwrap();
        assert!(store.set("irc_lag_check", "x").is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_hidden_sections() {
        assert!(Section::Look.is_exposed());
        assert!(!Section::Keys.is_exposed());
        assert!(!Section::Server.is_exposed());
    }
}
