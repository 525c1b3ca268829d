//! Core configuration types and loading.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::defaults::{
    default_autoreconnect_delay, default_home, default_libdir, default_port, default_realname,
    default_sharedir, default_true, default_username,
};
use super::validation::{self, ValidationError};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to write config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Startup configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Client paths.
    #[serde(default)]
    pub client: ClientConfig,
    /// Configured servers, in connection order.
    #[serde(default, rename = "server")]
    pub servers: Vec<ServerBlock>,
    /// Initial values for built-in options, keyed by option name.
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate configuration text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        validation::validate(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

/// Client-wide paths.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Home directory: plugin config and plugin data live here.
    #[serde(default = "default_home")]
    pub home: PathBuf,
    /// Directory plugins are installed into.
    #[serde(default = "default_libdir")]
    pub libdir: PathBuf,
    /// Shared data directory.
    #[serde(default = "default_sharedir")]
    pub sharedir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            home: default_home(),
            libdir: default_libdir(),
            sharedir: default_sharedir(),
        }
    }
}

/// One `[[server]]` block.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerBlock {
    /// Internal name, used for `name.option` addressing.
    pub name: String,
    /// Hostname or address to connect to.
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub ipv6: bool,
    #[serde(default)]
    pub ssl: bool,
    #[serde(default)]
    pub password: Option<String>,
    /// One to three nicknames, tried in order.
    pub nicks: Vec<String>,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_realname")]
    pub realname: String,
    /// Command run once the server sent its welcome burst.
    #[serde(default)]
    pub command: Option<String>,
    /// Delay in seconds after `command`.
    #[serde(default)]
    pub command_delay: u32,
    /// Channels joined automatically (`#a,#b key1`).
    #[serde(default)]
    pub autojoin: Option<String>,
    #[serde(default = "default_true")]
    pub autorejoin: bool,
    #[serde(default)]
    pub autoconnect: bool,
    #[serde(default = "default_true")]
    pub autoreconnect: bool,
    #[serde(default = "default_autoreconnect_delay")]
    pub autoreconnect_delay: u32,
    #[serde(default)]
    pub notify_levels: Option<String>,
    #[serde(default)]
    pub charset_decode_iso: Option<String>,
    #[serde(default)]
    pub charset_decode_utf: Option<String>,
    #[serde(default)]
    pub charset_encode: Option<String>,
}

impl ServerBlock {
    /// Minimal block, used by tests and by callers building servers by hand.
    pub fn new(name: &str, address: &str, nick: &str) -> Self {
        Self {
            name: name.to_owned(),
            address: address.to_owned(),
            port: default_port(),
            ipv6: false,
            ssl: false,
            password: None,
            nicks: vec![nick.to_owned()],
            username: default_username(),
            realname: default_realname(),
            command: None,
            command_delay: 0,
            autojoin: None,
            autorejoin: true,
            autoconnect: false,
            autoreconnect: true,
            autoreconnect_delay: default_autoreconnect_delay(),
            notify_levels: None,
            charset_decode_iso: None,
            charset_decode_utf: None,
            charset_encode: None,
        }
    }

    /// The three nickname candidates. Missing alternates are derived from
    /// the last configured one by appending `_`.
    pub fn nick_candidates(&self) -> [String; 3] {
        let mut out: [String; 3] = Default::default();
        let mut last = String::from("slirc");
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = match self.nicks.get(i) {
                Some(nick) => nick.clone(),
                None => format!("{last}_"),
            };
            last = slot.clone();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nick_candidates_derive_alternates() {
        let mut block = ServerBlock::new("net", "irc.example.net", "alice");
        assert_eq!(block.nick_candidates(), ["alice", "alice_", "alice__"]);
        block.nicks.push("ally".into());
        assert_eq!(block.nick_candidates(), ["alice", "ally", "ally_"]);
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(
            r##"
[client]
home = "/tmp/slirc-home"

[options]
look_nicklist = "off"

[[server]]
name = "libera"
address = "irc.libera.chat"
port = 6697
ssl = true
nicks = ["alice", "alice2"]
autojoin = "#rust,#tokio"
autoconnect = true
"##,
        )
        .unwrap();

        assert_eq!(config.client.home, PathBuf::from("/tmp/slirc-home"));
        assert_eq!(config.servers.len(), 1);
        let server = &config.servers[0];
        assert_eq!(server.port, 6697);
        assert!(server.autorejoin);
        assert_eq!(server.autojoin.as_deref(), Some("#rust,#tokio"));
        assert_eq!(config.options.get("look_nicklist").map(String::as_str), Some("off"));
    }

    #[test]
    fn test_parse_rejects_invalid() {
        let err = Config::parse(
            r#"
[[server]]
name = ""
address = "irc.example.net"
nicks = []
"#,
        )
        .unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }
}
