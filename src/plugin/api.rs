//! The façade plugins call into.
//!
//! Every entry point validates its input against the live state and
//! reports a miss as a [`PluginError`]; nothing here substitutes a default
//! for a server, channel, info or option that does not exist.

use std::cmp::Ordering;
use std::path::{Component, Path, PathBuf};

use slirc_proto::{ascii_casecmp, ascii_ncasecmp, explode};
use tracing::{debug, warn};

use super::host::{CommandHelp, HandlerFn, HandlerId};
use super::snapshot::{collect_snapshot, ChannelInfo, DccInfo, NickInfo, ServerInfo};
use crate::client::Client;
use crate::config::{SetError, ValueError};
use crate::display::{BufferRef, PrefixKind};
use crate::error::PluginError;
use crate::state::View;

/// Handle given to plugin code for the duration of one call.
///
/// The client itself stays out of reach:
///
/// ```compile_fail
/// fn clear_servers(api: &mut slirc_client::PluginApi<'_>) {
///     api.client().servers.clear();
/// }
/// ```
pub struct PluginApi<'a> {
    client: &'a mut Client,
    plugin: String,
}

impl<'a> PluginApi<'a> {
    pub(crate) fn new(client: &'a mut Client, plugin: &str) -> Self {
        Self {
            client,
            plugin: plugin.to_owned(),
        }
    }

    /// Name of the plugin this handle belongs to.
    pub fn plugin_name(&self) -> &str {
        &self.plugin
    }

    // ------------------------------------------------------------------
    // String utilities
    // ------------------------------------------------------------------

    pub fn ascii_strcasecmp(&self, a: &str, b: &str) -> Ordering {
        ascii_casecmp(a, b)
    }

    pub fn ascii_strncasecmp(&self, a: &str, b: &str, max: usize) -> Ordering {
        ascii_ncasecmp(a, b, max)
    }

    /// Split on any of `separators`, at most `max_items` items (0 = no
    /// limit).
    pub fn explode_string(&self, text: &str, separators: &str, max_items: usize) -> Vec<String> {
        explode(text, separators, max_items)
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    // ------------------------------------------------------------------
    // Files
    // ------------------------------------------------------------------

    /// Resolve a relative path under the home directory. Absolute paths and
    /// `..` components are rejected.
    fn home_path(&self, path: &str) -> Result<PathBuf, PluginError> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if path.is_empty() || escapes {
            return Err(PluginError::InvalidPath(path.to_owned()));
        }
        Ok(self.client.paths.home.join(relative))
    }

    /// Create a directory under the home directory. An existing directory
    /// counts as success.
    pub fn mkdir_home(&self, path: &str) -> Result<PathBuf, PluginError> {
        let dir = self.home_path(path)?;
        match std::fs::create_dir(&dir) {
            Ok(()) => debug!(plugin = %self.plugin, dir = %dir.display(), "directory created"),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e.into()),
        }
        Ok(dir)
    }

    /// Call `callback` on each regular file in `directory`, in name order.
    /// Returns the number of files visited.
    pub fn exec_on_files(
        &mut self,
        directory: impl AsRef<Path>,
        mut callback: impl FnMut(&mut Self, &Path),
    ) -> Result<usize, PluginError> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(directory)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        for file in &files {
            callback(self, file);
        }
        Ok(files.len())
    }

    // ------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------

    /// Buffer of a (server, channel) pair; the active view when neither is
    /// given.
    fn resolve_buffer(&self, server: Option<&str>, channel: Option<&str>) -> Result<BufferRef, PluginError> {
        let not_found = || PluginError::BufferNotFound {
            server: server.unwrap_or_default().to_owned(),
            channel: channel.unwrap_or_default().to_owned(),
        };
        let view = self.resolve_view(server, channel).map_err(|_| not_found())?;
        Ok(self.client.buffer_for(&view))
    }

    /// Print in the buffer of a (server, channel) pair, or in the active
    /// view when neither is given.
    pub fn print(&mut self, server: Option<&str>, channel: Option<&str>, text: &str) -> Result<(), PluginError> {
        let buffer = self.resolve_buffer(server, channel)?;
        self.client.print(&buffer, PrefixKind::Plugin, text);
        Ok(())
    }

    /// Print in the buffer of the active server, or the core buffer.
    pub fn print_server(&mut self, text: &str) {
        let buffer = match self.client.current_server() {
            Some(index) => self.client.server_buffer(index),
            None => BufferRef::Core,
        };
        self.client.print(&buffer, PrefixKind::Plugin, text);
    }

    pub fn print_infobar(&mut self, seconds: u32, text: &str) {
        self.client.infobar(seconds, text);
    }

    /// Append to the log of a (server, channel) buffer.
    pub fn log(&mut self, server: Option<&str>, channel: Option<&str>, text: &str) -> Result<(), PluginError> {
        let buffer = self.resolve_buffer(server, channel)?;
        self.client.log(&buffer, text);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Handlers
    // ------------------------------------------------------------------

    /// Watch an inbound message or numeric. The callback runs before the
    /// built-in handler and may eat the message.
    pub fn msg_handler_add(&mut self, message: &str, handler_args: &str, callback: HandlerFn) -> HandlerId {
        self.client
            .plugins
            .add_message_handler(&self.plugin, message, handler_args, callback)
    }

    /// Add a user command. It takes precedence over a built-in command of
    /// the same name.
    pub fn cmd_handler_add(
        &mut self,
        command: &str,
        help: CommandHelp,
        handler_args: &str,
        callback: HandlerFn,
    ) -> Result<HandlerId, PluginError> {
        self.client
            .plugins
            .add_command_handler(&self.plugin, command, help, handler_args, callback)
    }

    pub fn handler_remove(&mut self, id: HandlerId) -> Result<(), PluginError> {
        self.client.plugins.remove_handler(&self.plugin, id)
    }

    pub fn handler_remove_all(&mut self) -> usize {
        self.client.plugins.remove_all(&self.plugin)
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    fn find_server(&self, name: &str) -> Result<usize, PluginError> {
        self.client
            .server_index(name)
            .ok_or_else(|| PluginError::ServerNotFound(name.to_owned()))
    }

    /// View for a (server, channel) pair: the channel view when both
    /// resolve, the server view for a server alone, the active view for
    /// neither.
    fn resolve_view(&self, server: Option<&str>, channel: Option<&str>) -> Result<View, PluginError> {
        let server = server.filter(|s| !s.is_empty());
        let channel = channel.filter(|c| !c.is_empty());
        match (server, channel) {
            (None, None) => Ok(self.client.view.clone()),
            (None, Some(_)) => Err(PluginError::ServerNotFound(String::new())),
            (Some(server), None) => Ok(View::Server(self.find_server(server)?)),
            (Some(server), Some(channel)) => {
                let index = self.find_server(server)?;
                let chan = self.client.servers[index]
                    .channel(channel)
                    .ok_or_else(|| PluginError::ChannelNotFound(channel.to_owned()))?;
                Ok(View::channel(index, &chan.name))
            }
        }
    }

    /// Run a line as if the user typed it in the given context. Command
    /// failures are shown to the user like any typed command.
    pub fn exec_command(&mut self, server: Option<&str>, channel: Option<&str>, command: &str) -> Result<(), PluginError> {
        let view = match self.resolve_view(server, channel) {
            Ok(view) => view,
            Err(e) => {
                let text = format!(
                    "server/channel ({}/{}) not found for plugin exec command",
                    server.unwrap_or_default(),
                    channel.unwrap_or_default()
                );
                self.client.print(&BufferRef::Core, PrefixKind::Error, &text);
                return Err(e);
            }
        };
        debug!(plugin = %self.plugin, command = %command, "plugin exec command");
        if let Err(e) = crate::dispatch::execute_input(self.client, view, command) {
            debug!(plugin = %self.plugin, error = %e, "plugin command failed");
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Info
    // ------------------------------------------------------------------

    /// A named scalar. `Ok(None)` when the info exists but has no value
    /// right now, e.g. the nick of a disconnected server.
    pub fn get_info(&self, info: &str, server: Option<&str>) -> Result<Option<String>, PluginError> {
        let paths = &self.client.paths;
        let global = match info.to_ascii_lowercase().as_str() {
            "version" => Some(crate::VERSION.to_owned()),
            "weechatdir" | "weechat_dir" => Some(paths.home.display().to_string()),
            "weechat_libdir" => Some(paths.libdir.display().to_string()),
            "weechat_sharedir" => Some(paths.sharedir.display().to_string()),
            "nick" | "channel" | "server" | "away" => None,
            _ => return Err(PluginError::UnknownInfo(info.to_owned())),
        };
        if global.is_some() {
            return Ok(global);
        }

        let index = match server.filter(|s| !s.is_empty()) {
            Some(name) => self.find_server(name)?,
            None => self
                .client
                .current_server()
                .ok_or_else(|| PluginError::ServerNotFound(String::new()))?,
        };
        let srv = &self.client.servers[index];
        Ok(match info.to_ascii_lowercase().as_str() {
            "nick" => srv.is_connected().then(|| srv.nick.clone()).flatten(),
            "server" => srv.is_connected().then(|| srv.name.clone()),
            "away" => Some(if srv.is_connected() && srv.is_away { "1" } else { "0" }.to_owned()),
            // The channel of the active view, when it is on this server.
            _ => match &self.client.view {
                View::Channel { server, channel } if *server == index => Some(channel.clone()),
                _ => None,
            },
        })
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    pub fn get_dcc_info(&self) -> Result<Vec<DccInfo>, PluginError> {
        collect_snapshot(self.client.dcc.iter(), DccInfo::copy_of)
    }

    pub fn get_server_info(&self) -> Result<Vec<ServerInfo>, PluginError> {
        collect_snapshot(&self.client.servers, ServerInfo::copy_of)
    }

    pub fn get_channel_info(&self, server: &str) -> Result<Vec<ChannelInfo>, PluginError> {
        let index = self.find_server(server)?;
        collect_snapshot(&self.client.servers[index].channels, ChannelInfo::copy_of)
    }

    pub fn get_nick_info(&self, server: &str, channel: &str) -> Result<Vec<NickInfo>, PluginError> {
        let index = self.find_server(server)?;
        let chan = self.client.servers[index]
            .channel(channel)
            .ok_or_else(|| PluginError::ChannelNotFound(channel.to_owned()))?;
        collect_snapshot(chan.nicks(), NickInfo::copy_of)
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Value of a built-in option, or of `servername.option`, formatted per
    /// its kind.
    pub fn get_config(&self, option: &str) -> Result<String, PluginError> {
        let unknown = || PluginError::UnknownOption(option.to_owned());
        if let Some((server, name)) = option.split_once('.') {
            let index = self.find_server(server)?;
            return self.client.servers[index]
                .option_value(name)
                .ok_or_else(unknown);
        }
        self.client
            .options
            .get(option)
            .filter(|entry| entry.def.section.is_exposed())
            .map(|entry| entry.formatted())
            .ok_or_else(unknown)
    }

    /// Set a built-in option or `servername.option`. The option's change
    /// callback, if any, runs on success.
    pub fn set_config(&mut self, option: &str, value: &str) -> Result<(), PluginError> {
        let map_err = |e: SetError| match e {
            SetError::Unknown => PluginError::UnknownOption(option.to_owned()),
            SetError::Invalid(_) => PluginError::InvalidValue {
                option: option.to_owned(),
                value: value.to_owned(),
            },
        };

        if let Some((server, name)) = option.split_once('.') {
            let index = self.find_server(server)?;
            let renames_onto_other = name.eq_ignore_ascii_case("server_name")
                && self
                    .client
                    .server_index(value)
                    .is_some_and(|other| other != index);
            if renames_onto_other {
                warn!(plugin = %self.plugin, server = %server, name = %value, "server name already taken");
                return Err(map_err(SetError::Invalid(ValueError::DuplicateName)));
            }
            return self.client.servers[index]
                .set_option(name, value)
                .map_err(map_err);
        }

        let exposed = self
            .client
            .options
            .get(option)
            .is_some_and(|entry| entry.def.section.is_exposed());
        if !exposed {
            return Err(PluginError::UnknownOption(option.to_owned()));
        }
        self.client.options.set(option, value).map_err(|e| {
            warn!(plugin = %self.plugin, option = %option, "plugin set invalid option value");
            map_err(e)
        })
    }

    pub fn get_plugin_config(&self, option: &str) -> Option<String> {
        self.client
            .plugins
            .plugin_config(&self.plugin, option)
            .map(str::to_owned)
    }

    /// Store a private option and persist it. An empty value removes it.
    pub fn set_plugin_config(&mut self, option: &str, value: &str) -> Result<(), PluginError> {
        self.client
            .plugins
            .set_plugin_config(&self.plugin, option, value)
    }
}
