//! The client context.
//!
//! [`Client`] owns everything the core mutates: servers with their channels
//! and nicks, DCC transfers, the option store, loaded plugins and the
//! output sink. Dispatch, user commands and plugin calls all receive it
//! explicitly, one at a time.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::{Config, OptionStore, SetError};
use crate::display::{BufferRef, OutputSink, PrefixKind};
use crate::error::{HandlerError, HandlerResult, PluginError};
use crate::handlers::registry;
use crate::plugin::{Plugin, PluginHost};
use crate::state::{DccList, Server, View};

/// Directories the client and its plugins work in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub home: PathBuf,
    pub libdir: PathBuf,
    pub sharedir: PathBuf,
}

pub struct Client {
    pub servers: Vec<Server>,
    pub dcc: DccList,
    pub view: View,
    pub options: OptionStore,
    pub plugins: PluginHost,
    pub paths: Paths,
    sink: Box<dyn OutputSink>,
    hostname: String,
    /// Set by `/quit`; the driver stops once it sees it.
    pub quit_requested: bool,
}

impl Client {
    /// Build a client from startup config. Option values from the config
    /// that fail to apply are logged and left at their defaults.
    pub fn new(config: &Config, sink: Box<dyn OutputSink>) -> Self {
        let mut options = OptionStore::default();
        for (name, value) in &config.options {
            match options.set(name, value) {
                Ok(()) => {}
                Err(SetError::Unknown) => warn!(option = %name, "unknown option in config"),
                Err(SetError::Invalid(e)) => {
                    warn!(option = %name, value = %value, error = ?e, "invalid option value in config")
                }
            }
        }

        let paths = Paths {
            home: config.client.home.clone(),
            libdir: config.client.libdir.clone(),
            sharedir: config.client.sharedir.clone(),
        };

        let mut plugins = PluginHost::new(paths.home.join("plugins.toml"));
        if let Err(e) = plugins.load_configs() {
            warn!(error = %e, "failed to read plugin config");
        }

        Self {
            servers: config.servers.iter().map(Server::from_block).collect(),
            dcc: DccList::new(),
            view: View::Core,
            options,
            plugins,
            paths,
            sink,
            hostname: local_hostname(),
            quit_requested: false,
        }
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// Index of a server by name, ignoring ASCII case.
    pub fn server_index(&self, name: &str) -> Option<usize> {
        self.servers
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(name))
    }

    pub fn server(&self, index: usize) -> Option<&Server> {
        self.servers.get(index)
    }

    pub fn server_mut(&mut self, index: usize) -> Option<&mut Server> {
        self.servers.get_mut(index)
    }

    /// Server the current view belongs to.
    pub fn current_server(&self) -> Option<usize> {
        self.view.server()
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    /// Display buffer for a view.
    pub fn buffer_for(&self, view: &View) -> BufferRef {
        match view {
            View::Core => BufferRef::Core,
            View::Server(i) => match self.servers.get(*i) {
                Some(server) => BufferRef::Server(server.name.clone()),
                None => BufferRef::Core,
            },
            View::Channel { server, channel } => match self.servers.get(*server) {
                Some(s) => BufferRef::channel(&s.name, channel),
                None => BufferRef::Core,
            },
        }
    }

    pub fn server_buffer(&self, index: usize) -> BufferRef {
        self.buffer_for(&View::Server(index))
    }

    // ------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------

    pub fn print(&mut self, buffer: &BufferRef, prefix: PrefixKind, text: &str) {
        self.sink.print(buffer, prefix, text);
    }

    /// Print in the buffer of the active view.
    pub fn print_view(&mut self, prefix: PrefixKind, text: &str) {
        let buffer = self.buffer_for(&self.view);
        self.sink.print(&buffer, prefix, text);
    }

    pub fn print_server(&mut self, index: usize, prefix: PrefixKind, text: &str) {
        let buffer = self.server_buffer(index);
        self.sink.print(&buffer, prefix, text);
    }

    pub fn log(&mut self, buffer: &BufferRef, text: &str) {
        self.sink.log(buffer, text);
    }

    pub fn infobar(&mut self, seconds: u32, text: &str) {
        self.sink.infobar(seconds, text);
    }

    // ------------------------------------------------------------------
    // Connection lifecycle
    // ------------------------------------------------------------------

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn set_hostname(&mut self, hostname: &str) {
        self.hostname = hostname.to_owned();
    }

    /// Mark a server as connecting and queue its login lines.
    pub fn connect(&mut self, index: usize) -> HandlerResult {
        let hostname = self.hostname.clone();
        let server = self
            .servers
            .get_mut(index)
            .ok_or_else(|| HandlerError::NoSuchServer(index.to_string()))?;
        let used = server.login(&hostname)?;
        info!(server = %server.name, address = %server.address, port = server.port, "logging in");
        let text = format!("using local hostname \"{used}\"");
        self.print_server(index, PrefixKind::Info, &text);
        if self.view == View::Core {
            self.view = View::Server(index);
        }
        Ok(())
    }

    /// The transport for `index` closed.
    pub fn disconnected(&mut self, index: usize) {
        let Some(server) = self.servers.get_mut(index) else {
            return;
        };
        server.disconnected();
        info!(server = %server.name, "disconnected");
        self.print_server(index, PrefixKind::Info, "disconnected from server");
    }

    // ------------------------------------------------------------------
    // Input and completion
    // ------------------------------------------------------------------

    /// Handle one line typed by the user in the active view.
    pub fn user_input(&mut self, text: &str) -> HandlerResult {
        let view = self.view.clone();
        crate::dispatch::execute_input(self, view, text)
    }

    /// Handle one line received from server `index`.
    pub fn receive_line(&mut self, index: usize, line: &str) {
        crate::dispatch::dispatch_line(self, index, line);
    }

    /// Command names for completion: built-ins a user can type and plugin
    /// commands, sorted and deduplicated.
    pub fn complete_command(&self, prefix: &str) -> Vec<String> {
        let mut names: Vec<String> = registry::matching_prefix(prefix)
            .filter(|spec| spec.has_outbound())
            .map(|spec| spec.name.to_owned())
            .chain(self.plugins.command_names_matching(prefix))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    // ------------------------------------------------------------------
    // Plugins
    // ------------------------------------------------------------------

    pub fn load_plugin(&mut self, plugin: Box<dyn Plugin>) -> Result<(), PluginError> {
        crate::plugin::load(self, plugin)
    }

    pub fn unload_plugin(&mut self, name: &str) -> Result<(), PluginError> {
        crate::plugin::unload(self, name)
    }
}

/// Best-effort local hostname. Falls back to the `HOSTNAME` variable, then
/// to `unknown`.
pub fn local_hostname() -> String {
    std::fs::read_to_string("/etc/hostname")
        .ok()
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .or_else(|| std::env::var("HOSTNAME").ok().filter(|s| !s.is_empty()))
        .unwrap_or_else(|| "unknown".to_owned())
}
