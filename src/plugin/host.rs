//! Plugin bookkeeping: loaded plugins, their handlers and their private
//! configuration.
//!
//! Handlers live in one list in registration order. While a callback runs
//! it is taken out of its slot, so a handler may remove itself, or any
//! other handler, without invalidating the one being called.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::Plugin;
use super::api::PluginApi;
use crate::config::ConfigError;
use crate::error::PluginError;

/// Opaque handle returned by handler registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(pub(crate) u64);

impl HandlerId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// What a handler is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    /// An inbound verb or numeric.
    Message,
    /// A user command.
    Command,
}

/// Result of one handler call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerOutcome {
    Ok,
    Failed,
    /// Handled; later plugin handlers and the built-in handler are skipped.
    Eat,
}

/// What a handler is called with.
#[derive(Debug, Clone, Copy)]
pub struct HandlerCall<'a> {
    /// Server the event belongs to, if any.
    pub server: Option<&'a str>,
    /// Lowercase command or message name.
    pub name: &'a str,
    /// The raw line for messages, the argument text for commands.
    pub args: &'a str,
    /// Free-form data given at registration.
    pub handler_args: &'a str,
}

/// Plugin callback. Any state it needs is captured by the closure.
pub type HandlerFn = Box<dyn FnMut(&mut PluginApi<'_>, &HandlerCall<'_>) -> HandlerOutcome + Send>;

/// Help text of a plugin command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandHelp {
    pub description: String,
    pub arguments: String,
    pub arguments_description: String,
    pub completion_template: String,
}

struct Registration {
    id: HandlerId,
    plugin: String,
    kind: HandlerKind,
    name: String,
    handler_args: String,
    help: Option<CommandHelp>,
    /// `None` while the callback is running.
    callback: Option<HandlerFn>,
}

/// Registry of loaded plugins and everything they own.
pub struct PluginHost {
    plugins: Vec<Box<dyn Plugin>>,
    handlers: Vec<Registration>,
    next_id: u64,
    configs: BTreeMap<String, BTreeMap<String, String>>,
    config_path: PathBuf,
}

impl PluginHost {
    /// Host persisting plugin configuration at `config_path`.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            plugins: Vec::new(),
            handlers: Vec::new(),
            next_id: 0,
            configs: BTreeMap::new(),
            config_path: config_path.into(),
        }
    }

    // ------------------------------------------------------------------
    // Plugins
    // ------------------------------------------------------------------

    pub fn is_loaded(&self, name: &str) -> bool {
        self.plugins.iter().any(|p| p.name().eq_ignore_ascii_case(name))
    }

    /// `(name, version, description)` of each loaded plugin, in load order.
    pub fn loaded(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.plugins
            .iter()
            .map(|p| (p.name(), p.version(), p.description()))
    }

    pub(crate) fn insert_plugin(&mut self, plugin: Box<dyn Plugin>) {
        info!(plugin = %plugin.name(), version = %plugin.version(), "plugin loaded");
        self.plugins.push(plugin);
    }

    pub(crate) fn take_plugin(&mut self, name: &str) -> Option<Box<dyn Plugin>> {
        let index = self
            .plugins
            .iter()
            .position(|p| p.name().eq_ignore_ascii_case(name))?;
        Some(self.plugins.remove(index))
    }

    // ------------------------------------------------------------------
    // Handlers
    // ------------------------------------------------------------------

    fn next_handler_id(&mut self) -> HandlerId {
        self.next_id += 1;
        HandlerId(self.next_id)
    }

    /// Register a handler for an inbound message. Several plugins may watch
    /// the same message; they run in registration order.
    pub fn add_message_handler(
        &mut self,
        plugin: &str,
        message: &str,
        handler_args: &str,
        callback: HandlerFn,
    ) -> HandlerId {
        let id = self.next_handler_id();
        let name = message.to_ascii_lowercase();
        debug!(plugin = %plugin, message = %name, id = id.0, "message handler added");
        self.handlers.push(Registration {
            id,
            plugin: plugin.to_owned(),
            kind: HandlerKind::Message,
            name,
            handler_args: handler_args.to_owned(),
            help: None,
            callback: Some(callback),
        });
        id
    }

    /// Register a user command. Only one plugin can own a command name.
    pub fn add_command_handler(
        &mut self,
        plugin: &str,
        command: &str,
        help: CommandHelp,
        handler_args: &str,
        callback: HandlerFn,
    ) -> Result<HandlerId, PluginError> {
        let name = command.trim_start_matches('/').to_ascii_lowercase();
        if name.is_empty() {
            return Err(PluginError::InvalidValue {
                option: "command".to_owned(),
                value: command.to_owned(),
            });
        }
        if self.has_command(&name) {
            return Err(PluginError::CommandExists(name));
        }

        let id = self.next_handler_id();
        debug!(plugin = %plugin, command = %name, id = id.0, "command handler added");
        self.handlers.push(Registration {
            id,
            plugin: plugin.to_owned(),
            kind: HandlerKind::Command,
            name,
            handler_args: handler_args.to_owned(),
            help: Some(help),
            callback: Some(callback),
        });
        Ok(id)
    }

    /// Remove one handler owned by `plugin`.
    pub fn remove_handler(&mut self, plugin: &str, id: HandlerId) -> Result<(), PluginError> {
        let index = self
            .handlers
            .iter()
            .position(|h| h.id == id && h.plugin == plugin)
            .ok_or(PluginError::HandlerNotFound(id.0))?;
        self.handlers.remove(index);
        Ok(())
    }

    /// Remove every handler owned by `plugin`. Returns how many went.
    pub fn remove_all(&mut self, plugin: &str) -> usize {
        let before = self.handlers.len();
        self.handlers.retain(|h| h.plugin != plugin);
        before - self.handlers.len()
    }

    pub fn has_command(&self, name: &str) -> bool {
        self.handlers
            .iter()
            .any(|h| h.kind == HandlerKind::Command && h.name.eq_ignore_ascii_case(name))
    }

    pub fn command_help(&self, name: &str) -> Option<&CommandHelp> {
        self.handlers
            .iter()
            .find(|h| h.kind == HandlerKind::Command && h.name.eq_ignore_ascii_case(name))
            .and_then(|h| h.help.as_ref())
    }

    /// Plugin command names starting with `prefix`, ignoring ASCII case.
    pub fn command_names_matching<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = String> + 'a {
        self.handlers
            .iter()
            .filter(|h| h.kind == HandlerKind::Command)
            .filter(move |h| {
                h.name
                    .as_bytes()
                    .get(..prefix.len())
                    .is_some_and(|head| head.eq_ignore_ascii_case(prefix.as_bytes()))
            })
            .map(|h| h.name.clone())
    }

    /// Number of handlers registered for `name`.
    pub fn handler_count(&self, kind: HandlerKind, name: &str) -> usize {
        self.handlers
            .iter()
            .filter(|h| h.kind == kind && h.name.eq_ignore_ascii_case(name))
            .count()
    }

    /// Ids of the handlers for `name`, in registration order.
    pub(crate) fn matching(&self, kind: HandlerKind, name: &str) -> Vec<HandlerId> {
        self.handlers
            .iter()
            .filter(|h| h.kind == kind && h.name.eq_ignore_ascii_case(name))
            .map(|h| h.id)
            .collect()
    }

    /// Take a callback out of its slot for the duration of a call, along
    /// with its owner and registration data. `None` when the handler is
    /// gone or already running.
    pub(crate) fn checkout(&mut self, id: HandlerId) -> Option<(HandlerFn, String, String)> {
        let slot = self.handlers.iter_mut().find(|h| h.id == id)?;
        let callback = slot.callback.take()?;
        Some((callback, slot.plugin.clone(), slot.handler_args.clone()))
    }

    /// Put a callback back. Dropped if its handler was removed meanwhile.
    pub(crate) fn checkin(&mut self, id: HandlerId, callback: HandlerFn) {
        if let Some(slot) = self.handlers.iter_mut().find(|h| h.id == id) {
            slot.callback = Some(callback);
        }
    }

    // ------------------------------------------------------------------
    // Plugin configuration
    // ------------------------------------------------------------------

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Read the persisted plugin options. A missing file is an empty
    /// configuration.
    pub fn load_configs(&mut self) -> Result<(), PluginError> {
        let text = match std::fs::read_to_string(&self.config_path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        self.configs = toml::from_str(&text).map_err(ConfigError::from)?;
        debug!(path = %self.config_path.display(), plugins = self.configs.len(), "plugin config read");
        Ok(())
    }

    fn write_configs(&self) -> Result<(), PluginError> {
        let text = toml::to_string(&self.configs).map_err(ConfigError::from)?;
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.config_path, text)?;
        Ok(())
    }

    pub fn plugin_config(&self, plugin: &str, option: &str) -> Option<&str> {
        self.configs
            .get(&plugin.to_ascii_lowercase())?
            .get(&option.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Store a plugin option and persist every plugin's options. An empty
    /// value removes the option.
    pub fn set_plugin_config(&mut self, plugin: &str, option: &str, value: &str) -> Result<(), PluginError> {
        let plugin = plugin.to_ascii_lowercase();
        let option = option.to_ascii_lowercase();
        if option.is_empty() {
            return Err(PluginError::UnknownOption(option));
        }

        if value.is_empty() {
            if let Some(table) = self.configs.get_mut(&plugin) {
                table.remove(&option);
                if table.is_empty() {
                    self.configs.remove(&plugin);
                }
            }
        } else {
            self.configs
                .entry(plugin)
                .or_default()
                .insert(option, value.to_owned());
        }
        self.write_configs()
    }
}
