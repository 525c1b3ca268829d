//! Plugin surface.
//!
//! Plugins are Rust values implementing [`Plugin`]. They are handed a
//! [`PluginApi`] when loaded and whenever one of their handlers runs, and
//! only ever reach the client through it. Handlers run on the dispatch
//! path itself, before the built-in handler for the same event.

mod api;
mod host;
mod snapshot;

pub use api::PluginApi;
pub use host::{CommandHelp, HandlerCall, HandlerFn, HandlerId, HandlerKind, HandlerOutcome, PluginHost};
pub use snapshot::{ChannelInfo, DccInfo, NickInfo, ServerInfo};

use tracing::{info, warn};

use crate::client::Client;
use crate::error::PluginError;

/// A loadable extension.
pub trait Plugin: Send {
    fn name(&self) -> &str;

    fn version(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// Register handlers and read configuration. An error aborts the load
    /// and drops every handler registered so far.
    fn init(&mut self, api: &mut PluginApi<'_>) -> Result<(), PluginError>;

    /// Called on unload, before the plugin's handlers are removed.
    fn end(&mut self, _api: &mut PluginApi<'_>) {}
}

/// Load a plugin and run its `init`.
pub fn load(client: &mut Client, mut plugin: Box<dyn Plugin>) -> Result<(), PluginError> {
    let name = plugin.name().to_owned();
    if client.plugins.is_loaded(&name) {
        return Err(PluginError::AlreadyLoaded(name));
    }

    let mut api = PluginApi::new(client, &name);
    if let Err(e) = plugin.init(&mut api) {
        let dropped = client.plugins.remove_all(&name);
        warn!(plugin = %name, error = %e, dropped, "plugin init failed");
        return Err(e);
    }
    client.plugins.insert_plugin(plugin);
    Ok(())
}

/// Run a plugin's `end` and remove it with all its handlers. Its private
/// configuration stays on disk.
pub fn unload(client: &mut Client, name: &str) -> Result<(), PluginError> {
    let mut plugin = client
        .plugins
        .take_plugin(name)
        .ok_or_else(|| PluginError::NotLoaded(name.to_owned()))?;
    let owner = plugin.name().to_owned();

    plugin.end(&mut PluginApi::new(client, &owner));
    let removed = client.plugins.remove_all(&owner);
    info!(plugin = %owner, handlers = removed, "plugin unloaded");
    Ok(())
}

/// Run every plugin handler registered for `name`, in registration order.
///
/// Stops at the first handler that eats the event and returns
/// [`HandlerOutcome::Eat`]; otherwise returns `Failed` if any handler
/// failed. Handlers removed by an earlier handler in the same round are
/// skipped.
pub(crate) fn run_handlers(
    client: &mut Client,
    kind: HandlerKind,
    name: &str,
    server: Option<&str>,
    args: &str,
) -> HandlerOutcome {
    let mut outcome = HandlerOutcome::Ok;
    for id in client.plugins.matching(kind, name) {
        let Some((mut callback, plugin, handler_args)) = client.plugins.checkout(id) else {
            continue;
        };
        let call = HandlerCall {
            server,
            name,
            args,
            handler_args: &handler_args,
        };
        let result = callback(&mut PluginApi::new(client, &plugin), &call);
        client.plugins.checkin(id, callback);

        match result {
            HandlerOutcome::Eat => return HandlerOutcome::Eat,
            HandlerOutcome::Failed => {
                warn!(plugin = %plugin, handler = %name, "plugin handler failed");
                outcome = HandlerOutcome::Failed;
            }
            HandlerOutcome::Ok => {}
        }
    }
    outcome
}
