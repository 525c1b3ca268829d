//! Telemetry utilities for handler timing and log correlation.

use std::time::Instant;

/// Guard timing one handler run.
///
/// Logs the elapsed time at `trace` when dropped.
pub struct CommandTimer {
    command: String,
    start: Instant,
}

impl CommandTimer {
    /// Start timing a command.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            start: Instant::now(),
        }
    }
}

impl Drop for CommandTimer {
    fn drop(&mut self) {
        let elapsed_us = self.start.elapsed().as_micros();
        tracing::trace!(command = %self.command, elapsed_us, "handler finished");
    }
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{Span, info_span};

    /// Span for one server connection driven by the network loop.
    pub fn connection(server: &str, address: &str) -> Span {
        info_span!("connection", server = %server, address = %address)
    }

    /// Span for dispatching one inbound line.
    pub fn dispatch(server: &str, command: &str) -> Span {
        info_span!("dispatch", server = %server, command = %command)
    }

    /// Span for one user or plugin command.
    pub fn command(name: &str, server: Option<&str>) -> Span {
        if let Some(server) = server {
            info_span!("command", name = %name, server = %server)
        } else {
            info_span!("command", name = %name)
        }
    }
}
