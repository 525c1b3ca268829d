//! User-visible output.
//!
//! The core never renders anything itself. Every line meant for the user
//! goes to an [`OutputSink`] together with the buffer it belongs to and a
//! [`PrefixKind`] describing what sort of line it is. Diagnostics go to
//! `tracing` instead.

use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

/// Where a line is displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BufferRef {
    /// The top-level buffer, not tied to any server.
    Core,
    /// A server buffer.
    Server(String),
    /// A channel or private conversation on a server.
    Channel { server: String, channel: String },
}

impl BufferRef {
    pub fn channel(server: &str, channel: &str) -> Self {
        Self::Channel {
            server: server.to_owned(),
            channel: channel.to_owned(),
        }
    }
}

impl fmt::Display for BufferRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Core => f.write_str("core"),
            Self::Server(server) => f.write_str(server),
            Self::Channel { server, channel } => write!(f, "{server}/{channel}"),
        }
    }
}

/// Kind of line, used by renderers to pick a prefix and colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefixKind {
    /// Chat text from a nick.
    Message,
    /// Informational line from the client.
    Info,
    /// A `/me` from someone else.
    Action,
    /// Our own `/me`.
    ActionMe,
    Join,
    Part,
    Quit,
    Error,
    /// Text printed on behalf of a plugin.
    Plugin,
    /// Text relayed from the server.
    Server,
}

impl PrefixKind {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Message => "",
            Self::Info => "-=-",
            Self::Action | Self::ActionMe => "*",
            Self::Join => "-->",
            Self::Part | Self::Quit => "<--",
            Self::Error => "=!=",
            Self::Plugin => "-P-",
            Self::Server => "-@-",
        }
    }
}

/// Consumer of user-visible text.
pub trait OutputSink: Send {
    /// Display a line in a buffer.
    fn print(&mut self, buffer: &BufferRef, prefix: PrefixKind, text: &str);

    /// Append a line to the buffer's log without displaying it.
    fn log(&mut self, buffer: &BufferRef, text: &str);

    /// Show a transient message in the info bar for `seconds` (0 = until
    /// replaced).
    fn infobar(&mut self, seconds: u32, text: &str);
}

/// A line captured by a [`Transcript`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLine {
    pub buffer: BufferRef,
    pub prefix: PrefixKind,
    pub text: String,
}

#[derive(Debug, Default)]
struct TranscriptInner {
    lines: Vec<DisplayLine>,
    logs: Vec<(BufferRef, String)>,
    infobar: Vec<(u32, String)>,
}

/// In-memory sink. Clones share the same storage, so one handle can be
/// given to a `Client` and another kept to inspect what was shown.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    inner: Arc<Mutex<TranscriptInner>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut TranscriptInner) -> R) -> R {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut inner)
    }

    /// Every displayed line, oldest first.
    pub fn lines(&self) -> Vec<DisplayLine> {
        self.with(|t| t.lines.clone())
    }

    /// Texts displayed in `buffer`.
    pub fn texts_in(&self, buffer: &BufferRef) -> Vec<String> {
        self.with(|t| {
            t.lines
                .iter()
                .filter(|l| &l.buffer == buffer)
                .map(|l| l.text.clone())
                .collect()
        })
    }

    /// True if any displayed line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.with(|t| t.lines.iter().any(|l| l.text.contains(needle)))
    }

    /// Lines displayed with the given prefix kind.
    pub fn with_prefix(&self, prefix: PrefixKind) -> Vec<DisplayLine> {
        self.with(|t| t.lines.iter().filter(|l| l.prefix == prefix).cloned().collect())
    }

    pub fn logs(&self) -> Vec<(BufferRef, String)> {
        self.with(|t| t.logs.clone())
    }

    pub fn infobar(&self) -> Vec<(u32, String)> {
        self.with(|t| t.infobar.clone())
    }

    pub fn clear(&self) {
        self.with(|t| *t = TranscriptInner::default());
    }
}

impl OutputSink for Transcript {
    fn print(&mut self, buffer: &BufferRef, prefix: PrefixKind, text: &str) {
        self.with(|t| {
            t.lines.push(DisplayLine {
                buffer: buffer.clone(),
                prefix,
                text: text.to_owned(),
            })
        });
    }

    fn log(&mut self, buffer: &BufferRef, text: &str) {
        self.with(|t| t.logs.push((buffer.clone(), text.to_owned())));
    }

    fn infobar(&mut self, seconds: u32, text: &str) {
        self.with(|t| t.infobar.push((seconds, text.to_owned())));
    }
}

/// Plain-text sink for the terminal binary.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn print(&mut self, buffer: &BufferRef, prefix: PrefixKind, text: &str) {
        let time = chrono::Local::now().format("%H:%M:%S");
        let mut out = std::io::stdout().lock();
        // A closed stdout has nowhere left to report to.
        let _ = match prefix.symbol() {
            "" => writeln!(out, "{time} [{buffer}] {text}"),
            symbol => writeln!(out, "{time} [{buffer}] {symbol} {text}"),
        };
    }

    fn log(&mut self, buffer: &BufferRef, text: &str) {
        tracing::info!(buffer = %buffer, "{text}");
    }

    fn infobar(&mut self, _seconds: u32, text: &str) {
        let _ = writeln!(std::io::stdout().lock(), "[infobar] {text}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_clones_share_storage() {
        let transcript = Transcript::new();
        let mut sink: Box<dyn OutputSink> = Box::new(transcript.clone());
        let buffer = BufferRef::channel("libera", "#rust");

        sink.print(&buffer, PrefixKind::Join, "bob has joined #rust");
        sink.log(&buffer, "logged");
        sink.infobar(5, "hi");

        assert_eq!(transcript.texts_in(&buffer), vec!["bob has joined #rust"]);
        assert_eq!(transcript.with_prefix(PrefixKind::Join).len(), 1);
        assert!(transcript.contains("joined"));
        assert_eq!(transcript.logs().len(), 1);
        assert_eq!(transcript.infobar(), vec![(5, "hi".to_string())]);
    }

    #[test]
    fn test_buffer_display() {
        assert_eq!(BufferRef::channel("libera", "#rust").to_string(), "libera/#rust");
        assert_eq!(BufferRef::Core.to_string(), "core");
    }
}
