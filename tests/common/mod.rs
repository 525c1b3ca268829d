//! Integration test common infrastructure.
//!
//! Builds a client backed by an in-memory transcript and feeds it lines the
//! way the network loop would, so tests can assert on what was queued for
//! the server and what the user saw.

#![allow(dead_code)]

use slirc_client::config::{Config, ServerBlock};
use slirc_client::{BufferRef, Client, HandlerResult, Transcript};
use tempfile::TempDir;

pub const SERVER: &str = "test";

pub struct TestClient {
    pub client: Client,
    pub transcript: Transcript,
    home: TempDir,
}

/// The block every test server starts from: `test` at `irc.test`, nicks
/// alice, alice_ and alice__.
pub fn server_block() -> ServerBlock {
    let mut block = ServerBlock::new(SERVER, "irc.test", "alice");
    block.nicks = vec!["alice".into(), "alice_".into(), "alice__".into()];
    block.username = "al".into();
    block.realname = "Alice Liddell".into();
    block
}

impl TestClient {
    /// One disconnected server built from [`server_block`].
    pub fn new() -> Self {
        Self::with_servers(vec![server_block()])
    }

    pub fn with_servers(servers: Vec<ServerBlock>) -> Self {
        let home = tempfile::tempdir().expect("Failed to create home directory");
        let mut config = Config::default();
        config.client.home = home.path().to_path_buf();
        config.servers = servers;

        let transcript = Transcript::new();
        let mut client = Client::new(&config, Box::new(transcript.clone()));
        client.set_hostname("box.local");
        Self {
            client,
            transcript,
            home,
        }
    }

    /// Connected and registered as alice, with the login lines and the
    /// welcome output already drained.
    pub fn registered() -> Self {
        let mut t = Self::new();
        t.client.connect(0).expect("Failed to connect");
        t.feed(":irc.test 001 alice :Welcome to the Test IRC Network alice");
        t.sent();
        t.transcript.clear();
        t
    }

    /// Registered and joined to `channel`, alone.
    pub fn in_channel(channel: &str) -> Self {
        let mut t = Self::registered();
        t.feed(&format!(":alice!al@box.local JOIN {channel}"));
        t.feed(&format!(":irc.test 353 alice = {channel} :@alice"));
        t.feed(&format!(":irc.test 366 alice {channel} :End of /NAMES list."));
        t.transcript.clear();
        t
    }

    pub fn home(&self) -> &std::path::Path {
        self.home.path()
    }

    /// Feed one line from the server.
    pub fn feed(&mut self, line: &str) {
        self.client.receive_line(0, line);
    }

    /// Type one line in the active view.
    pub fn input(&mut self, text: &str) -> HandlerResult {
        self.client.user_input(text)
    }

    /// Drain the lines queued for the server.
    pub fn sent(&mut self) -> Vec<String> {
        self.client.servers[0].take_outbound()
    }

    pub fn shows(&self, needle: &str) -> bool {
        self.transcript.contains(needle)
    }

    pub fn server_buffer(&self) -> BufferRef {
        BufferRef::Server(SERVER.to_owned())
    }

    pub fn channel_buffer(&self, channel: &str) -> BufferRef {
        BufferRef::channel(SERVER, channel)
    }

    /// Texts shown in a channel or private buffer.
    pub fn texts_in(&self, channel: &str) -> Vec<String> {
        self.transcript.texts_in(&self.channel_buffer(channel))
    }
}
