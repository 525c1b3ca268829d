//! Integration tests for the plugin surface: loading, message and command
//! handlers, info lookups, snapshots and configuration.

mod common;

use std::sync::{Arc, Mutex};

use common::TestClient;
use slirc_client::config::{OptionDef, OptionKind, OptionStore, Section};
use slirc_client::plugin::{CommandHelp, HandlerId, HandlerKind, HandlerOutcome, PluginHost};
use slirc_client::state::{ChannelKind, NickFlags, View};
use slirc_client::{BufferRef, Client, HandlerError, Plugin, PluginApi, PluginError, PrefixKind};

/// Plugin whose `init` runs a test closure against the API.
struct Scripted<F> {
    name: &'static str,
    body: Option<F>,
}

impl<F> Plugin for Scripted<F>
where
    F: FnOnce(&mut PluginApi<'_>) -> Result<(), PluginError> + Send,
{
    fn name(&self) -> &str {
        self.name
    }

    fn version(&self) -> &str {
        "0.1"
    }

    fn init(&mut self, api: &mut PluginApi<'_>) -> Result<(), PluginError> {
        match self.body.take() {
            Some(body) => body(api),
            None => Ok(()),
        }
    }
}

fn scripted<F>(name: &'static str, body: F) -> Box<dyn Plugin>
where
    F: FnOnce(&mut PluginApi<'_>) -> Result<(), PluginError> + Send + 'static,
{
    Box::new(Scripted {
        name,
        body: Some(body),
    })
}

/// Run `body` with an API handle, then unload it again.
fn with_api<F>(client: &mut Client, body: F)
where
    F: FnOnce(&mut PluginApi<'_>) + Send + 'static,
{
    client
        .load_plugin(scripted("scratch", move |api| {
            body(api);
            Ok(())
        }))
        .unwrap();
    client.unload_plugin("scratch").unwrap();
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_load_and_unload() {
    let mut t = TestClient::registered();
    t.client.load_plugin(scripted("alpha", |_| Ok(()))).unwrap();

    assert!(t.client.plugins.is_loaded("ALPHA"));
    let loaded: Vec<_> = t.client.plugins.loaded().collect();
    assert_eq!(loaded, vec![("alpha", "0.1", "")]);

    let err = t.client.load_plugin(scripted("alpha", |_| Ok(()))).unwrap_err();
    assert!(matches!(err, PluginError::AlreadyLoaded(name) if name == "alpha"));

    t.client.unload_plugin("alpha").unwrap();
    assert!(!t.client.plugins.is_loaded("alpha"));
    let err = t.client.unload_plugin("alpha").unwrap_err();
    assert!(matches!(err, PluginError::NotLoaded(_)));
}

#[test]
fn test_failed_init_drops_its_handlers() {
    let mut t = TestClient::registered();
    let err = t
        .client
        .load_plugin(scripted("broken", |api| {
            api.msg_handler_add("privmsg", "", Box::new(|_, _| HandlerOutcome::Ok));
            api.cmd_handler_add("broken", CommandHelp::default(), "", Box::new(|_, _| HandlerOutcome::Ok))?;
            Err(PluginError::UnknownInfo("boom".into()))
        }))
        .unwrap_err();

    assert!(matches!(err, PluginError::UnknownInfo(_)));
    assert!(!t.client.plugins.is_loaded("broken"));
    assert_eq!(t.client.plugins.handler_count(HandlerKind::Message, "privmsg"), 0);
    assert!(!t.client.plugins.has_command("broken"));
}

// ============================================================================
// Handlers
// ============================================================================

#[test]
fn test_message_handler_sees_line_and_may_eat_it() {
    let mut t = TestClient::registered();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    t.client
        .load_plugin(scripted("filter", move |api| {
            api.msg_handler_add(
                "PRIVMSG",
                "",
                Box::new(move |_, call| {
                    sink.lock().unwrap().push((call.server.map(str::to_owned), call.args.to_owned()));
                    if call.args.contains("secret") {
                        HandlerOutcome::Eat
                    } else {
                        HandlerOutcome::Ok
                    }
                }),
            );
            Ok(())
        }))
        .unwrap();

    t.feed(":bob!b@host PRIVMSG alice :the secret word");
    assert!(t.client.servers[0].channel("bob").is_none());

    t.feed(":carol!c@host PRIVMSG alice :hello");
    assert!(t.client.servers[0].channel("carol").is_some());

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].0.as_deref(), Some("test"));
    assert_eq!(seen[0].1, ":bob!b@host PRIVMSG alice :the secret word");
}

#[test]
fn test_handler_may_remove_itself_while_running() {
    let mut t = TestClient::registered();
    let calls = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&calls);
    let own_id: Arc<Mutex<Option<HandlerId>>> = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&own_id);

    t.client
        .load_plugin(scripted("once", move |api| {
            let id = api.msg_handler_add(
                "ping",
                "",
                Box::new(move |api, _| {
                    *counter.lock().unwrap() += 1;
                    if let Some(id) = *slot.lock().unwrap() {
                        api.handler_remove(id).unwrap();
                    }
                    HandlerOutcome::Ok
                }),
            );
            *own_id.lock().unwrap() = Some(id);
            Ok(())
        }))
        .unwrap();

    t.feed("PING :one");
    t.feed("PING :two");

    assert_eq!(*calls.lock().unwrap(), 1);
    assert_eq!(t.client.plugins.handler_count(HandlerKind::Message, "ping"), 0);
    // The built-in handler still answered both.
    assert_eq!(t.sent(), vec!["PONG :one\r\n", "PONG :two\r\n"]);
}

#[test]
fn test_plugin_command_runs_through_exec_command() {
    let mut t = TestClient::registered();
    t.client
        .load_plugin(scripted("greeter", |api| {
            let help = CommandHelp {
                description: "greet bob".into(),
                arguments: "text".into(),
                ..CommandHelp::default()
            };
            api.cmd_handler_add(
                "/Hello",
                help,
                "greetings,",
                Box::new(|api, call| {
                    let line = format!("/msg bob {} {}", call.handler_args, call.args);
                    match api.exec_command(call.server, None, &line) {
                        Ok(()) => HandlerOutcome::Ok,
                        Err(_) => HandlerOutcome::Failed,
                    }
                }),
            )?;
            Ok(())
        }))
        .unwrap();

    assert!(t.client.plugins.has_command("hello"));
    assert_eq!(t.client.plugins.command_help("hello").unwrap().description, "greet bob");
    assert_eq!(t.client.complete_command("hel"), vec!["hello"]);

    t.input("/hello world").unwrap();
    assert_eq!(t.sent(), vec!["PRIVMSG bob :greetings, world\r\n"]);

    t.client.unload_plugin("greeter").unwrap();
    let err = t.input("/hello world").unwrap_err();
    assert_eq!(err, HandlerError::UnknownCommand("hello".into()));
}

#[test]
fn test_command_names_are_exclusive() {
    let mut t = TestClient::registered();
    t.client
        .load_plugin(scripted("first", |api| {
            api.cmd_handler_add("shared", CommandHelp::default(), "", Box::new(|_, _| HandlerOutcome::Ok))?;
            Ok(())
        }))
        .unwrap();

    let err = t
        .client
        .load_plugin(scripted("second", |api| {
            api.cmd_handler_add("SHARED", CommandHelp::default(), "", Box::new(|_, _| HandlerOutcome::Ok))?;
            Ok(())
        }))
        .unwrap_err();
    assert!(matches!(err, PluginError::CommandExists(name) if name == "shared"));
}

#[test]
fn test_plugin_command_overrides_builtin() {
    let mut t = TestClient::registered();
    t.client
        .load_plugin(scripted("joiner", |api| {
            api.cmd_handler_add("join", CommandHelp::default(), "", Box::new(|_, _| HandlerOutcome::Failed))?;
            Ok(())
        }))
        .unwrap();

    t.input("/join #rust").unwrap();
    assert!(t.sent().is_empty());
    assert!(t.shows("plugin command \"join\" failed"));
}

#[test]
fn test_handler_remove_checks_owner() {
    let mut t = TestClient::registered();
    let stolen: Arc<Mutex<Option<HandlerId>>> = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&stolen);
    t.client
        .load_plugin(scripted("owner", move |api| {
            *slot.lock().unwrap() = Some(api.msg_handler_add("join", "", Box::new(|_, _| HandlerOutcome::Ok)));
            Ok(())
        }))
        .unwrap();

    let id = stolen.lock().unwrap().unwrap();
    with_api(&mut t.client, move |api| {
        assert!(matches!(api.handler_remove(id), Err(PluginError::HandlerNotFound(_))));
    });
    assert_eq!(t.client.plugins.handler_count(HandlerKind::Message, "join"), 1);
}

// ============================================================================
// Output and commands
// ============================================================================

#[test]
fn test_print_resolves_buffers() {
    let mut t = TestClient::in_channel("#rust");
    with_api(&mut t.client, |api| {
        api.print(None, None, "in the view").unwrap();
        api.print(Some("test"), None, "on the server").unwrap();
        api.print(Some("TEST"), Some("#RUST"), "in the channel").unwrap();

        let err = api.print(Some("nope"), None, "lost").unwrap_err();
        assert!(matches!(err, PluginError::BufferNotFound { .. }));
        let err = api.print(Some("test"), Some("#nope"), "lost").unwrap_err();
        assert!(matches!(err, PluginError::BufferNotFound { .. }));
    });

    let lines = t.transcript.with_prefix(PrefixKind::Plugin);
    let buffers: Vec<_> = lines.iter().map(|l| l.buffer.clone()).collect();
    assert_eq!(
        buffers,
        vec![
            BufferRef::channel("test", "#rust"),
            BufferRef::Server("test".into()),
            BufferRef::channel("test", "#rust"),
        ]
    );
}

#[test]
fn test_exec_command_unknown_context() {
    let mut t = TestClient::registered();
    with_api(&mut t.client, |api| {
        let err = api.exec_command(Some("nope"), None, "/join #x").unwrap_err();
        assert!(matches!(err, PluginError::ServerNotFound(_)));
        let err = api.exec_command(None, Some("#x"), "/join #x").unwrap_err();
        assert!(matches!(err, PluginError::ServerNotFound(_)));
    });
    assert!(t.shows("server/channel (nope/) not found for plugin exec command"));
    assert!(t.sent().is_empty());
}

// ============================================================================
// Info and snapshots
// ============================================================================

#[test]
fn test_get_info() {
    let mut t = TestClient::in_channel("#rust");
    let home = t.home().display().to_string();
    with_api(&mut t.client, move |api| {
        assert_eq!(api.get_info("version", None).unwrap().as_deref(), Some(slirc_client::VERSION));
        assert_eq!(api.get_info("weechatdir", None).unwrap(), Some(home));
        assert_eq!(api.get_info("nick", None).unwrap().as_deref(), Some("alice"));
        assert_eq!(api.get_info("server", Some("test")).unwrap().as_deref(), Some("test"));
        assert_eq!(api.get_info("channel", None).unwrap().as_deref(), Some("#rust"));
        assert_eq!(api.get_info("away", None).unwrap().as_deref(), Some("0"));

        assert!(matches!(api.get_info("shoe_size", None), Err(PluginError::UnknownInfo(_))));
        assert!(matches!(api.get_info("nick", Some("nope")), Err(PluginError::ServerNotFound(_))));
    });
}

#[test]
fn test_get_info_on_disconnected_server_has_no_value() {
    let mut t = TestClient::new();
    t.client.set_view(View::Server(0));
    with_api(&mut t.client, |api| {
        assert_eq!(api.get_info("nick", None).unwrap(), None);
        assert_eq!(api.get_info("server", None).unwrap(), None);
    });
}

#[test]
fn test_snapshots_are_copies() {
    let mut t = TestClient::in_channel("#rust");
    t.feed(":bob!b@host JOIN #rust");
    t.feed(":bob!b@host PRIVMSG alice :hi");
    t.feed(":irc.test 332 alice #rust :ownership");

    let snapshot = Arc::new(Mutex::new(None));
    let out = Arc::clone(&snapshot);
    with_api(&mut t.client, move |api| {
        let servers = api.get_server_info().unwrap();
        let channels = api.get_channel_info("test").unwrap();
        let nicks = api.get_nick_info("test", "#rust").unwrap();
        assert!(matches!(api.get_channel_info("nope"), Err(PluginError::ServerNotFound(_))));
        assert!(matches!(
            api.get_nick_info("test", "#nope"),
            Err(PluginError::ChannelNotFound(_))
        ));
        *out.lock().unwrap() = Some((servers, channels, nicks));
    });

    t.feed(":alice!al@box.local PART #rust");
    t.client.disconnected(0);

    let guard = snapshot.lock().unwrap();
    let (servers, channels, nicks) = guard.as_ref().unwrap();
    assert_eq!(servers.len(), 1);
    assert_eq!(servers[0].name, "test");
    assert!(servers[0].is_connected);
    assert_eq!(servers[0].nick, "alice");
    assert_eq!(servers[0].nick2, "alice_");

    assert_eq!(channels.len(), 2);
    assert_eq!(channels[0].name, "#rust");
    assert_eq!(channels[0].topic, "ownership");
    assert_eq!(channels[0].nicks_count, 2);
    assert_eq!(channels[1].kind, ChannelKind::Private);

    assert_eq!(nicks[0].nick, "alice");
    assert!(nicks[0].flags.contains(NickFlags::OP));
    assert_eq!(nicks[1].nick, "bob");
}

#[test]
fn test_dcc_snapshot() {
    let mut t = TestClient::registered();
    t.input("/dcc chat bob").unwrap();
    with_api(&mut t.client, |api| {
        let dcc = api.get_dcc_info().unwrap();
        assert_eq!(dcc.len(), 1);
        assert_eq!(dcc[0].nick, "bob");
        assert_eq!(dcc[0].server, "test");
        assert_eq!(dcc[0].filename, "");
    });
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_get_and_set_config() {
    let mut t = TestClient::registered();
    with_api(&mut t.client, |api| {
        assert_eq!(api.get_config("irc_default_msg_quit").unwrap(), "slirc");
        api.set_config("irc_default_msg_quit", "off to lunch").unwrap();

        assert_eq!(api.get_config("irc_notice_as_pv").unwrap(), "off");
        let err = api.set_config("irc_notice_as_pv", "maybe").unwrap_err();
        assert!(matches!(err, PluginError::InvalidValue { .. }));

        assert_eq!(api.get_config("test.server_port").unwrap(), "6667");
        api.set_config("TEST.server_autorejoin", "off").unwrap();
        assert_eq!(api.get_config("test.server_autorejoin").unwrap(), "off");

        assert!(matches!(api.get_config("no_such_option"), Err(PluginError::UnknownOption(_))));
        assert!(matches!(api.get_config("nope.server_port"), Err(PluginError::ServerNotFound(_))));
    });

    assert!(!t.client.servers[0].autorejoin);
    t.input("/quit").unwrap();
    assert_eq!(t.sent(), vec!["QUIT :off to lunch\r\n"]);
}

#[test]
fn test_set_config_keeps_server_names_addressable() {
    let mut other = common::server_block();
    other.name = "other".into();
    let mut t = TestClient::with_servers(vec![common::server_block(), other]);
    with_api(&mut t.client, |api| {
        for (option, value) in [
            ("test.server_name", "a.b"),
            ("test.server_name", ""),
            ("test.server_name", "OTHER"),
            ("test.server_nick1", ""),
            ("test.server_nick3", ""),
        ] {
            let err = api.set_config(option, value).unwrap_err();
            assert!(
                matches!(err, PluginError::InvalidValue { .. }),
                "{option}={value:?} gave {err:?}"
            );
        }
        assert_eq!(api.get_config("test.server_port").unwrap(), "6667");
        assert_eq!(api.get_config("test.server_nick1").unwrap(), "alice");

        // Renaming to its own name in another case is not a collision.
        api.set_config("test.server_name", "TEST").unwrap();
        api.set_config("test.server_name", "renamed").unwrap();
        assert_eq!(api.get_config("renamed.server_port").unwrap(), "6667");
        assert!(matches!(api.get_config("test.server_port"), Err(PluginError::ServerNotFound(_))));
    });

    let names: Vec<&str> = t.client.servers.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["renamed", "other"]);
}

#[test]
fn test_structural_sections_stay_hidden() {
    let hidden = |section: Section, name: &'static str| OptionDef {
        section,
        name,
        description: "",
        kind: OptionKind::String,
        default: "x",
    };
    let mut t = TestClient::registered();
    t.client.options = OptionStore::with_defs(&[
        hidden(Section::Keys, "key_ctrl_l"),
        hidden(Section::Alias, "alias_j"),
        hidden(Section::Ignore, "ignore_bob"),
        OptionDef {
            section: Section::Look,
            name: "look_nicklist",
            description: "",
            kind: OptionKind::Boolean,
            default: "on",
        },
    ]);

    with_api(&mut t.client, |api| {
        for name in ["key_ctrl_l", "ALIAS_J", "ignore_bob"] {
            assert!(matches!(api.get_config(name), Err(PluginError::UnknownOption(_))), "{name}");
            assert!(
                matches!(api.set_config(name, "y"), Err(PluginError::UnknownOption(_))),
                "{name}"
            );
        }
        assert_eq!(api.get_config("look_nicklist").unwrap(), "on");
    });

    assert_eq!(t.client.options.string("alias_j"), Some("x"));
}

#[test]
fn test_plugin_config_persists() {
    let mut t = TestClient::registered();
    t.client
        .load_plugin(scripted("notes", |api| {
            api.set_plugin_config("Color", "blue")?;
            api.set_plugin_config("size", "12")?;
            api.set_plugin_config("size", "")?;
            assert_eq!(api.get_plugin_config("COLOR").as_deref(), Some("blue"));
            assert_eq!(api.get_plugin_config("size"), None);
            Ok(())
        }))
        .unwrap();

    let mut reread = PluginHost::new(t.client.plugins.config_path());
    reread.load_configs().unwrap();
    assert_eq!(reread.plugin_config("notes", "color"), Some("blue"));
    assert_eq!(reread.plugin_config("notes", "size"), None);
    assert_eq!(reread.plugin_config("other", "color"), None);
}

// ============================================================================
// Files and strings
// ============================================================================

#[test]
fn test_home_files() {
    let mut t = TestClient::new();
    let visited = Arc::new(Mutex::new(Vec::new()));
    let out = Arc::clone(&visited);
    with_api(&mut t.client, move |api| {
        let dir = api.mkdir_home("data").unwrap();
        // A second call is not an error.
        assert_eq!(api.mkdir_home("data").unwrap(), dir);
        std::fs::write(dir.join("b.txt"), "b").unwrap();
        std::fs::write(dir.join("a.txt"), "a").unwrap();
        std::fs::create_dir(dir.join("sub")).unwrap();

        let count = api
            .exec_on_files(&dir, |_, path| {
                let name = path.file_name().unwrap().to_string_lossy().into_owned();
                out.lock().unwrap().push(name);
            })
            .unwrap();
        assert_eq!(count, 2);

        assert!(matches!(api.mkdir_home("../escape"), Err(PluginError::InvalidPath(_))));
        assert!(matches!(api.mkdir_home("/tmp/abs"), Err(PluginError::InvalidPath(_))));
    });
    assert_eq!(*visited.lock().unwrap(), vec!["a.txt", "b.txt"]);
}

#[test]
fn test_string_helpers() {
    let mut t = TestClient::new();
    with_api(&mut t.client, |api| {
        use std::cmp::Ordering;
        assert_eq!(api.ascii_strcasecmp("Rust", "rUST"), Ordering::Equal);
        assert_eq!(api.ascii_strncasecmp("abcdef", "ABCxyz", 3), Ordering::Equal);
        assert_eq!(api.explode_string("a,,b c", ", ", 0), vec!["a", "b", "c"]);
        assert_eq!(api.plugin_name(), "scratch");
    });
}
