//! Integration tests for user commands: what each one queues for the
//! server, how the current view supplies implicit targets, and how usage
//! errors are reported.

mod common;

use common::TestClient;
use proptest::prelude::*;
use slirc_client::handlers::registry;
use slirc_client::state::View;
use slirc_client::{HandlerError, PrefixKind};

#[test]
fn test_plain_text_goes_to_current_channel() {
    let mut t = TestClient::in_channel("#rust");
    t.input("hello world").unwrap();

    assert_eq!(t.sent(), vec!["PRIVMSG #rust :hello world\r\n"]);
    assert_eq!(t.texts_in("#rust"), vec!["<@alice> hello world"]);
}

#[test]
fn test_double_slash_sends_literal_slash() {
    let mut t = TestClient::in_channel("#rust");
    t.input("//join is a command").unwrap();
    assert_eq!(t.sent(), vec!["PRIVMSG #rust :/join is a command\r\n"]);
}

#[test]
fn test_msg_star_on_server_view_fails() {
    let mut t = TestClient::registered();
    t.client.set_view(View::Server(0));

    let err = t.input("/msg * hi").unwrap_err();
    assert_eq!(err, HandlerError::NoChannelContext("msg".into()));
    assert!(t.sent().is_empty());
    assert_eq!(t.transcript.with_prefix(PrefixKind::Error).len(), 1);
}

#[test]
fn test_msg_to_nick_opens_private() {
    let mut t = TestClient::registered();
    t.input("/msg bob,#rust hey there").unwrap();

    assert_eq!(
        t.sent(),
        vec!["PRIVMSG bob :hey there\r\n", "PRIVMSG #rust :hey there\r\n"]
    );
    let server = &t.client.servers[0];
    assert!(server.channel("bob").unwrap().is_private());
    // Not joined, so no window and no echo.
    assert!(server.channel("#rust").is_none());
    assert_eq!(t.texts_in("bob"), vec!["<alice> hey there"]);
}

#[test]
fn test_msg_to_mask_opens_nothing() {
    let mut t = TestClient::registered();
    t.input("/msg $*.fi maintenance tonight").unwrap();

    assert_eq!(t.sent(), vec!["PRIVMSG $*.fi :maintenance tonight\r\n"]);
    assert!(t.client.servers[0].channels.is_empty());
}

#[test]
fn test_msg_without_text_is_wrong_arg_count() {
    let mut t = TestClient::registered();
    let err = t.input("/msg bob").unwrap_err();
    assert!(matches!(err, HandlerError::WrongArgCount { .. }));
}

#[test]
fn test_me_sends_action() {
    let mut t = TestClient::in_channel("#rust");
    t.input("/me waves").unwrap();

    assert_eq!(t.sent(), vec!["PRIVMSG #rust :\x01ACTION waves\x01\r\n"]);
    let own = t.transcript.with_prefix(PrefixKind::ActionMe);
    assert_eq!(own[0].text, "alice waves");
}

#[test]
fn test_part_defaults_to_current_channel() {
    let mut t = TestClient::in_channel("#rust");
    t.input("/part see you").unwrap();
    assert_eq!(t.sent(), vec!["PART #rust :see you\r\n"]);

    t.input("/part #other").unwrap();
    assert_eq!(t.sent(), vec!["PART #other\r\n"]);
}

#[test]
fn test_part_on_private_closes_locally() {
    let mut t = TestClient::registered();
    t.feed(":bob!b@host PRIVMSG alice :hi");
    t.client.set_view(View::channel(0, "bob"));

    t.input("/part").unwrap();

    assert!(t.sent().is_empty());
    assert!(t.client.servers[0].channel("bob").is_none());
    assert_eq!(t.client.view, View::Server(0));
}

#[test]
fn test_topic_forms() {
    let mut t = TestClient::in_channel("#rust");
    t.input("/topic").unwrap();
    t.input("/topic new topic").unwrap();
    t.input("/topic #other -delete").unwrap();

    assert_eq!(
        t.sent(),
        vec![
            "TOPIC #rust\r\n",
            "TOPIC #rust :new topic\r\n",
            "TOPIC #other :\r\n",
        ]
    );
}

#[test]
fn test_kick_uses_current_channel() {
    let mut t = TestClient::in_channel("#rust");
    t.input("/kick bob flooding the channel").unwrap();
    t.input("/kick #other carol").unwrap();

    assert_eq!(
        t.sent(),
        vec![
            "KICK #rust bob :flooding the channel\r\n",
            "KICK #other carol\r\n",
        ]
    );
}

#[test]
fn test_op_requires_channel_view() {
    let mut t = TestClient::in_channel("#rust");
    t.input("/op bob").unwrap();
    assert_eq!(t.sent(), vec!["MODE #rust +o bob\r\n"]);

    t.client.set_view(View::Server(0));
    let err = t.input("/voice bob").unwrap_err();
    assert_eq!(err, HandlerError::NoChannelContext("voice".into()));
}

#[test]
fn test_away_all_servers() {
    let mut second = common::server_block();
    second.name = "other".into();
    let mut t = TestClient::with_servers(vec![common::server_block(), second]);
    t.client.connect(0).unwrap();
    t.client.connect(1).unwrap();
    t.sent();
    t.client.servers[1].take_outbound();

    t.input("/away -all lunch").unwrap();

    assert_eq!(t.sent(), vec!["AWAY :lunch\r\n"]);
    assert_eq!(t.client.servers[1].take_outbound(), vec!["AWAY :lunch\r\n"]);

    t.input("/away").unwrap();
    assert_eq!(t.sent(), vec!["AWAY\r\n"]);
}

#[test]
fn test_away_replies_track_state() {
    let mut t = TestClient::registered();
    t.feed(":irc.test 306 alice :You have been marked as being away");
    assert!(t.client.servers[0].is_away);
    assert!(t.client.servers[0].away_since.is_some());

    t.feed(":irc.test 305 alice :You are no longer marked as being away");
    assert!(!t.client.servers[0].is_away);
    assert!(t.client.servers[0].away_since.is_none());
}

#[test]
fn test_quit_uses_default_message() {
    let mut t = TestClient::registered();
    t.input("/quit").unwrap();

    assert_eq!(t.sent(), vec!["QUIT :slirc\r\n"]);
    assert!(t.client.quit_requested);
}

#[test]
fn test_quit_allowed_while_disconnected() {
    let mut t = TestClient::new();
    t.input("/quit bye").unwrap();
    assert!(t.sent().is_empty());
    assert!(t.client.quit_requested);
}

#[test]
fn test_commands_need_connection() {
    let mut t = TestClient::new();
    let err = t.input("/join #rust").unwrap_err();
    assert_eq!(err, HandlerError::NotConnected("join".into()));
    assert!(t.shows("\"join\" command requires a connected server"));
}

#[test]
fn test_unknown_command() {
    let mut t = TestClient::registered();
    let err = t.input("/frobnicate now").unwrap_err();
    assert_eq!(err, HandlerError::UnknownCommand("frobnicate".into()));

    // Inbound-only entries cannot be typed.
    let err = t.input("/privmsg bob hi").unwrap_err();
    assert_eq!(err, HandlerError::UnknownCommand("privmsg".into()));
}

#[test]
fn test_argument_bounds_checked() {
    let mut t = TestClient::registered();
    let err = t.input("/invite bob").unwrap_err();
    assert_eq!(
        err,
        HandlerError::WrongArgCount {
            command: "invite".into(),
            min: 2,
            max: Some(2),
        }
    );
    assert!(t.sent().is_empty());

    t.input("/invite bob #rust").unwrap();
    assert_eq!(t.sent(), vec!["INVITE bob #rust\r\n"]);
}

#[test]
fn test_argument_bounds_table() {
    let cases: &[(&str, &str, usize, Option<usize>)] = &[
        ("/invite bob", "invite", 2, Some(2)),
        ("/invite bob #rust #go", "invite", 2, Some(2)),
        ("/op", "op", 1, Some(1)),
        ("/op a b", "op", 1, Some(1)),
        ("/nick", "nick", 1, Some(1)),
        ("/nick bob robert", "nick", 1, Some(1)),
        ("/dcc send", "dcc", 2, Some(3)),
        ("/dcc send bob notes.txt extra", "dcc", 2, Some(3)),
        ("/admin a b", "admin", 0, Some(1)),
        ("/links a b c", "links", 0, Some(2)),
        ("/service a b c d e", "service", 6, Some(6)),
        ("/die now", "die", 0, Some(0)),
    ];

    let mut t = TestClient::in_channel("#rust");
    for &(input, command, min, max) in cases {
        let err = t.input(input).unwrap_err();
        assert_eq!(
            err,
            HandlerError::WrongArgCount {
                command: command.into(),
                min,
                max,
            },
            "{input}"
        );
        assert!(t.sent().is_empty(), "{input} queued a line");
    }
}

#[test]
fn test_command_names_case_insensitive() {
    let mut t = TestClient::registered();
    t.input("/JOIN #Rust").unwrap();
    t.input("/WhoIs bob").unwrap();
    assert_eq!(t.sent(), vec!["JOIN #Rust\r\n", "WHOIS bob\r\n"]);
}

#[test]
fn test_quote_strips_line_breaks() {
    let mut t = TestClient::registered();
    t.input("/quote PRIVMSG bob :a\rb").unwrap();
    assert_eq!(t.sent(), vec!["PRIVMSG bob :ab\r\n"]);
}

#[test]
fn test_ctcp_ping_carries_timestamp() {
    let mut t = TestClient::registered();
    t.input("/ctcp bob ping").unwrap();

    let lines = t.sent();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("PRIVMSG bob :\x01PING "));
    assert!(lines[0].ends_with("\x01\r\n"));
}

#[test]
fn test_version_in_channel_goes_to_nick() {
    let mut t = TestClient::in_channel("#rust");
    t.feed(":bob!b@host JOIN #rust");
    t.input("/version bob").unwrap();
    t.input("/version irc.other").unwrap();

    assert_eq!(
        t.sent(),
        vec!["PRIVMSG bob :\x01VERSION\x01\r\n", "VERSION irc.other\r\n"]
    );
}

#[test]
fn test_dcc_send_and_close() {
    let mut t = TestClient::registered();
    t.input("/dcc send bob notes.txt").unwrap();

    let id = t.client.dcc.iter().next().unwrap().id;
    assert!(t.shows(&format!("DCC #{id}: offering \"notes.txt\" to bob")));

    t.input(&format!("/dcc close {id}")).unwrap();
    assert!(t.client.dcc.is_empty());

    let err = t.input(&format!("/dcc close {id}")).unwrap_err();
    assert_eq!(err, HandlerError::NoSuchTransfer(id));
}

#[test]
fn test_complete_command_merges_sorted() {
    let t = TestClient::new();
    assert_eq!(t.client.complete_command("wh"), vec!["who", "whois", "whowas"]);
    // Numerics and inbound-only entries are never offered.
    assert!(t.client.complete_command("pri").is_empty());
}

proptest! {
    #[test]
    fn prop_lookup_ignores_case(index in 0..registry::COMMANDS.len(), mask in any::<u64>()) {
        let name = registry::COMMANDS[index].name;
        let mixed: String = name
            .chars()
            .enumerate()
            .map(|(i, c)| if mask >> (i % 64) & 1 == 1 { c.to_ascii_uppercase() } else { c })
            .collect();
        let spec = registry::lookup(&mixed).unwrap();
        prop_assert_eq!(spec.name, name);
    }
}
