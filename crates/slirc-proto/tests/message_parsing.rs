//! Parsing of real-world server lines.

use slirc_proto::{Ctcp, CtcpKind, MessageParseError, MessageRef, PrefixRef, irc_eq};

#[test]
fn test_registration_burst() {
    let lines = [
        ":irc.example.net 001 alice :Welcome to the network alice!a@h",
        ":irc.example.net 004 alice irc.example.net ircd-2.11 aoOirw abeiIklmnoOpqrstv",
        ":irc.example.net 433 * alice :Nickname is already in use",
        ":irc.example.net 353 alice = #rust :@bob +carol dave",
        ":irc.example.net 366 alice #rust :End of NAMES list",
    ];

    for line in lines {
        let msg = MessageRef::parse(line).unwrap_or_else(|e| panic!("failed to parse {line:?}: {e}"));
        assert!(msg.is_numeric());
        assert_eq!(msg.prefix, Some(PrefixRef::ServerName("irc.example.net")));
    }
}

#[test]
fn test_names_reply_fields() {
    let msg = MessageRef::parse(":srv 353 alice = #rust :@bob +carol dave").unwrap();
    assert_eq!(msg.arg(2), Some("#rust"));
    assert_eq!(msg.trailing(), Some("@bob +carol dave"));
}

#[test]
fn test_ctcp_inside_privmsg() {
    let msg = MessageRef::parse(":bob!b@h PRIVMSG alice :\x01VERSION\x01").unwrap();
    let ctcp = Ctcp::parse(msg.trailing().unwrap()).unwrap();
    assert_eq!(ctcp.kind, CtcpKind::Version);
}

#[test]
fn test_dcc_offer_params() {
    let msg = MessageRef::parse(":bob!b@h PRIVMSG alice :\x01DCC SEND file.txt 3232235777 5000 1024\x01").unwrap();
    let ctcp = Ctcp::parse(msg.trailing().unwrap()).unwrap();
    assert_eq!(ctcp.kind, CtcpKind::Dcc);
    assert_eq!(ctcp.params, Some("SEND file.txt 3232235777 5000 1024"));
}

#[test]
fn test_nick_case_mapping() {
    let msg = MessageRef::parse(":Alice[m]!a@h NICK :alice{away}").unwrap();
    assert!(irc_eq(msg.source_nickname().unwrap(), "alice{m}"));
}

#[test]
fn test_errors() {
    assert_eq!(MessageRef::parse(""), Err(MessageParseError::EmptyMessage));
    assert_eq!(MessageRef::parse(":only.prefix"), Err(MessageParseError::InvalidPrefix));
    assert_eq!(MessageRef::parse("1234 x"), Err(MessageParseError::InvalidCommand));
}
