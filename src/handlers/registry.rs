//! The command table.
//!
//! One static entry per user command, server verb and numeric reply, each
//! carrying its help text, argument bounds and handlers. The table is
//! built at compile time and never changes. The registry itself never
//! runs a handler: [`crate::dispatch`] checks bounds and calls them.

use std::collections::HashMap;
use std::sync::LazyLock;

use slirc_proto::MessageRef;

use super::context::Context;
use super::inbound::{channel as in_channel, membership, messages, registration, whois};
use super::outbound::{channel, connection, dcc, messaging, oper, query};
use crate::error::{HandlerError, HandlerResult};

/// Outbound handler taking the argument text as typed.
pub type JoinedFn = fn(&mut Context<'_>, Option<&str>) -> HandlerResult;
/// Outbound handler taking the arguments split on spaces.
pub type SplitFn = fn(&mut Context<'_>, &[&str]) -> HandlerResult;
/// Inbound handler for one parsed line.
pub type InboundFn = fn(&mut Context<'_>, &MessageRef<'_>) -> HandlerResult;

/// Outbound handler and the argument shape it wants.
#[derive(Clone, Copy)]
pub enum OutboundFn {
    Joined(JoinedFn),
    Split(SplitFn),
}

/// Which directions a command has handlers for.
#[derive(Clone, Copy)]
pub enum Handlers {
    None,
    Outbound(OutboundFn),
    Inbound(InboundFn),
    Both(OutboundFn, InboundFn),
}

/// Static description of one command or reply.
#[derive(Clone, Copy)]
pub struct CommandSpec {
    /// Lowercase for verbs, three digits for numerics.
    pub name: &'static str,
    pub summary: &'static str,
    pub usage: &'static str,
    pub args_help: &'static str,
    pub min_args: usize,
    /// `None` means unbounded.
    pub max_args: Option<usize>,
    /// The target server must not be disconnected.
    pub needs_connection: bool,
    pub handlers: Handlers,
}

impl std::fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandSpec")
            .field("name", &self.name)
            .field("min_args", &self.min_args)
            .field("max_args", &self.max_args)
            .field("outbound", &self.has_outbound())
            .field("inbound", &self.has_inbound())
            .finish()
    }
}

impl CommandSpec {
    pub fn outbound(&self) -> Option<OutboundFn> {
        match self.handlers {
            Handlers::Outbound(f) | Handlers::Both(f, _) => Some(f),
            _ => None,
        }
    }

    pub fn inbound(&self) -> Option<InboundFn> {
        match self.handlers {
            Handlers::Inbound(f) | Handlers::Both(_, f) => Some(f),
            _ => None,
        }
    }

    pub fn has_outbound(&self) -> bool {
        self.outbound().is_some()
    }

    pub fn has_inbound(&self) -> bool {
        self.inbound().is_some()
    }

    /// True when the outbound handler wants split arguments.
    pub fn splits_args(&self) -> bool {
        matches!(self.outbound(), Some(OutboundFn::Split(_)))
    }

    /// Reject an argument count outside `[min_args, max_args]`.
    pub fn check_args(&self, argc: usize) -> HandlerResult {
        let too_many = self.max_args.is_some_and(|max| argc > max);
        if argc < self.min_args || too_many {
            return Err(HandlerError::WrongArgCount {
                command: self.name.to_owned(),
                min: self.min_args,
                max: self.max_args,
            });
        }
        Ok(())
    }
}

const MANY: Option<usize> = None;

const fn max(n: usize) -> Option<usize> {
    Some(n)
}

const fn send(
    name: &'static str,
    summary: &'static str,
    usage: &'static str,
    args_help: &'static str,
    min_args: usize,
    max_args: Option<usize>,
    out: OutboundFn,
) -> CommandSpec {
    CommandSpec {
        name,
        summary,
        usage,
        args_help,
        min_args,
        max_args,
        needs_connection: true,
        handlers: Handlers::Outbound(out),
    }
}

#[allow(clippy::too_many_arguments)]
const fn both(
    name: &'static str,
    summary: &'static str,
    usage: &'static str,
    args_help: &'static str,
    min_args: usize,
    max_args: Option<usize>,
    out: OutboundFn,
    recv: InboundFn,
) -> CommandSpec {
    CommandSpec {
        handlers: Handlers::Both(out, recv),
        ..send(name, summary, usage, args_help, min_args, max_args, out)
    }
}

const fn recv(
    name: &'static str,
    summary: &'static str,
    min_args: usize,
    max_args: Option<usize>,
    handler: InboundFn,
) -> CommandSpec {
    CommandSpec {
        name,
        summary,
        usage: "",
        args_help: "",
        min_args,
        max_args,
        needs_connection: true,
        handlers: Handlers::Inbound(handler),
    }
}

const fn server_msg(name: &'static str, summary: &'static str) -> CommandSpec {
    recv(name, summary, 0, max(0), registration::server_msg)
}

const fn error(name: &'static str, summary: &'static str) -> CommandSpec {
    recv(name, summary, 0, MANY, registration::error)
}

use OutboundFn::{Joined, Split};

/// Every known command and reply.
pub static COMMANDS: &[CommandSpec] = &[
    send("admin", "find information about the administrator of the server",
        "[target]", "target: server",
        0, max(1), Joined(query::admin)),
    send("away", "toggle away status",
        "[-all] [message]",
        "-all: toggle away status on all connected servers\n\
         message: message for away (if no message is given, away status is removed)",
        0, MANY, Joined(connection::away)),
    send("ctcp", "send a ctcp message",
        "nickname type [arguments]",
        "nickname: user to send ctcp to\ntype: \"action\", \"version\" or \"ping\"",
        2, MANY, Joined(messaging::ctcp)),
    send("dcc", "starts DCC (file or chat)",
        "action nickname [file]",
        "action: 'send' (file), 'chat' or 'close'\n\
         nickname: nickname to send file or chat (transfer id for 'close')\n\
         file: filename (on local host)",
        2, max(3), Joined(dcc::dcc)),
    send("deop", "removes channel operator status from nickname(s)",
        "nickname [nickname]", "",
        1, max(1), Split(channel::deop)),
    send("devoice", "removes voice from nickname(s)",
        "nickname [nickname]", "",
        1, max(1), Split(channel::devoice)),
    send("die", "shutdown the server", "", "",
        0, max(0), Joined(oper::die)),
    recv("error", "error received from IRC server", 0, max(0), registration::error),
    send("info", "get information describing the server",
        "[target]", "target: server name",
        0, max(1), Joined(query::info)),
    send("invite", "invite a nick on a channel",
        "nickname channel", "nickname: nick to invite\nchannel: channel to invite",
        2, max(2), Joined(channel::invite)),
    send("ison", "check if a nickname is currently on IRC",
        "nickname [nickname ...]", "nickname: nickname",
        1, MANY, Joined(query::ison)),
    both("join", "join a channel",
        "channel[,channel] [key[,key]]",
        "channel: channel name to join\nkey: key to join the channel",
        1, MANY, Joined(channel::join), membership::join),
    both("kick", "forcibly remove a user from a channel",
        "[channel] nickname [comment]",
        "channel: channel where user is\nnickname: nickname to kick\ncomment: comment for kick",
        1, MANY, Joined(channel::kick), membership::kick),
    send("kill", "close client-server connection",
        "nickname comment", "nickname: nickname\ncomment: comment for kill",
        2, MANY, Joined(oper::kill)),
    send("links", "list all servernames which are known by the server answering the query",
        "[[remote_server] server_mask]",
        "remote_server: this server should answer the query\n\
         server_mask: list of servers must match this mask",
        0, max(2), Joined(query::links)),
    send("list", "list channels and their topic",
        "[channel[,channel] [server]]", "channel: channel to list\nserver: server name",
        0, MANY, Joined(query::list)),
    send("lusers", "get statistics about the size of the IRC network",
        "[mask [target]]",
        "mask: servers matching the mask only\ntarget: server for forwarding request",
        0, max(2), Joined(query::lusers)),
    send("me", "send a ctcp action to the current channel",
        "message", "message: message to send",
        1, MANY, Joined(messaging::me)),
    both("mode", "change channel or user mode",
        "{ channel {[+|-]|o|p|s|i|t|n|b|v} [limit] [user] [ban mask] } | \
         { nickname {[+|-]|i|w|s|o} }",
        "channel modes:\n\
         \x20 channel: channel name to modify\n\
         \x20 o: give/take channel operator privileges\n\
         \x20 p: private channel flag\n\
         \x20 s: secret channel flag\n\
         \x20 i: invite-only channel flag\n\
         \x20 t: topic settable by channel operator only flag\n\
         \x20 n: no messages to channel from clients on the outside\n\
         \x20 m: moderated channel\n\
         \x20 l: set the user limit to channel\n\
         \x20 b: set a ban mask to keep users out\n\
         \x20 v: give/take the ability to speak on a moderated channel\n\
         \x20 k: set a channel key (password)\n\
         user modes:\n\
         \x20 nickname: nickname to modify\n\
         \x20 i: mark a user as invisible\n\
         \x20 s: mark a user for receive server notices\n\
         \x20 w: user receives wallops\n\
         \x20 o: operator flag",
        1, MANY, Joined(channel::mode), in_channel::mode),
    send("msg", "send message to a nick or channel",
        "receiver[,receiver] text",
        "receiver: nick or channel (may be mask, '*' = current channel)\ntext: text to send",
        1, MANY, Joined(messaging::msg)),
    send("motd", "get the \"Message Of The Day\"",
        "[target]", "target: server name",
        0, max(1), Joined(query::motd)),
    send("names", "list nicknames on channels",
        "[channel[,channel]]", "channel: channel name",
        0, MANY, Joined(channel::names)),
    both("nick", "change current nickname",
        "nickname", "nickname: new nickname for current IRC server",
        1, max(1), Split(connection::nick), membership::nick),
    both("notice", "send notice message to user",
        "nickname text", "nickname: user to send notice to\ntext: text to send",
        1, MANY, Joined(messaging::notice), messages::notice),
    send("op", "gives channel operator status to nickname(s)",
        "nickname [nickname]", "",
        1, max(1), Split(channel::op)),
    send("oper", "get operator privileges",
        "user password", "user/password: used to get privileges on current IRC server",
        2, max(2), Joined(connection::oper)),
    both("part", "leave a channel",
        "[channel[,channel]] [part_message]",
        "channel: channel name to leave\npart_message: part message (displayed to other users)",
        0, MANY, Joined(channel::part), membership::part),
    both("ping", "ping server",
        "server1 [server2]", "server1: server to ping\nserver2: forward ping to this server",
        1, max(2), Joined(connection::ping), registration::ping),
    both("pong", "answer to a ping message",
        "daemon [daemon2]",
        "daemon: daemon who has responded to Ping message\n\
         daemon2: forward message to this daemon",
        1, max(2), Joined(connection::pong), registration::pong),
    recv("privmsg", "message received", 0, max(0), messages::privmsg),
    CommandSpec {
        needs_connection: false,
        ..both("quit", "close all connections & quit",
            "[quit_message]", "quit_message: quit message (displayed to other users)",
            0, MANY, Joined(connection::quit), membership::quit)
    },
    send("quote", "send raw data to server without parsing",
        "data", "data: raw data to send",
        1, MANY, Joined(connection::quote)),
    send("rehash", "tell the server to reload its config file", "", "",
        0, max(0), Joined(oper::rehash)),
    send("restart", "tell the server to restart itself", "", "",
        0, max(0), Joined(oper::restart)),
    send("service", "register a new service",
        "nickname reserved distribution type reserved info",
        "distribution: visibility of service\ntype: reserved for future usage",
        6, max(6), Joined(connection::service)),
    send("servlist", "list services currently connected to the network",
        "[mask [type]]",
        "mask: list only services matching this mask\ntype: list only services of this type",
        0, max(2), Joined(query::servlist)),
    send("squery", "deliver a message to a service",
        "service text", "service: name of service\ntext: text to send",
        2, max(2), Joined(query::squery)),
    send("squit", "disconnect server links",
        "server comment", "server: server name\ncomment: comment for quit",
        2, max(2), Joined(oper::squit)),
    send("stats", "query statistics about server",
        "[query [server]]", "query: c/h/i/k/l/m/o/y/u (see RFC1459)\nserver: server name",
        0, max(2), Joined(query::stats)),
    send("summon", "give users who are on a host running an IRC server a message \
        asking them to please join IRC",
        "user [target [channel]]", "user: username\ntarget: server name\nchannel: channel name",
        1, max(3), Joined(query::summon)),
    send("time", "query local time from server",
        "[target]", "target: query time from specified server",
        0, max(1), Joined(query::time)),
    both("topic", "get/set channel topic",
        "[channel] [topic]",
        "channel: channel name\n\
         topic: new topic for channel (if topic is \"-delete\" then topic is deleted)",
        0, MANY, Joined(channel::topic), in_channel::topic),
    send("trace", "find the route to specific server",
        "[target]", "target: server",
        0, max(1), Joined(query::trace)),
    send("userhost", "return a list of information about nicknames",
        "nickname [nickname ...]", "nickname: nickname",
        1, MANY, Joined(query::userhost)),
    send("users", "list of users logged into the server",
        "[target]", "target: server",
        0, max(1), Joined(query::users)),
    send("version", "gives the version info of nick or server (current or specified)",
        "[server | nickname]", "server: server name\nnickname: nickname",
        0, max(1), Joined(query::version)),
    send("voice", "gives voice to nickname(s)",
        "nickname [nickname]", "",
        1, max(1), Split(channel::voice)),
    send("wallops", "send a message to all currently connected users who have \
        set the 'w' user mode for themselves",
        "text", "text: text to send",
        1, MANY, Joined(messaging::wallops)),
    send("who", "generate a query which returns a list of information",
        "[mask [\"o\"]]",
        "mask: only information which match this mask\n\
         o: only operators are returned according to the mask supplied",
        0, max(2), Joined(query::who)),
    send("whois", "query information about user(s)",
        "[server] nickname[,nickname]",
        "server: server name\nnickname: nickname (may be a mask)",
        1, MANY, Joined(query::whois)),
    send("whowas", "ask for information about a nickname which no longer exists",
        "nickname [,nickname [,nickname ...]] [count [target]]",
        "nickname: nickname to search\n\
         count: number of replies to return (full search if negative number)\n\
         target: reply should match this mask",
        1, MANY, Joined(query::whowas)),
    // Registration burst and server information
    recv("001", "a server message", 0, max(0), registration::welcome),
    server_msg("002", "a server message"),
    server_msg("003", "a server message"),
    recv("004", "a server message", 0, max(0), registration::myinfo),
    server_msg("005", "a server message"),
    server_msg("212", "a server message"),
    server_msg("219", "a server message"),
    server_msg("250", "a server message"),
    server_msg("251", "a server message"),
    server_msg("252", "a server message"),
    server_msg("253", "a server message"),
    server_msg("254", "a server message"),
    server_msg("255", "a server message"),
    server_msg("256", "a server message"),
    server_msg("257", "a server message"),
    server_msg("258", "a server message"),
    server_msg("259", "a server message"),
    server_msg("260", "a server message"),
    server_msg("261", "a server message"),
    server_msg("262", "a server message"),
    server_msg("263", "a server message"),
    server_msg("264", "a server message"),
    server_msg("265", "a server message"),
    server_msg("266", "a server message"),
    server_msg("267", "a server message"),
    server_msg("268", "a server message"),
    server_msg("269", "a server message"),
    // Query replies
    recv("301", "away message", 0, max(0), whois::away),
    recv("302", "userhost", 0, max(0), whois::userhost),
    recv("303", "ison", 0, max(0), whois::ison),
    recv("305", "unaway", 0, max(0), whois::unaway),
    recv("306", "now away", 0, max(0), whois::now_away),
    recv("311", "whois (user)", 0, max(0), whois::whois_user),
    recv("312", "whois (server)", 0, max(0), whois::whois_server),
    recv("313", "whois (operator)", 0, max(0), whois::whois_operator),
    recv("314", "whowas", 0, max(0), whois::whowas_user),
    recv("315", "end of /who list", 0, max(0), in_channel::end_of_who),
    recv("317", "whois (idle)", 0, max(0), whois::whois_idle),
    recv("318", "whois (end)", 0, max(0), whois::end_of_whois),
    recv("319", "whois (channels)", 0, max(0), whois::whois_channels),
    recv("320", "whois (identified user)", 0, max(0), whois::whois_identified),
    recv("321", "/list start", 0, max(0), in_channel::list_start),
    recv("322", "channel (for /list)", 0, max(0), in_channel::list_entry),
    recv("323", "/list end", 0, max(0), in_channel::list_end),
    recv("331", "no topic for channel", 0, max(0), in_channel::no_topic),
    recv("332", "topic of channel", 2, MANY, in_channel::topic_reply),
    recv("333", "infos about topic (nick & date changed)", 0, max(0), in_channel::topic_who_time),
    recv("351", "server version", 0, max(0), whois::version_reply),
    recv("352", "who", 0, max(0), in_channel::who_reply),
    recv("353", "list of nicks on channel", 2, MANY, in_channel::names_reply),
    server_msg("364", "links"),
    server_msg("365", "end of /links list"),
    recv("366", "end of /names list", 0, max(0), in_channel::end_of_names),
    server_msg("369", "end of /whowas list"),
    server_msg("371", "a server message"),
    server_msg("372", "a server message"),
    server_msg("373", "a server message"),
    server_msg("374", "a server message"),
    server_msg("375", "a server message"),
    server_msg("376", "a server message"),
    server_msg("391", "server local time"),
    // Error replies
    error("401", "no such nick/channel"),
    error("402", "no such server"),
    error("403", "no such channel"),
    error("404", "cannot send to channel"),
    error("405", "too many channels"),
    error("406", "was no such nick"),
    error("407", "too many targets"),
    error("409", "no origin"),
    error("411", "no recipient"),
    error("412", "no text to send"),
    error("413", "no toplevel"),
    error("414", "wildcard in toplevel domain"),
    error("421", "unknown command"),
    error("422", "MOTD is missing"),
    error("423", "no administrative info"),
    error("424", "file error"),
    error("431", "no nickname given"),
    error("432", "erroneous nickname"),
    recv("433", "nickname already in use", 0, max(0), registration::nick_in_use),
    error("436", "nickname collision"),
    error("441", "user not in channel"),
    error("442", "not on channel"),
    error("443", "user already on channel"),
    error("444", "user not logged in"),
    error("445", "summon has been disabled"),
    error("446", "users has been disabled"),
    error("451", "you are not registered"),
    error("461", "not enough parameters"),
    error("462", "you may not register"),
    error("463", "your host isn't among the privileged"),
    error("464", "password incorrect"),
    error("465", "you are banned from this server"),
    error("467", "channel key already set"),
    error("471", "channel is already full"),
    error("472", "unknown mode char to me"),
    error("473", "cannot join channel (invite only)"),
    error("474", "cannot join channel (banned from channel)"),
    error("475", "cannot join channel (bad channel key)"),
    error("481", "you're not an IRC operator"),
    error("482", "you're not channel operator"),
    error("483", "you can't kill a server!"),
    error("491", "no O-lines for your host"),
    error("501", "unknown mode flag"),
    error("502", "can't change mode for other users"),
];

static INDEX: LazyLock<HashMap<String, usize>> = LazyLock::new(|| {
    COMMANDS
        .iter()
        .enumerate()
        .map(|(i, spec)| (spec.name.to_ascii_lowercase(), i))
        .collect()
});

/// Find a command or reply by name, ignoring ASCII case.
pub fn lookup(name: &str) -> Option<&'static CommandSpec> {
    INDEX
        .get(&name.to_ascii_lowercase())
        .map(|&i| &COMMANDS[i])
}

/// Entries whose name starts with `prefix`, ignoring ASCII case, in table
/// order.
pub fn matching_prefix(prefix: &str) -> impl Iterator<Item = &'static CommandSpec> + '_ {
    COMMANDS.iter().filter(move |spec| {
        spec.name
            .as_bytes()
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix.as_bytes()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_unique() {
        let mut seen = HashSet::new();
        for spec in COMMANDS {
            assert!(!spec.name.is_empty());
            assert!(seen.insert(spec.name), "duplicate entry {}", spec.name);
        }
        assert_eq!(INDEX.len(), COMMANDS.len());
    }

    #[test]
    fn test_bounds_consistent() {
        for spec in COMMANDS {
            if let Some(max) = spec.max_args {
                assert!(spec.min_args <= max, "{}", spec.name);
            }
        }
    }

    #[test]
    fn test_lookup_shapes() {
        assert!(lookup("JOIN").unwrap().has_inbound());
        assert!(lookup("join").unwrap().has_outbound());
        assert!(lookup("op").unwrap().splits_args());
        assert!(!lookup("privmsg").unwrap().has_outbound());
        assert!(!lookup("quit").unwrap().needs_connection);
        assert!(lookup("406").is_some());
        assert!(lookup("407").is_some());
        assert!(lookup("nonsense").is_none());
    }

    #[test]
    fn test_check_args() {
        let topic = lookup("invite").unwrap();
        assert!(topic.check_args(2).is_ok());
        assert_eq!(
            topic.check_args(1),
            Err(HandlerError::WrongArgCount {
                command: "invite".into(),
                min: 2,
                max: Some(2),
            })
        );
        assert!(topic.check_args(3).is_err());
        assert!(lookup("away").unwrap().check_args(50).is_ok());
    }

    #[test]
    fn test_matching_prefix() {
        let names: Vec<_> = matching_prefix("WHO").map(|s| s.name).collect();
        assert_eq!(names, vec!["who", "whois", "whowas"]);
        assert_eq!(matching_prefix("").count(), COMMANDS.len());
        assert_eq!(matching_prefix("zzz").count(), 0);
    }
}
