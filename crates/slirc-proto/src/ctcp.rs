//! CTCP (Client-to-Client Protocol) framing.
//!
//! CTCP requests ride inside PRIVMSG and replies inside NOTICE, wrapped in
//! `\x01` delimiters:
//!
//! ```
//! use slirc_proto::ctcp::{Ctcp, CtcpKind};
//!
//! let ctcp = Ctcp::parse("\x01ACTION waves hello\x01").unwrap();
//! assert_eq!(ctcp.kind, CtcpKind::Action);
//! assert_eq!(ctcp.params, Some("waves hello"));
//! ```

use std::fmt;

use crate::format::CTCP_DELIM;

/// CTCP verbs the client understands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CtcpKind {
    /// `/me` actions.
    Action,
    /// Client version query.
    Version,
    /// Round-trip latency check.
    Ping,
    /// DCC negotiation.
    Dcc,
    /// Anything else, with the verb as received.
    Unknown(String),
}

impl CtcpKind {
    /// Map a verb to a kind, ignoring case.
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "ACTION" => Self::Action,
            "VERSION" => Self::Version,
            "PING" => Self::Ping,
            "DCC" => Self::Dcc,
            _ => Self::Unknown(name.to_owned()),
        }
    }

    /// Canonical uppercase verb.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Action => "ACTION",
            Self::Version => "VERSION",
            Self::Ping => "PING",
            Self::Dcc => "DCC",
            Self::Unknown(s) => s,
        }
    }
}

impl fmt::Display for CtcpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed CTCP body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ctcp<'a> {
    /// The verb.
    pub kind: CtcpKind,
    /// Text after the verb, if any.
    pub params: Option<&'a str>,
}

impl<'a> Ctcp<'a> {
    /// Parse a PRIVMSG/NOTICE body. Returns `None` for plain text.
    ///
    /// A missing closing delimiter is tolerated, as many clients omit it.
    pub fn parse(text: &'a str) -> Option<Self> {
        let text = text.strip_prefix(CTCP_DELIM)?;
        let text = text.strip_suffix(CTCP_DELIM).unwrap_or(text);
        if text.is_empty() {
            return None;
        }

        let (verb, params) = match text.split_once(' ') {
            Some((verb, rest)) => (verb, Some(rest).filter(|p| !p.is_empty())),
            None => (text, None),
        };

        Some(Self {
            kind: CtcpKind::parse(verb),
            params,
        })
    }

    /// True when the body is CTCP-framed.
    #[inline]
    pub fn is_ctcp(text: &str) -> bool {
        text.starts_with(CTCP_DELIM)
    }
}

impl fmt::Display for Ctcp<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.params {
            Some(params) => write!(f, "{CTCP_DELIM}{} {params}{CTCP_DELIM}", self.kind),
            None => write!(f, "{CTCP_DELIM}{}{CTCP_DELIM}", self.kind),
        }
    }
}
