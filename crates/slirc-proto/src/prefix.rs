//! Message source prefixes.
//!
//! A prefix is either a server name or a `nick!user@host` mask. Servers are
//! not consistent about sending the full mask, so parsing is lenient: any
//! missing part is simply absent.

use std::fmt;

/// Borrowed view of a message prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrefixRef<'a> {
    /// A server name such as `irc.example.net`.
    ServerName(&'a str),
    /// A user mask: nickname with optional user and host.
    Nickname {
        /// Nickname part.
        nick: &'a str,
        /// Username part (after `!`).
        user: Option<&'a str>,
        /// Hostname part (after `@`).
        host: Option<&'a str>,
    },
}

impl<'a> PrefixRef<'a> {
    /// Parse a prefix without its leading `:`.
    ///
    /// A bare token containing a dot and no `!`/`@` is taken as a server.
    pub fn parse(raw: &'a str) -> Self {
        let (rest, host) = match raw.split_once('@') {
            Some((rest, host)) => (rest, Some(host)),
            None => (raw, None),
        };
        let (nick, user) = match rest.split_once('!') {
            Some((nick, user)) => (nick, Some(user)),
            None => (rest, None),
        };

        if user.is_none() && host.is_none() && nick.contains('.') {
            PrefixRef::ServerName(nick)
        } else {
            PrefixRef::Nickname { nick, user, host }
        }
    }

    /// The nickname, if this is a user prefix.
    pub fn nickname(&self) -> Option<&'a str> {
        match self {
            PrefixRef::Nickname { nick, .. } => Some(nick),
            PrefixRef::ServerName(_) => None,
        }
    }

    /// The `user@host` part, when both are present.
    pub fn user_host(&self) -> Option<String> {
        match self {
            PrefixRef::Nickname {
                user: Some(user),
                host: Some(host),
                ..
            } => Some(format!("{user}@{host}")),
            _ => None,
        }
    }
}

impl fmt::Display for PrefixRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefixRef::ServerName(name) => f.write_str(name),
            PrefixRef::Nickname { nick, user, host } => {
                f.write_str(nick)?;
                if let Some(user) = user {
                    write!(f, "!{user}")?;
                }
                if let Some(host) = host {
                    write!(f, "@{host}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_mask() {
        let p = PrefixRef::parse("alice!ali@example.org");
        assert_eq!(p.nickname(), Some("alice"));
        assert_eq!(p.user_host().as_deref(), Some("ali@example.org"));
        assert_eq!(p.to_string(), "alice!ali@example.org");
    }

    #[test]
    fn test_server_name() {
        assert_eq!(
            PrefixRef::parse("irc.example.net"),
            PrefixRef::ServerName("irc.example.net")
        );
    }

    #[test]
    fn test_bare_nick() {
        let p = PrefixRef::parse("bob");
        assert_eq!(p.nickname(), Some("bob"));
        assert_eq!(p.user_host(), None);
    }
}
