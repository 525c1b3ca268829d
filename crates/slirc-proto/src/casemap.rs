//! Case-insensitive comparison.
//!
//! Two flavours are needed by a client: plain ASCII folding (command names,
//! option names, info keys) and the `rfc1459` mapping servers apply to nick
//! and channel names, where `[]\~` are the uppercase forms of `{}|^`.

use std::cmp::Ordering;

/// Fold one character with the `rfc1459` mapping.
#[inline]
pub const fn irc_lower_char(c: char) -> char {
    match c {
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        '~' => '^',
        'A'..='Z' => (c as u8 + 32) as char,
        _ => c,
    }
}

/// Fold a whole string with the `rfc1459` mapping.
pub fn irc_to_lower(s: &str) -> String {
    s.chars().map(irc_lower_char).collect()
}

/// Nick/channel equality under the `rfc1459` mapping.
pub fn irc_eq(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a
            .chars()
            .zip(b.chars())
            .all(|(ca, cb)| irc_lower_char(ca) == irc_lower_char(cb))
}

/// Locale-independent ordering with ASCII case folding.
///
/// Non-ASCII bytes compare by value, so the result does not depend on the
/// process locale.
pub fn ascii_casecmp(a: &str, b: &str) -> Ordering {
    let left = a.bytes().map(|b| b.to_ascii_lowercase());
    let right = b.bytes().map(|b| b.to_ascii_lowercase());
    left.cmp(right)
}

/// Like [`ascii_casecmp`], but compares at most `max` bytes of each side.
pub fn ascii_ncasecmp(a: &str, b: &str, max: usize) -> Ordering {
    let left = a.bytes().take(max).map(|b| b.to_ascii_lowercase());
    let right = b.bytes().take(max).map(|b| b.to_ascii_lowercase());
    left.cmp(right)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_irc_lower_char() {
        assert_eq!(irc_lower_char('A'), 'a');
        assert_eq!(irc_lower_char('['), '{');
        assert_eq!(irc_lower_char('\\'), '|');
        assert_eq!(irc_lower_char('~'), '^');
        assert_eq!(irc_lower_char('#'), '#');
    }

    #[test]
    fn test_irc_eq() {
        assert!(irc_eq("Nick[away]", "nick{AWAY}"));
        assert!(irc_eq("#Chan", "#chan"));
        assert!(!irc_eq("nick", "nick_"));
    }

    #[test]
    fn test_ascii_casecmp() {
        assert_eq!(ascii_casecmp("WHOIS", "whois"), Ordering::Equal);
        assert_eq!(ascii_casecmp("abc", "ABD"), Ordering::Less);
        assert_eq!(ascii_casecmp("b", "A"), Ordering::Greater);
        assert_eq!(ascii_casecmp("ab", "abc"), Ordering::Less);
    }

    #[test]
    fn test_ascii_ncasecmp_stops_at_max() {
        assert_eq!(ascii_ncasecmp("VERSION", "verbose", 3), Ordering::Equal);
        assert_ne!(ascii_ncasecmp("VERSION", "verbose", 4), Ordering::Equal);
        assert_eq!(ascii_ncasecmp("x", "y", 0), Ordering::Equal);
    }
}
