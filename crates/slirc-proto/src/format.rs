//! Formatting control characters and boundary-safe truncation.
//!
//! Message text may carry mIRC formatting codes. A colour code is a
//! multi-byte sequence (`\x03` followed by up to two digits, optionally a
//! comma and two more), so cutting a line inside one would change how the
//! remaining text renders on every receiving client. [`truncate_text`]
//! backs off to the start of such a sequence instead.

/// CTCP delimiter.
pub const CTCP_DELIM: char = '\x01';
/// Bold toggle.
pub const BOLD: char = '\x02';
/// Colour introducer.
pub const COLOR: char = '\x03';
/// Reset all formatting.
pub const RESET: char = '\x0F';
/// Reverse video toggle.
pub const REVERSE: char = '\x16';
/// Underline toggle.
pub const UNDERLINE: char = '\x1F';

/// Returns true for the formatting codes accepted inside message text.
#[inline]
pub fn is_irc_format_code(ch: char) -> bool {
    matches!(
        ch,
        '\x01' | '\x02' | '\x03' | '\x04' | '\x0F' | '\x11' | '\x16' | '\x1D' | '\x1E' | '\x1F'
    )
}

/// Remove CR, LF and NUL so a field can never terminate or split a line.
pub fn strip_line_breaks(s: &str) -> std::borrow::Cow<'_, str> {
    if s.contains(['\r', '\n', '\0']) {
        std::borrow::Cow::Owned(s.chars().filter(|c| !matches!(c, '\r' | '\n' | '\0')).collect())
    } else {
        std::borrow::Cow::Borrowed(s)
    }
}

/// Longest prefix of `s` that fits in `max_bytes`, ends on a char boundary
/// and does not end inside a colour sequence.
pub fn truncate_text(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }

    let mut cut = max_bytes;
    while cut > 0 && !s.is_char_boundary(cut) {
        cut -= 1;
    }

    if let Some(start) = open_color_sequence(&s[..cut]) {
        // Only back off when the sequence continues past the cut.
        let full = color_sequence_len(&s[start..]);
        if start + full > cut {
            cut = start;
        }
    }

    &s[..cut]
}

/// Byte offset of a colour introducer within the last six bytes whose
/// sequence might still be running at the end of `s`.
fn open_color_sequence(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let window_start = bytes.len().saturating_sub(6);
    bytes[window_start..]
        .iter()
        .rposition(|&b| b == COLOR as u8)
        .map(|pos| window_start + pos)
        .filter(|&pos| {
            bytes[pos + 1..]
                .iter()
                .all(|b| b.is_ascii_digit() || *b == b',')
        })
}

/// Length in bytes of the colour sequence starting at `s[0] == '\x03'`.
fn color_sequence_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut len = 1;
    let digits = |from: usize| {
        bytes[from..]
            .iter()
            .take(2)
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let fg = digits(len);
    len += fg;
    if fg > 0 && bytes.get(len) == Some(&b',') {
        let bg = digits(len + 1);
        if bg > 0 {
            len += 1 + bg;
        }
    }
    len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_char_boundary() {
        let s = "héllo";
        // 'é' is two bytes at offset 1..3
        assert_eq!(truncate_text(s, 2), "h");
        assert_eq!(truncate_text(s, 3), "hé");
    }

    #[test]
    fn test_truncate_backs_off_color_sequence() {
        let s = "abc\x0312,04text";
        // Cutting after "\x0312," would leave a dangling background colour.
        assert_eq!(truncate_text(s, 7), "abc");
        // The whole sequence fits.
        assert_eq!(truncate_text(s, 9), "abc\x0312,04");
    }

    #[test]
    fn test_truncate_keeps_short_input() {
        assert_eq!(truncate_text("short", 100), "short");
    }

    #[test]
    fn test_strip_line_breaks() {
        assert_eq!(strip_line_breaks("a\r\nb"), "ab");
        assert!(matches!(strip_line_breaks("clean"), std::borrow::Cow::Borrowed(_)));
    }
}
