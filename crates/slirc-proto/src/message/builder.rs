//! Outbound line assembly.
//!
//! Lines are concatenated field by field. Every field is stripped of CR, LF
//! and NUL so user text can never inject a second command. When the line
//! would pass [`MAX_LINE_LEN`], middle fields that do not fit are dropped
//! whole and the trailing text is cut with [`truncate_text`]. Truncation is
//! silent: the shortened line is still a valid line.

use crate::format::{strip_line_breaks, truncate_text, CTCP_DELIM};

/// Maximum line length on the wire, CRLF included.
pub const MAX_LINE_LEN: usize = 512;

const MAX_CONTENT: usize = MAX_LINE_LEN - 2;

/// Builder for one CRLF-terminated protocol line.
#[derive(Debug, Clone)]
pub struct LineBuilder {
    line: String,
    full: bool,
}

impl LineBuilder {
    /// Start a line with its command verb.
    pub fn new(command: &str) -> Self {
        let command = strip_line_breaks(command);
        Self {
            line: truncate_text(&command, MAX_CONTENT).to_owned(),
            full: false,
        }
    }

    fn room(&self) -> usize {
        MAX_CONTENT.saturating_sub(self.line.len())
    }

    /// Append one middle parameter. Empty fields are skipped.
    pub fn param(mut self, field: &str) -> Self {
        let field = strip_line_breaks(field);
        if self.full || field.is_empty() {
            return self;
        }
        if field.len() + 1 > self.room() {
            self.full = true;
            return self;
        }
        self.line.push(' ');
        self.line.push_str(&field);
        self
    }

    /// Append an optional middle parameter.
    pub fn param_opt(self, field: Option<&str>) -> Self {
        match field {
            Some(field) => self.param(field),
            None => self,
        }
    }

    /// Append free-form argument text as typed by the user.
    ///
    /// The text is split on spaces and added word by word, so an overflow
    /// drops whole words rather than cutting one in half.
    pub fn raw(self, text: &str) -> Self {
        text.split(' ').fold(self, |builder, word| builder.param(word))
    }

    /// Append the trailing parameter (`:` + text). An empty text still
    /// produces the `:` so the receiver sees an explicitly empty value.
    pub fn trailing(mut self, text: &str) -> Self {
        let text = strip_line_breaks(text);
        let room = self.room();
        if self.full || room < 2 {
            self.full = true;
            return self;
        }
        let cut = truncate_text(&text, room - 2);
        self.full = cut.len() < text.len();
        self.line.push_str(" :");
        self.line.push_str(cut);
        self
    }

    /// Append a CTCP-framed trailing parameter: `:\x01KIND payload\x01`.
    ///
    /// The payload is shortened if needed; both delimiters always survive.
    pub fn ctcp(mut self, kind: &str, payload: Option<&str>) -> Self {
        let kind = strip_line_breaks(kind);
        let overhead = 2 + 2 + kind.len();
        let room = self.room();
        if self.full || room < overhead {
            self.full = true;
            return self;
        }

        self.line.push_str(" :");
        self.line.push(CTCP_DELIM);
        self.line.push_str(&kind);
        if let Some(payload) = payload {
            let payload = strip_line_breaks(payload);
            let budget = room - overhead;
            if budget > 1 {
                let cut = truncate_text(&payload, budget - 1);
                self.full = cut.len() < payload.len();
                self.line.push(' ');
                self.line.push_str(cut);
            } else {
                self.full = !payload.is_empty();
            }
        }
        self.line.push(CTCP_DELIM);
        self
    }

    /// True once a field had to be dropped or shortened.
    pub fn was_truncated(&self) -> bool {
        self.full
    }

    /// Terminate the line with CRLF.
    pub fn finish(mut self) -> String {
        self.line.push_str("\r\n");
        self.line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_line() {
        let line = LineBuilder::new("PRIVMSG").param("#rust").trailing("hi there").finish();
        assert_eq!(line, "PRIVMSG #rust :hi there\r\n");
    }

    #[test]
    fn test_empty_trailing_kept() {
        assert_eq!(LineBuilder::new("TOPIC").param("#c").trailing("").finish(), "TOPIC #c :\r\n");
    }

    #[test]
    fn test_injection_stripped() {
        let line = LineBuilder::new("PRIVMSG")
            .param("#a")
            .trailing("hi\r\nQUIT :bye")
            .finish();
        assert_eq!(line, "PRIVMSG #a :hiQUIT :bye\r\n");
    }

    #[test]
    fn test_raw_words() {
        let line = LineBuilder::new("KICK").raw("#c  bob").finish();
        assert_eq!(line, "KICK #c bob\r\n");
    }

    #[test]
    fn test_ctcp_frame() {
        let line = LineBuilder::new("PRIVMSG").param("bob").ctcp("VERSION", None).finish();
        assert_eq!(line, "PRIVMSG bob :\x01VERSION\x01\r\n");
        let line = LineBuilder::new("PRIVMSG").param("#c").ctcp("ACTION", Some("waves")).finish();
        assert_eq!(line, "PRIVMSG #c :\x01ACTION waves\x01\r\n");
    }

    #[test]
    fn test_long_trailing_truncated() {
        let text = "x".repeat(1000);
        let b = LineBuilder::new("PRIVMSG").param("#c").trailing(&text);
        assert!(b.was_truncated());
        let line = b.finish();
        assert_eq!(line.len(), MAX_LINE_LEN);
        assert!(line.ends_with("x\r\n"));
    }

    #[test]
    fn test_long_ctcp_keeps_delimiters() {
        let text = "y".repeat(1000);
        let line = LineBuilder::new("PRIVMSG").param("#c").ctcp("ACTION", Some(&text)).finish();
        assert!(line.len() <= MAX_LINE_LEN);
        assert!(line.ends_with("\x01\r\n"));
    }

    #[test]
    fn test_overflowing_param_dropped_whole() {
        let big = "z".repeat(600);
        let line = LineBuilder::new("ISON").param("a").param(&big).param("b").finish();
        assert_eq!(line, "ISON a\r\n");
    }
}
