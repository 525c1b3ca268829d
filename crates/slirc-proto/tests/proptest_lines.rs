//! Property-based tests for line assembly and parsing.
//!
//! 1. A built line never exceeds the protocol limit, whatever the input.
//! 2. A built line is always a single CRLF-terminated line.
//! 3. Parsing a line built from short fields returns those fields.

use proptest::prelude::*;
use slirc_proto::{LineBuilder, MessageRef, MAX_LINE_LEN};

fn channel_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[#&][a-zA-Z0-9_\\-]{1,49}").expect("valid regex")
}

/// Arbitrary user text, including control characters and multibyte chars.
fn any_text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("(.|\r|\n|\x03[0-9]{1,2}(,[0-9]{1,2})?){0,900}").expect("valid regex")
}

fn safe_text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[^\r\n\0]{0,100}").expect("valid regex")
}

proptest! {
    #[test]
    fn built_line_respects_limit(channel in channel_strategy(), text in any_text_strategy()) {
        let line = LineBuilder::new("PRIVMSG").param(&channel).trailing(&text).finish();
        prop_assert!(line.len() <= MAX_LINE_LEN);
        prop_assert!(line.ends_with("\r\n"));
        prop_assert_eq!(line.matches('\n').count(), 1);
        prop_assert!(!line.contains('\0'));
    }

    #[test]
    fn ctcp_line_respects_limit(channel in channel_strategy(), text in any_text_strategy()) {
        let line = LineBuilder::new("PRIVMSG").param(&channel).ctcp("ACTION", Some(&text)).finish();
        prop_assert!(line.len() <= MAX_LINE_LEN);
        prop_assert!(line.ends_with("\x01\r\n"));
    }

    #[test]
    fn raw_words_respect_limit(words in prop::collection::vec("[a-z]{1,80}", 0..20)) {
        let joined = words.join(" ");
        let line = LineBuilder::new("ISON").raw(&joined).finish();
        prop_assert!(line.len() <= MAX_LINE_LEN);
        // Dropped words leave a prefix of the input, never a cut word.
        let body = line.trim_end_matches("\r\n").trim_start_matches("ISON").trim_start();
        prop_assert!(joined.starts_with(body));
    }

    #[test]
    fn parse_recovers_short_fields(channel in channel_strategy(), text in safe_text_strategy()) {
        let line = LineBuilder::new("PRIVMSG").param(&channel).trailing(&text).finish();
        let msg = MessageRef::parse(&line).expect("built line parses");
        prop_assert_eq!(msg.command, "PRIVMSG");
        prop_assert_eq!(msg.arg(0), Some(channel.as_str()));
        prop_assert_eq!(msg.arg(1), Some(text.as_str()));
    }

    #[test]
    fn parse_never_panics(line in "\\PC{0,600}") {
        let _ = MessageRef::parse(&line);
    }
}
