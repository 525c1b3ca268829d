//! Nom-based parser producing borrowed messages.
//!
//! Grammar (RFC 2812 §2.3.1, plus an ignored IRCv3 tag section):
//!
//! ```text
//! [@tags SPACE] [:prefix SPACE] command *( SPACE middle ) [ SPACE ":" trailing ]
//! ```

use nom::{
    bytes::complete::{take_until, take_while1},
    character::complete::{char, space0},
    combinator::opt,
    error::ErrorKind,
    sequence::preceded,
    IResult,
};
use smallvec::SmallVec;

use crate::error::MessageParseError;
use crate::prefix::PrefixRef;

/// RFC 2812 caps a message at 15 parameters.
const MAX_PARAMS: usize = 15;

fn parse_tags(input: &str) -> IResult<&str, &str> {
    preceded(char('@'), take_until(" "))(input)
}

fn parse_prefix(input: &str) -> IResult<&str, &str> {
    preceded(char(':'), take_while1(|c| c != ' '))(input)
}

/// `command = 1*letter / 3digit`
fn parse_command(input: &str) -> IResult<&str, &str> {
    let (rest, cmd) = take_while1(|c: char| c.is_ascii_alphanumeric())(input)?;

    let is_verb = cmd.bytes().all(|b| b.is_ascii_alphabetic());
    let is_numeric = cmd.len() == 3 && cmd.bytes().all(|b| b.is_ascii_digit());

    if is_verb || is_numeric {
        Ok((rest, cmd))
    } else {
        Err(nom::Err::Error(nom::error::Error::new(
            input,
            ErrorKind::AlphaNumeric,
        )))
    }
}

/// Tags, prefix and command; everything before the parameters.
fn parse_head(input: &str) -> IResult<&str, (Option<&str>, Option<&str>, &str)> {
    let (input, tags) = opt(parse_tags)(input)?;
    let (input, _) = space0(input)?;
    let (input, prefix) = opt(parse_prefix)(input)?;
    let (input, _) = space0(input)?;
    let (input, command) = parse_command(input)?;
    Ok((input, (tags, prefix, command)))
}

/// Split the parameter section. Runs of spaces count as one separator.
fn parse_params(mut rest: &str) -> SmallVec<[&str; MAX_PARAMS]> {
    let mut params = SmallVec::new();

    while rest.starts_with(' ') {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            break;
        }

        // The last slot always swallows the remainder, colon or not.
        if let Some(trailing) = rest.strip_prefix(':') {
            params.push(trailing);
            break;
        }
        if params.len() == MAX_PARAMS - 1 {
            params.push(rest);
            break;
        }

        let end = rest.find(' ').unwrap_or(rest.len());
        params.push(&rest[..end]);
        rest = &rest[end..];
    }

    params
}

/// A parsed line borrowing from its input.
#[derive(Clone, Debug, PartialEq)]
pub struct MessageRef<'a> {
    /// Raw tag section without the `@`, if any. Clients here ignore tags.
    pub tags: Option<&'a str>,
    /// Source of the message.
    pub prefix: Option<PrefixRef<'a>>,
    /// Command verb or three-digit numeric, as received.
    pub command: &'a str,
    /// Parameters, the trailing one included and stripped of its `:`.
    pub params: SmallVec<[&'a str; MAX_PARAMS]>,
    /// The line without its terminator.
    pub raw: &'a str,
}

impl<'a> MessageRef<'a> {
    /// Parse one line. A trailing CR/LF is tolerated.
    pub fn parse(line: &'a str) -> Result<Self, MessageParseError> {
        let raw = line.trim_end_matches(['\r', '\n']);
        if raw.trim().is_empty() {
            return Err(MessageParseError::EmptyMessage);
        }

        let (rest, (tags, prefix, command)) = parse_head(raw).map_err(|_| {
            if raw.starts_with(':') && !raw.contains(' ') {
                MessageParseError::InvalidPrefix
            } else {
                MessageParseError::InvalidCommand
            }
        })?;

        // The command must end at a space or the end of the line.
        if !rest.is_empty() && !rest.starts_with(' ') {
            return Err(MessageParseError::InvalidCommand);
        }

        Ok(Self {
            tags,
            prefix: prefix.map(PrefixRef::parse),
            command,
            params: parse_params(rest),
            raw,
        })
    }

    /// Parameter `n`, if present.
    #[inline]
    pub fn arg(&self, n: usize) -> Option<&'a str> {
        self.params.get(n).copied()
    }

    /// All parameters.
    #[inline]
    pub fn args(&self) -> &[&'a str] {
        &self.params
    }

    /// The last parameter, which is where servers put human-readable text.
    #[inline]
    pub fn trailing(&self) -> Option<&'a str> {
        self.params.last().copied()
    }

    /// Nickname of the sender when the prefix is a user mask.
    pub fn source_nickname(&self) -> Option<&'a str> {
        self.prefix.and_then(|p| p.nickname())
    }

    /// True for three-digit numeric replies.
    pub fn is_numeric(&self) -> bool {
        self.command.len() == 3 && self.command.bytes().all(|b| b.is_ascii_digit())
    }

    /// Parameters from `n` on, joined by single spaces.
    pub fn args_from(&self, n: usize) -> String {
        self.params.get(n..).map(|p| p.join(" ")).unwrap_or_default()
    }
}
