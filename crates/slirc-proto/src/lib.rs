//! # slirc-proto
//!
//! The wire layer of slirc-client: parsing inbound IRC lines, assembling
//! outbound ones within the protocol's length limit, CTCP framing and the
//! small string utilities both sides need.
//!
//! ## Parsing
//!
//! ```rust
//! use slirc_proto::MessageRef;
//!
//! let msg = MessageRef::parse(":nick!user@host PRIVMSG #rust :hello there").unwrap();
//! assert_eq!(msg.command, "PRIVMSG");
//! assert_eq!(msg.source_nickname(), Some("nick"));
//! assert_eq!(msg.arg(1), Some("hello there"));
//! ```
//!
//! ## Building
//!
//! ```rust
//! use slirc_proto::LineBuilder;
//!
//! let line = LineBuilder::new("TOPIC").param("#rust").trailing("").finish();
//! assert_eq!(line, "TOPIC #rust :\r\n");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod casemap;
pub mod chan;
pub mod ctcp;
pub mod error;
pub mod format;
#[cfg(feature = "tokio")]
pub mod line;
pub mod message;
pub mod numeric;
pub mod prefix;
pub mod util;

pub use self::casemap::{ascii_casecmp, ascii_ncasecmp, irc_eq, irc_lower_char, irc_to_lower};
pub use self::chan::ChannelExt;
pub use self::ctcp::{Ctcp, CtcpKind};
pub use self::error::{MessageParseError, ProtocolError};
#[cfg(feature = "tokio")]
pub use self::line::LineCodec;
pub use self::message::{LineBuilder, MessageRef, MAX_LINE_LEN};
pub use self::prefix::PrefixRef;
pub use self::util::explode;
