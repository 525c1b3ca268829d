//! Line-based codec for tokio.
//!
//! Frames a byte stream into LF-terminated lines. Servers are expected to
//! send CRLF but a bare LF is accepted; the terminator is stripped from the
//! decoded item. Encoding writes the line as given, so callers hand it
//! complete lines from [`crate::LineBuilder`].
//!
//! Lines that are not valid UTF-8 or that exceed the length limit are
//! dropped inside the decoder. A framed stream ends after the first decoder
//! error, so skipping them here keeps the connection usable.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{trace, warn};

use crate::error::{ProtocolError, Result};
use crate::message::MAX_LINE_LEN;

/// Line codec with a length limit.
#[derive(Debug, Clone)]
pub struct LineCodec {
    /// Index of the next byte to scan for a newline.
    next_index: usize,
    max_len: usize,
    /// Inside an oversized line whose head was already dropped.
    discarding: bool,
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl LineCodec {
    /// Codec limited to the protocol's 512-byte lines.
    pub fn new() -> Self {
        Self::with_max_len(MAX_LINE_LEN)
    }

    /// Codec with a custom line limit.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
            discarding: false,
        }
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        loop {
            let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
                if self.discarding || src.len() > self.max_len {
                    if !self.discarding {
                        warn!(buffered = src.len(), limit = self.max_len, "dropping oversized line");
                    }
                    src.clear();
                    self.next_index = 0;
                    self.discarding = true;
                } else {
                    self.next_index = src.len();
                }
                return Ok(None);
            };

            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if std::mem::take(&mut self.discarding) {
                continue;
            }
            if line.len() > self.max_len {
                warn!(length = line.len(), limit = self.max_len, "dropping oversized line");
                continue;
            }

            let text = match std::str::from_utf8(&line) {
                Ok(text) => text.trim_end_matches(['\r', '\n']),
                Err(e) => {
                    warn!(byte_pos = e.valid_up_to(), "dropping line with invalid UTF-8");
                    continue;
                }
            };
            trace!(line = %text, "decoded line");
            return Ok(Some(text.to_owned()));
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> Result<()> {
        dst.extend_from_slice(line.as_bytes());
        Ok(())
    }
}
