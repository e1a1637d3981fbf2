//! Line-based codec for tokio.
//!
//! Reads newline-terminated lines and writes CRLF-terminated lines. Every
//! outbound frame gets exactly one `\r\n` appended, whatever its content.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use tracing::debug;

use crate::error;

/// Default maximum line length in bytes.
///
/// Chat servers of this dialect routinely exceed the RFC 512-byte limit, so
/// the default is the IRCv3 tagged-message ceiling.
pub const MAX_LINE_LEN: usize = 8191;

/// Protocol line terminator.
pub const LINE_TERMINATOR: &str = "\r\n";

/// Line-based codec that handles newline-terminated messages.
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    /// Maximum line length
    max_len: usize,
    /// Set while skipping the remainder of an over-long line
    discarding: bool,
}

impl LineCodec {
    /// Create a codec with the default maximum line length.
    pub fn new() -> Self {
        Self::with_max_len(MAX_LINE_LEN)
    }

    /// Create a new codec with custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
            discarding: false,
        }
    }

    /// Maximum accepted line length.
    pub fn max_len(&self) -> usize {
        self.max_len
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        loop {
            let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
                if src.len() > self.max_len {
                    // Over-long partial line: drop what we have and keep
                    // dropping until its newline arrives.
                    debug!(len = src.len(), limit = self.max_len, "Discarding over-long line");
                    src.clear();
                    self.discarding = true;
                    self.next_index = 0;
                } else {
                    self.next_index = src.len();
                }
                return Ok(None);
            };

            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if self.discarding {
                self.discarding = false;
                continue;
            }

            if line.len() > self.max_len {
                debug!(len = line.len(), limit = self.max_len, "Discarding over-long line");
                continue;
            }

            // Servers occasionally relay non-UTF-8 chat text; keep the line.
            let data = String::from_utf8_lossy(&line)
                .trim_end_matches(['\r', '\n'])
                .to_owned();
            return Ok(Some(data));
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, msg: String, dst: &mut BytesMut) -> error::Result<()> {
        let line = msg.trim_end_matches(['\r', '\n']);
        let actual = line.len() + LINE_TERMINATOR.len();
        if actual > self.max_len {
            return Err(error::ProtocolError::MessageTooLong {
                actual,
                limit: self.max_len,
            });
        }

        dst.reserve(actual);
        dst.extend_from_slice(line.as_bytes());
        dst.extend_from_slice(LINE_TERMINATOR.as_bytes());
        Ok(())
    }
}
