//! Raw message codec for tokio.
//!
//! This is the raw protocol feed: bytes in, one [`RawMessage`] per protocol
//! line out, in wire order.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use tracing::debug;

use crate::error;
use crate::line::LineCodec;
use crate::message::RawMessage;

/// Tokio codec for encoding/decoding [`RawMessage`]s.
///
/// Wraps [`LineCodec`]. Lines that do not parse (blank keep-alives, a bare
/// prefix) are dropped so one bad line never ends the stream.
#[derive(Default)]
pub struct IrcCodec {
    inner: LineCodec,
}

impl IrcCodec {
    /// Create a new codec with the default line limit.
    pub fn new() -> Self {
        Self {
            inner: LineCodec::new(),
        }
    }

    /// Create a new codec with custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            inner: LineCodec::with_max_len(max_len),
        }
    }

    /// Sanitize outgoing message data.
    ///
    /// Truncates at the first line break so a parameter cannot smuggle a
    /// second command onto the wire.
    pub fn sanitize(mut data: String) -> String {
        if let Some(pos) = data.find(['\r', '\n']) {
            data.truncate(pos);
        }
        data
    }
}

impl Decoder for IrcCodec {
    type Item = RawMessage;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<RawMessage>> {
        while let Some(line) = self.inner.decode(src)? {
            match line.parse::<RawMessage>() {
                Ok(msg) => return Ok(Some(msg)),
                Err(e) => debug!(error = %e, "Dropping unparseable line"),
            }
        }
        Ok(None)
    }
}

impl Encoder<RawMessage> for IrcCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, msg: RawMessage, dst: &mut BytesMut) -> error::Result<()> {
        let sanitized = Self::sanitize(msg.to_string());
        self.inner.encode(sanitized, dst)
    }
}
