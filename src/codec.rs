//! Inbound line framing
//!
//! Wraps `AnyDelimiterCodec` so that neither an overlong line nor a line
//! with invalid UTF-8 is a decoder error: `FramedRead` ends the stream after
//! any error, which would disconnect the sender.

use bytes::BytesMut;
use tokio_util::codec::{AnyDelimiterCodec, AnyDelimiterCodecError, Decoder};

/// One framed chunk of client input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundLine {
    /// A complete line, terminator removed, invalid UTF-8 replaced with U+FFFD
    Line(String),
    /// A line longer than the limit; the codec skips to the next newline
    Overlong,
}

/// Newline-delimited, length-bounded, lossy UTF-8 line decoder
#[derive(Debug, Clone)]
pub struct ChatLineCodec {
    inner: AnyDelimiterCodec,
}

impl ChatLineCodec {
    pub fn new(max_line_length: usize) -> Self {
        Self {
            inner: AnyDelimiterCodec::new_with_max_length(b"\n".to_vec(), Vec::new(), max_line_length),
        }
    }

    fn map(
        result: Result<Option<bytes::Bytes>, AnyDelimiterCodecError>,
    ) -> Result<Option<InboundLine>, AnyDelimiterCodecError> {
        match result {
            Ok(Some(chunk)) => Ok(Some(InboundLine::Line(
                String::from_utf8_lossy(&chunk).into_owned(),
            ))),
            Ok(None) => Ok(None),
            // The inner codec is now discarding up to the next newline
            Err(AnyDelimiterCodecError::MaxChunkLengthExceeded) => Ok(Some(InboundLine::Overlong)),
            Err(e) => Err(e),
        }
    }
}

impl Decoder for ChatLineCodec {
    type Item = InboundLine;
    type Error = AnyDelimiterCodecError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<InboundLine>, Self::Error> {
        Self::map(self.inner.decode(buf))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<InboundLine>, Self::Error> {
        Self::map(self.inner.decode_eof(buf))
    }
}
