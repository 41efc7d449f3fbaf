//! Line framing codec.

use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::error::CodecError;

/// Default maximum line length (1 MiB).
pub const DEFAULT_MAX_LINE_LENGTH: usize = 1024 * 1024;

/// Line codec for tokio-util framing.
///
/// Yields one `String` per line with the `\n` or `\r\n` terminator removed.
/// An unterminated final line is emitted at end of stream. Bytes that are not
/// valid UTF-8 are replaced with `U+FFFD`.
#[derive(Debug, Clone)]
pub struct LineCodec {
    /// Maximum line length to accept, excluding the terminator.
    max_line_length: usize,
    /// Offset up to which the buffer is known to contain no newline.
    next_index: usize,
}

impl LineCodec {
    /// Create a new line codec with the default maximum line length.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            next_index: 0,
        }
    }

    /// Set the maximum line length.
    #[must_use]
    pub fn with_max_line_length(mut self, max: usize) -> Self {
        self.max_line_length = max;
        self
    }

    /// Get the maximum line length.
    #[must_use]
    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

fn strip_terminator(mut bytes: &[u8]) -> &[u8] {
    if let [rest @ .., b'\n'] = bytes {
        bytes = rest;
    }
    if let [rest @ .., b'\r'] = bytes {
        bytes = rest;
    }
    bytes
}

impl LineCodec {
    // The limit applies to raw bytes; lossy decoding may grow the text.
    fn to_line(&self, raw: &[u8]) -> Result<String, CodecError> {
        let content = strip_terminator(raw);
        if content.len() > self.max_line_length {
            return Err(CodecError::LineTooLong {
                max: self.max_line_length,
            });
        }
        Ok(String::from_utf8_lossy(content).into_owned())
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let newline = src[self.next_index..].iter().position(|b| *b == b'\n');

        match newline {
            Some(offset) => {
                let end = self.next_index + offset;
                self.next_index = 0;

                let line_bytes = src.split_to(end + 1);
                let line = self.to_line(&line_bytes)?;

                tracing::trace!(length = line.len(), "decoded response line");
                Ok(Some(line))
            }
            None => {
                if src.len() > self.max_line_length + 1 {
                    return Err(CodecError::LineTooLong {
                        max: self.max_line_length,
                    });
                }
                self.next_index = src.len();
                Ok(None)
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }
        if src.is_empty() {
            return Ok(None);
        }

        self.next_index = 0;
        let rest = src.split();
        let line = self.to_line(&rest)?;
        tracing::trace!(length = line.len(), "decoded unterminated final line");
        Ok(Some(line))
    }
}
