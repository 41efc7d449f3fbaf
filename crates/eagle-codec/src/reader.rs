//! Framed response readers.

use eagle_protocol::{DocPage, ResponseParser, ResultSet};
use futures_util::StreamExt;
use tokio::io::AsyncRead;
use tokio_util::codec::FramedRead;

use crate::error::CodecError;
use crate::line_codec::LineCodec;

/// A line-framed reader over a response body.
pub struct ResponseReader<R> {
    inner: FramedRead<R, LineCodec>,
}

impl<R> ResponseReader<R>
where
    R: AsyncRead + Unpin,
{
    /// Create a reader with the default codec.
    pub fn new(reader: R) -> Self {
        Self {
            inner: FramedRead::new(reader, LineCodec::new()),
        }
    }

    /// Create a reader with a custom codec.
    pub fn with_codec(reader: R, codec: LineCodec) -> Self {
        Self {
            inner: FramedRead::new(reader, codec),
        }
    }

    /// Read the next line, or `None` at end of stream.
    pub async fn next_line(&mut self) -> Result<Option<String>, CodecError> {
        self.inner.next().await.transpose()
    }

    /// Drive the response parser until end of stream.
    ///
    /// Lines are fed to the parser as they are decoded. The first grammar
    /// violation stops reading.
    pub async fn parse_result_set(mut self) -> Result<ResultSet, CodecError> {
        let mut parser = ResponseParser::new();
        while let Some(line) = self.next_line().await? {
            parser.feed_line(&line)?;
        }

        tracing::debug!(
            lines = parser.lines_read(),
            rows = parser.rows_read(),
            "response body consumed"
        );
        Ok(parser.finish()?)
    }

    /// Collect every remaining line.
    pub async fn collect_lines(mut self) -> Result<Vec<String>, CodecError> {
        let mut lines = Vec::new();
        while let Some(line) = self.next_line().await? {
            lines.push(line);
        }
        Ok(lines)
    }

    /// Consume the reader and return the underlying body.
    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }
}

/// Parse a query response body into a result set.
pub async fn read_result_set<R>(reader: R) -> Result<ResultSet, CodecError>
where
    R: AsyncRead + Unpin,
{
    ResponseReader::new(reader).parse_result_set().await
}

/// Read a documentation page body as raw lines.
pub async fn read_lines<R>(reader: R) -> Result<DocPage, CodecError>
where
    R: AsyncRead + Unpin,
{
    Ok(DocPage::new(ResponseReader::new(reader).collect_lines().await?))
}
