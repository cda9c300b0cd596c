//! Dot-terminated block framing
//!
//! A "block" is a sequence of zero or more text lines followed by a line
//! containing exactly `.`; the terminator is not part of the block's
//! content. The protocol has no escaping mechanism, so nothing here tries
//! to interpret the lines; callers keep bare-dot lines out of their data.

use crate::error::{Error, Result};
use std::time::Duration;
use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, ReadHalf, WriteHalf,
};
use tokio::time::timeout;

/// The line that ends a block
const BLOCK_TERMINATOR: &str = ".";

/// Block-level reader/writer over a byte stream
///
/// Owns both halves of the stream; dropping it releases them together.
/// Each individual read and write is bounded by its configured timeout,
/// surfaced as [`Error::Timeout`].
pub struct BlockStream<S> {
    reader: BufReader<ReadHalf<S>>,
    writer: WriteHalf<S>,
    read_timeout: Duration,
    write_timeout: Duration,
}

impl<S: AsyncRead + AsyncWrite> BlockStream<S> {
    /// Wrap a stream in block framing
    pub fn new(stream: S, read_timeout: Duration, write_timeout: Duration) -> Self {
        let (read_half, write_half) = tokio::io::split(stream);
        Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            read_timeout,
            write_timeout,
        }
    }

    /// Read one block
    ///
    /// Stops at the terminator line or at end-of-stream. EOF before the
    /// terminator yields whatever lines arrived (an empty block if none);
    /// the response parser downstream turns an empty block into its
    /// no-response sentinel.
    pub async fn read_block(&mut self) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        loop {
            let mut raw = String::new();
            let n = timeout(self.read_timeout, self.reader.read_line(&mut raw))
                .await
                .map_err(|_| Error::timeout("response line"))??;
            if n == 0 {
                break;
            }
            let line = raw.trim_end_matches('\n').trim_end_matches('\r');
            if line == BLOCK_TERMINATOR {
                break;
            }
            lines.push(line.to_string());
        }
        Ok(lines)
    }

    /// Write one block: the content lines, the terminator, then flush
    pub async fn write_block(&mut self, lines: &[String]) -> Result<()> {
        let mut buf = String::new();
        for line in lines {
            buf.push_str(line);
            buf.push('\n');
        }
        buf.push_str(BLOCK_TERMINATOR);
        buf.push('\n');

        timeout(self.write_timeout, self.writer.write_all(buf.as_bytes()))
            .await
            .map_err(|_| Error::timeout("command write"))??;
        timeout(self.write_timeout, self.writer.flush())
            .await
            .map_err(|_| Error::timeout("command flush"))??;
        Ok(())
    }

    /// Shut down the write side, letting the peer see a clean end-of-stream
    pub async fn shutdown(&mut self) -> std::io::Result<()> {
        self.writer.shutdown().await
    }
}
