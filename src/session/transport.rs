//! Frame transports for chat sessions.
//!
//! # Responsibilities
//! - Abstract "read one frame / write one frame / close" over every chat carrier
//! - Newline-delimited JSON framing for raw byte streams (WebTransport)
//!
//! The WebSocket implementation lives next to the upgrade handler in
//! `http::websocket`.

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use std::future::Future;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{AnyDelimiterCodec, FramedRead, FramedWrite};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("read failed: {0}")]
    Read(String),

    #[error("write failed: {0}")]
    Write(String),
}

/// A bidirectional, message-oriented chat carrier.
pub trait ChatTransport: Send + Sized {
    /// Next inbound frame. `Ok(None)` means the peer closed cleanly.
    fn recv(&mut self) -> impl Future<Output = Result<Option<Bytes>, TransportError>> + Send;

    /// Write one outbound frame.
    fn send(&mut self, frame: String) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Release the carrier. Consumes the transport so it can only happen once.
    fn close(self) -> impl Future<Output = ()> + Send;
}

/// Newline-delimited frames over an async byte stream pair.
///
/// Empty lines are skipped. Lines longer than the configured maximum are a
/// read error.
pub struct LineTransport<R, W> {
    reader: FramedRead<R, AnyDelimiterCodec>,
    writer: FramedWrite<W, AnyDelimiterCodec>,
}

fn line_codec(max_frame_bytes: usize) -> AnyDelimiterCodec {
    AnyDelimiterCodec::new_with_max_length(b"\n".to_vec(), b"\n".to_vec(), max_frame_bytes)
}

impl<R, W> LineTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W, max_frame_bytes: usize) -> Self {
        Self {
            reader: FramedRead::new(reader, line_codec(max_frame_bytes)),
            writer: FramedWrite::new(writer, line_codec(max_frame_bytes)),
        }
    }
}

impl<R, W> ChatTransport for LineTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn recv(&mut self) -> Result<Option<Bytes>, TransportError> {
        loop {
            match self.reader.next().await {
                Some(Ok(line)) if line.iter().all(u8::is_ascii_whitespace) => continue,
                Some(Ok(line)) => return Ok(Some(line)),
                Some(Err(e)) => return Err(TransportError::Read(e.to_string())),
                None => return Ok(None),
            }
        }
    }

    async fn send(&mut self, frame: String) -> Result<(), TransportError> {
        self.writer
            .send(frame)
            .await
            .map_err(|e| TransportError::Write(e.to_string()))
    }

    async fn close(mut self) {
        if let Err(e) = SinkExt::<String>::close(&mut self.writer).await {
            tracing::debug!(error = %e, "Error while closing line transport");
        }
    }
}
