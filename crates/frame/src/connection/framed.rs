use std::fmt;
use std::future::{Future, pending};
use std::pin::pin;

use bytes::Bytes;
use futures::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::select;
use tracing::trace;

use crate::buffer::ByteBuffer;
use crate::codec::{Framer, LengthDecoder};
use crate::connection::Connection;
use crate::protocol::body::PayloadRequests;
use crate::protocol::{BodyReader, ParseError, TransportError};

/// A [`Connection`] plus the bytes received but not framed yet.
///
/// This is the part every protocol loop shares: pull from the transport until
/// a [`Framer`] can cut the next message out of the buffer. It also tracks the
/// payload of the request being handled, so the body can be read by whoever
/// holds its [`BodyReader`] and drained by the loop afterwards.
#[derive(Debug)]
pub struct FramedConnection<R, W> {
    connection: Connection<R, W>,
    buffer: ByteBuffer,
    payload: Option<Payload>,
}

/// The request payload being handled and the reads its reader asks for.
struct Payload {
    decoder: LengthDecoder,
    /// `None` once the reader is gone
    requests: Option<PayloadRequests>,
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload").field("remaining", &self.decoder.remaining()).field("attached", &self.requests.is_some()).finish()
    }
}

impl<R, W> FramedConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(connection: Connection<R, W>) -> Self {
        Self { connection, buffer: ByteBuffer::new(), payload: None }
    }

    /// Frames the next message with `framer`, reading as much as it needs.
    ///
    /// Bytes left over from earlier reads are framed first, so pipelined
    /// messages are served without touching the transport.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(item))`: the next message
    /// - `Ok(None)`: the peer closed between two messages
    ///
    /// # Errors
    ///
    /// - the framer's own error
    /// - [`ParseError::TruncatedMessage`] if the peer closed in the middle of a message
    /// - [`ParseError::Io`] if the transport failed
    pub async fn next_message<F: Framer>(&mut self, framer: &mut F) -> Result<Option<F::Item>, ParseError> {
        debug_assert!(
            self.payload.as_ref().is_none_or(|payload| payload.decoder.is_finished()),
            "framing a message while the previous payload is unread"
        );

        loop {
            if let Some(item) = framer.decode(&mut self.buffer)? {
                return Ok(Some(item));
            }

            let bytes = self.connection.read().await?;
            if bytes.is_empty() {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                return Err(ParseError::truncated_message(self.buffer.len()));
            }

            self.buffer.append(&bytes);
        }
    }

    /// Starts a request payload of `length` bytes and returns its reader.
    ///
    /// The reader's reads are answered while [`serving`](Self::serving) runs;
    /// the payload can also be read directly with
    /// [`read_payload`](Self::read_payload).
    pub fn begin_payload(&mut self, length: u64) -> BodyReader {
        let (body, requests) = BodyReader::inbound(length);
        self.payload = Some(Payload { decoder: LengthDecoder::new(length), requests: Some(requests) });
        body
    }

    /// Bytes of the current payload not read yet.
    pub fn payload_remaining(&self) -> u64 {
        self.payload.as_ref().map_or(0, |payload| payload.decoder.remaining())
    }

    /// Drives `future` to completion while answering the reads of the current
    /// payload's [`BodyReader`].
    ///
    /// `future` is polled first, so its output is returned as soon as it is
    /// ready, even with a read in flight.
    pub async fn serving<F: Future>(&mut self, future: F) -> F::Output {
        let mut future = pin!(future);
        loop {
            select! {
                biased;
                output = &mut future => return output,
                () = self.answer_payload_read() => {}
            }
        }
    }

    /// Waits for one read of the payload reader and answers it. Never returns
    /// while there is no reader to answer.
    async fn answer_payload_read(&mut self) {
        let Some(requests) = self.payload.as_mut().and_then(|payload| payload.requests.as_mut()) else {
            return pending().await;
        };

        let request = requests.next().await;
        match request {
            Some(reply) => {
                let result = self.read_payload().await;
                if reply.send(result).is_err() {
                    trace!("payload read abandoned by its reader");
                }
            }
            None => {
                if let Some(payload) = self.payload.as_mut() {
                    payload.requests = None;
                }
            }
        }
    }

    /// Returns the next chunk of the current payload, or an empty chunk once
    /// it is complete. Never returns bytes past the payload.
    ///
    /// # Errors
    ///
    /// [`ParseError::UnexpectedEof`] if the peer closes before the payload is complete.
    pub async fn read_payload(&mut self) -> Result<Bytes, ParseError> {
        let Some(Payload { decoder, .. }) = self.payload.as_mut() else {
            return Ok(Bytes::new());
        };

        loop {
            if let Some(item) = decoder.decode(&mut self.buffer)? {
                return Ok(item.into_bytes());
            }

            let bytes = self.connection.read().await?;
            if bytes.is_empty() {
                return Err(ParseError::unexpected_eof(decoder.remaining()));
            }
            self.buffer.append(&bytes);
        }
    }

    /// Reads and discards what is left of the current payload. The payload's
    /// reader is detached: reading it afterwards fails.
    ///
    /// Returns the number of bytes discarded.
    pub async fn drain_payload(&mut self) -> Result<u64, ParseError> {
        let mut drained = 0;
        loop {
            let chunk = self.read_payload().await?;
            if chunk.is_empty() {
                break;
            }
            drained += chunk.len() as u64;
        }

        if drained > 0 {
            trace!(drained, "drained unread request body");
        }
        self.payload = None;
        Ok(drained)
    }

    pub async fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.connection.write(bytes).await
    }

    pub async fn close(&mut self) {
        self.connection.close().await
    }

    /// Bytes received but not consumed yet.
    pub fn buffer(&self) -> &ByteBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut ByteBuffer {
        &mut self.buffer
    }

    pub fn into_connection(self) -> Connection<R, W> {
        self.connection
    }
}
