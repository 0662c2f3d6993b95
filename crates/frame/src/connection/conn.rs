//! Suspendable read/write over a raw byte stream.
//!
//! [`Connection`] wraps the two halves of a transport and exposes one `read()`
//! returning the next chunk and one `write()` that completes once the bytes are
//! flushed. The transport is polled only while a read is outstanding: nothing
//! is pulled from the socket between reads, which is what gives the peer
//! backpressure.
//!
//! End-of-stream and transport errors are terminal. Once seen, every later
//! read is answered from the stored state without touching the transport.

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace, warn};

use crate::config::DEFAULT_READ_BUFFER_SIZE;
use crate::protocol::TransportError;

#[derive(Debug, Clone)]
enum State {
    Idle,
    /// A read is waiting on the transport
    Pending,
    /// The peer finished sending
    Ended,
    Errored(TransportError),
}

/// A byte stream turned into a sequence of awaitable reads and writes.
#[derive(Debug)]
pub struct Connection<R, W> {
    reader: R,
    writer: W,
    state: State,
    read_buffer_size: usize,
}

/// Marks a read as pending for as long as it is alive.
///
/// Dropping the read future mid-flight drops the slot, which puts the
/// connection back to idle.
struct ReadSlot<'a> {
    state: &'a mut State,
}

impl<'a> ReadSlot<'a> {
    fn acquire(state: &'a mut State) -> Self {
        debug_assert!(matches!(state, State::Idle), "a read is already pending");
        *state = State::Pending;
        Self { state }
    }

    fn complete(self, next: State) {
        *self.state = next;
    }
}

impl Drop for ReadSlot<'_> {
    fn drop(&mut self) {
        if matches!(self.state, State::Pending) {
            *self.state = State::Idle;
        }
    }
}

impl<R, W> Connection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer, state: State::Idle, read_buffer_size: DEFAULT_READ_BUFFER_SIZE }
    }

    /// Limits how many bytes one [`read`](Self::read) may return.
    #[must_use]
    pub fn with_read_buffer_size(mut self, read_buffer_size: usize) -> Self {
        self.read_buffer_size = read_buffer_size.max(1);
        self
    }

    /// Waits for the next chunk from the peer.
    ///
    /// Returns an empty chunk once the peer closed its side, on this call and
    /// every later one.
    ///
    /// # Errors
    ///
    /// Fails with the transport error, and with that same error on every
    /// later call.
    pub async fn read(&mut self) -> Result<Bytes, TransportError> {
        match &self.state {
            State::Ended => return Ok(Bytes::new()),
            State::Errored(e) => return Err(e.clone()),
            State::Idle | State::Pending => {}
        }

        let mut buf = BytesMut::with_capacity(self.read_buffer_size);
        let slot = ReadSlot::acquire(&mut self.state);
        let result = self.reader.read_buf(&mut buf).await;
        match result {
            Ok(0) => {
                trace!("peer closed the connection");
                slot.complete(State::Ended);
                Ok(Bytes::new())
            }
            Ok(size) => {
                trace!(size, "read from connection");
                slot.complete(State::Idle);
                Ok(buf.freeze())
            }
            Err(e) => {
                let error = TransportError::from(e);
                warn!(cause = %error, "read from connection failed");
                slot.complete(State::Errored(error.clone()));
                Err(error)
            }
        }
    }

    /// Writes all of `bytes` and flushes them.
    ///
    /// # Errors
    ///
    /// Fails right away if the connection already failed; a new failure is
    /// stored and replayed by later reads and writes.
    pub async fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        debug_assert!(!bytes.is_empty(), "write requires a non-empty chunk");
        if let State::Errored(e) = &self.state {
            return Err(e.clone());
        }

        let result = match self.writer.write_all(bytes).await {
            Ok(()) => self.writer.flush().await,
            Err(e) => Err(e),
        };

        result.map_err(|e| {
            let error = TransportError::from(e);
            warn!(cause = %error, "write to connection failed");
            self.state = State::Errored(error.clone());
            error
        })
    }

    /// Shuts the writing half down. Failures are only logged.
    pub async fn close(&mut self) {
        if let Err(e) = self.writer.shutdown().await {
            debug!(cause = %e, "shutdown connection failed");
        }
    }

    /// Whether the peer finished sending.
    pub fn is_ended(&self) -> bool {
        matches!(self.state, State::Ended)
    }

    /// The stored transport failure, if any.
    pub fn error(&self) -> Option<&TransportError> {
        match &self.state {
            State::Errored(e) => Some(e),
            _ => None,
        }
    }

    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use futures::FutureExt;
    use tokio::io::ReadBuf;

    use super::*;

    /// Fails every poll and counts them.
    struct FailingIo {
        polls: usize,
    }

    impl AsyncRead for FailingIo {
        fn poll_read(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, _buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
            self.polls += 1;
            Poll::Ready(Err(io::Error::from(io::ErrorKind::ConnectionReset)))
        }
    }

    impl AsyncWrite for FailingIo {
        fn poll_write(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, _buf: &[u8]) -> Poll<io::Result<usize>> {
            self.polls += 1;
            Poll::Ready(Err(io::Error::from(io::ErrorKind::BrokenPipe)))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::from(io::ErrorKind::NotConnected)))
        }
    }

    #[tokio::test]
    async fn reads_chunks_then_stays_ended() {
        let mut connection = Connection::new(&b"hello world"[..], Vec::new()).with_read_buffer_size(4);

        assert_eq!(&connection.read().await.unwrap()[..], b"hell");
        assert_eq!(&connection.read().await.unwrap()[..], b"o wo");
        assert_eq!(&connection.read().await.unwrap()[..], b"rld");
        assert!(!connection.is_ended());

        assert!(connection.read().await.unwrap().is_empty());
        assert!(connection.is_ended());
        assert!(connection.read().await.unwrap().is_empty());
        assert!(connection.error().is_none());
    }

    #[tokio::test]
    async fn read_error_is_replayed() {
        let mut connection = Connection::new(FailingIo { polls: 0 }, Vec::new());

        let first = connection.read().await.unwrap_err();
        let second = connection.read().await.unwrap_err();

        assert_eq!(first.kind(), io::ErrorKind::ConnectionReset);
        assert_eq!(second.kind(), io::ErrorKind::ConnectionReset);
        assert_eq!(connection.error().map(TransportError::kind), Some(io::ErrorKind::ConnectionReset));

        // only the first read reached the transport
        let (reader, _) = connection.into_parts();
        assert_eq!(reader.polls, 1);
    }

    #[tokio::test]
    async fn write_error_is_terminal() {
        let mut connection = Connection::new(&b"unread"[..], FailingIo { polls: 0 });

        assert_eq!(connection.write(b"a").await.unwrap_err().kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(connection.write(b"b").await.unwrap_err().kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(connection.read().await.unwrap_err().kind(), io::ErrorKind::BrokenPipe);

        let (_, writer) = connection.into_parts();
        assert_eq!(writer.polls, 1);
    }

    #[tokio::test]
    async fn write_flushes_everything() {
        let mut connection = Connection::new(&b""[..], Vec::new());

        connection.write(b"HTTP/1.1 200 \r\n").await.unwrap();
        connection.write(b"\r\n").await.unwrap();
        connection.close().await;

        assert_eq!(connection.into_parts().1, b"HTTP/1.1 200 \r\n\r\n".to_vec());
    }

    #[tokio::test]
    async fn close_failure_is_ignored() {
        let mut connection = Connection::new(&b""[..], FailingIo { polls: 0 });
        connection.close().await;
        assert!(connection.error().is_none());
    }

    #[tokio::test]
    async fn dropped_read_releases_the_slot() {
        let (client, server) = tokio::io::duplex(64);
        let (reader, writer) = tokio::io::split(server);
        let mut connection = Connection::new(reader, writer);

        // nothing sent yet: the read stays pending and is dropped after one poll
        assert!(connection.read().now_or_never().is_none());
        assert!(matches!(connection.state, State::Idle));

        let (_, mut client_writer) = tokio::io::split(client);
        client_writer.write_all(b"ping").await.unwrap();
        assert_eq!(&connection.read().await.unwrap()[..], b"ping");
    }
}
