//! Pull-based message bodies.
//!
//! A [`BodyReader`] hands out a body one chunk at a time; an empty chunk means
//! the body is over. It is the single body abstraction for both directions:
//! the request body given to a handler is a `BodyReader` reading the
//! connection, and a handler may return that very reader as its response body
//! to stream the request back without holding it in memory.
//!
//! The inbound reader does not own the connection. Each read sends a reply
//! slot to the connection loop, which reads the payload while it waits on the
//! handler or on the response body, see
//! [`FramedConnection::serving`](crate::connection::FramedConnection::serving).
//! The payload state stays in the connection, so the loop can still drain the
//! request body when the handler dropped its reader.

use std::fmt;
use std::io;

use bytes::Bytes;
use futures::channel::{mpsc, oneshot};
use futures::stream::BoxStream;
use futures::{SinkExt, Stream, StreamExt};

use crate::protocol::{ParseError, PayloadSize};

/// Where the connection loop answers one read of the inbound body.
pub(crate) type PayloadReply = oneshot::Sender<Result<Bytes, ParseError>>;

/// The connection side of an inbound body: one reply slot per read.
pub(crate) type PayloadRequests = mpsc::Receiver<PayloadReply>;

/// A body of known, unknown or zero length, read chunk by chunk.
pub struct BodyReader {
    kind: Kind,
}

enum Kind {
    /// In-memory body, handed out as a single chunk
    Full { chunk: Option<Bytes>, length: u64 },
    /// The payload of the request currently being handled
    Inbound { remaining: u64, requests: mpsc::Sender<PayloadReply> },
    /// Any stream of chunks
    Stream { length: PayloadSize, stream: BoxStream<'static, io::Result<Bytes>> },
}

impl BodyReader {
    /// A body without any bytes.
    pub fn empty() -> Self {
        Self { kind: Kind::Full { chunk: None, length: 0 } }
    }

    /// The payload of the inbound request, `length` bytes as declared by its
    /// `Content-Length`, and the receiving end its reads are sent to.
    pub(crate) fn inbound(length: u64) -> (Self, PayloadRequests) {
        let (requests, receiver) = mpsc::channel(0);
        (Self { kind: Kind::Inbound { remaining: length, requests } }, receiver)
    }

    /// A body produced by `stream`. Empty items are skipped, the body ends
    /// with the stream.
    pub fn stream<S>(length: PayloadSize, stream: S) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        Self { kind: Kind::Stream { length, stream: stream.boxed() } }
    }

    /// The length of the body. For an inbound body, the bytes not read yet.
    pub fn length(&self) -> PayloadSize {
        match &self.kind {
            Kind::Full { length, .. } => PayloadSize::Length(*length),
            Kind::Inbound { remaining, .. } => PayloadSize::Length(*remaining),
            Kind::Stream { length, .. } => *length,
        }
    }

    /// Returns the next chunk, or an empty chunk once the body is exhausted.
    ///
    /// # Errors
    ///
    /// - [`ParseError::UnexpectedEof`] if the peer closes before an inbound
    ///   body is complete
    /// - [`ParseError::BodyDetached`] if an inbound body is read after the
    ///   connection moved on to the next request
    /// - [`ParseError::Io`] with a stream body's own I/O error
    pub async fn read(&mut self) -> Result<Bytes, ParseError> {
        match &mut self.kind {
            Kind::Full { chunk, .. } => Ok(chunk.take().unwrap_or_default()),
            Kind::Inbound { remaining, requests } => {
                if *remaining == 0 {
                    return Ok(Bytes::new());
                }

                let (reply, chunk) = oneshot::channel();
                if requests.send(reply).await.is_err() {
                    return Err(ParseError::BodyDetached);
                }

                let Ok(chunk) = chunk.await else {
                    return Err(ParseError::BodyDetached);
                };
                let chunk = chunk?;
                *remaining = remaining.saturating_sub(chunk.len() as u64);
                Ok(chunk)
            }
            Kind::Stream { stream, .. } => loop {
                match stream.next().await {
                    Some(Ok(bytes)) if bytes.is_empty() => {}
                    Some(Ok(bytes)) => return Ok(bytes),
                    Some(Err(e)) => return Err(ParseError::io(e)),
                    None => return Ok(Bytes::new()),
                }
            },
        }
    }
}

impl Default for BodyReader {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Bytes> for BodyReader {
    fn from(bytes: Bytes) -> Self {
        let length = bytes.len() as u64;
        let chunk = if bytes.is_empty() { None } else { Some(bytes) };
        Self { kind: Kind::Full { chunk, length } }
    }
}

impl From<&'static str> for BodyReader {
    fn from(str: &'static str) -> Self {
        Bytes::from_static(str.as_bytes()).into()
    }
}

impl From<String> for BodyReader {
    fn from(string: String) -> Self {
        Bytes::from(string).into()
    }
}

impl From<Vec<u8>> for BodyReader {
    fn from(vec: Vec<u8>) -> Self {
        Bytes::from(vec).into()
    }
}

impl fmt::Debug for BodyReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            Kind::Full { .. } => "full",
            Kind::Inbound { .. } => "inbound",
            Kind::Stream { .. } => "stream",
        };
        f.debug_struct("BodyReader").field("kind", &kind).field("length", &self.length()).finish()
    }
}

#[cfg(test)]
mod tests {
    use futures::stream;

    use super::*;
    use crate::connection::{Connection, FramedConnection};

    #[tokio::test]
    async fn full_body_yields_once() {
        let mut body = BodyReader::from("hello world.\n");

        assert_eq!(body.length(), PayloadSize::Length(13));
        assert_eq!(&body.read().await.unwrap()[..], b"hello world.\n");
        assert!(body.read().await.unwrap().is_empty());
        assert!(body.read().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_body_is_eof_right_away() {
        let mut body = BodyReader::from(String::new());

        assert!(body.length().is_empty());
        assert!(body.read().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stream_body_skips_empty_chunks() {
        let chunks = vec![Ok(Bytes::from_static(b"ab")), Ok(Bytes::new()), Ok(Bytes::from_static(b"c"))];
        let mut body = BodyReader::stream(PayloadSize::Unknown, stream::iter(chunks));

        assert!(body.length().is_unknown());
        assert_eq!(&body.read().await.unwrap()[..], b"ab");
        assert_eq!(&body.read().await.unwrap()[..], b"c");
        assert!(body.read().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stream_body_error() {
        let chunks = vec![Err(io::Error::from(io::ErrorKind::Other))];
        let mut body = BodyReader::stream(PayloadSize::Length(1), stream::iter(chunks));

        let result = body.read().await;
        assert!(matches!(result, Err(ParseError::Io { .. })));
    }

    #[tokio::test]
    async fn inbound_body_reads_through_the_connection() {
        let mut connection = FramedConnection::new(Connection::new(&b"world"[..], Vec::new()));
        connection.buffer_mut().append(b"hello ");
        let mut body = connection.begin_payload(11);

        assert_eq!(&connection.serving(body.read()).await.unwrap()[..], b"hello ");
        assert_eq!(body.length(), PayloadSize::Length(5));
        assert_eq!(&connection.serving(body.read()).await.unwrap()[..], b"world");
        assert!(connection.serving(body.read()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn inbound_body_outliving_its_exchange() {
        let mut connection = FramedConnection::new(Connection::new(&b"abc"[..], Vec::new()));
        let mut body = connection.begin_payload(3);

        assert_eq!(connection.drain_payload().await.unwrap(), 3);
        assert!(matches!(body.read().await, Err(ParseError::BodyDetached)));
    }
}
