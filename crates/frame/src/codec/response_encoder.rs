use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Encoder;
use tracing::{error, trace};

use crate::codec::header::HeaderEncoder;
use crate::connection::FramedConnection;
use crate::ensure;
use crate::protocol::{PayloadSize, Response, SendError};

/// Initial capacity of the head buffer, reused across responses
const INIT_BUFFER_SIZE: usize = 1024;

/// Writes whole responses: the head through [`HeaderEncoder`], then the body
/// chunk by chunk as its reader yields it.
#[derive(Debug)]
pub struct ResponseEncoder {
    header_encoder: HeaderEncoder,
    buffer: BytesMut,
}

impl ResponseEncoder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Sends `response` over `connection`.
    ///
    /// The body is streamed: each chunk is written as soon as it is read, so
    /// an echoed request body is never held in memory as a whole. Reads of the
    /// inbound body are answered by `connection` while the body waits on them.
    ///
    /// # Errors
    ///
    /// - [`SendError::UnknownLength`] if the body length is not known up front
    /// - [`SendError::InvalidHeader`] if the response sets its own `Content-Length`
    /// - [`SendError::InvalidBody`] if the body yields more or fewer bytes than declared
    /// - [`SendError::Body`] if reading the body fails
    /// - [`SendError::Io`] if the transport fails
    pub async fn send<R, W>(&mut self, response: Response, connection: &mut FramedConnection<R, W>) -> Result<(), SendError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let (head, mut body) = response.into_parts();
        let PayloadSize::Length(length) = body.length() else {
            error!(status = head.status().as_u16(), "response body length is unknown");
            return Err(SendError::UnknownLength);
        };

        trace!(status = head.status().as_u16(), content_length = length, "send response");

        self.buffer.clear();
        self.header_encoder.encode((head, length), &mut self.buffer)?;
        connection.write(&self.buffer).await?;

        let mut written = 0u64;
        loop {
            let chunk = connection.serving(body.read()).await?;
            if chunk.is_empty() {
                break;
            }

            written += chunk.len() as u64;
            ensure!(written <= length, SendError::invalid_body(format!("body exceeds its declared length {length}")));
            connection.write(&chunk).await?;
        }

        ensure!(
            written == length,
            SendError::invalid_body(format!("body ended after {written} bytes, declared length {length}"))
        );
        Ok(())
    }
}

impl Default for ResponseEncoder {
    fn default() -> Self {
        Self { header_encoder: HeaderEncoder, buffer: BytesMut::with_capacity(INIT_BUFFER_SIZE) }
    }
}
