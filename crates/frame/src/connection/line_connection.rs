use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

use crate::codec::LineDecoder;
use crate::config::ConnectionConfig;
use crate::connection::{Connection, FramedConnection};
use crate::protocol::ParseError;

const ECHO_PREFIX: &[u8] = b"Echo: ";

const QUIT: &[u8] = b"quit";

const BYE: &[u8] = b"Bye.\n";

/// A newline-delimited echo connection.
///
/// Every line is answered with `Echo: <line>\n`; a `quit` line is answered
/// with `Bye.\n` and closes the connection.
#[derive(Debug)]
pub struct LineConnection<R, W> {
    framed: FramedConnection<R, W>,
    line_decoder: LineDecoder,
}

impl<R, W> LineConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_config(reader, writer, &ConnectionConfig::default())
    }

    pub fn with_config(reader: R, writer: W, config: &ConnectionConfig) -> Self {
        let connection = Connection::new(reader, writer).with_read_buffer_size(config.read_buffer_size());
        Self { framed: FramedConnection::new(connection), line_decoder: LineDecoder::from_config(config) }
    }

    /// Echoes lines until the peer quits or closes. The connection is shut
    /// down in every case.
    ///
    /// # Errors
    ///
    /// [`ParseError::TooLongLine`] for a line over the limit, or the transport error.
    pub async fn process(mut self) -> Result<(), ParseError> {
        let result = self.serve().await;
        self.framed.close().await;
        result
    }

    async fn serve(&mut self) -> Result<(), ParseError> {
        let mut reply = BytesMut::new();
        loop {
            let line = match self.framed.next_message(&mut self.line_decoder).await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    info!("cant read more line, break this connection down");
                    return Ok(());
                }
                Err(ParseError::TruncatedMessage { buffered }) => {
                    warn!(buffered, "peer closed in the middle of a line");
                    return Ok(());
                }
                Err(e) => return Err(e),
            };

            if line.trim_ascii() == QUIT {
                debug!("peer quit");
                self.framed.write(BYE).await?;
                return Ok(());
            }

            reply.clear();
            reply.reserve(ECHO_PREFIX.len() + line.len() + 1);
            reply.put_slice(ECHO_PREFIX);
            reply.put_slice(&line);
            reply.put_u8(b'\n');
            self.framed.write(&reply).await?;
        }
    }
}
