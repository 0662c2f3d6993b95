use std::error::Error;
use std::fmt::Display;
use std::sync::Arc;

use http::StatusCode;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, error, info, warn};

use crate::codec::{HeaderDecoder, ResponseEncoder, request_body_length};
use crate::config::ConnectionConfig;
use crate::connection::{Connection, FramedConnection};
use crate::handler::Handler;
use crate::protocol::{HttpError, Response};

/// An HTTP/1.1 connection that serves requests one after the other.
///
/// `HttpConnection` runs the whole lifecycle of one connection:
/// - Framing request heads, pipelined ones included
/// - Handing the head and a body reader to the [`Handler`], answering its reads
/// - Streaming the response back
/// - Discarding whatever the handler left of the request body
/// - Keeping the connection open or closing it depending on the request
///
/// Framing errors raised before a response started are answered with an error
/// response; every other failure just closes the connection.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
#[derive(Debug)]
pub struct HttpConnection<R, W> {
    framed: FramedConnection<R, W>,
    header_decoder: HeaderDecoder,
    response_encoder: ResponseEncoder,
    /// Whether the current exchange already wrote its response head
    response_started: bool,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_config(reader, writer, &ConnectionConfig::default())
    }

    pub fn with_config(reader: R, writer: W, config: &ConnectionConfig) -> Self {
        let connection = Connection::new(reader, writer).with_read_buffer_size(config.read_buffer_size());
        Self {
            framed: FramedConnection::new(connection),
            header_decoder: HeaderDecoder::from_config(config),
            response_encoder: ResponseEncoder::new(),
            response_started: false,
        }
    }

    /// Serves requests until the peer closes, a request asks to close, or an
    /// error happens. The connection is shut down in every case.
    ///
    /// # Errors
    ///
    /// Returns the error that ended the connection, after the error response
    /// (if any) was sent.
    pub async fn process<H: Handler>(mut self, handler: Arc<H>) -> Result<(), HttpError> {
        let result = self.serve(handler.as_ref()).await;

        if let Err(e) = &result {
            self.try_send_error(e).await;
        }

        self.framed.close().await;
        result
    }

    async fn serve<H: Handler>(&mut self, handler: &H) -> Result<(), HttpError> {
        loop {
            self.response_started = false;

            let Some(header) = self.framed.next_message(&mut self.header_decoder).await? else {
                info!("cant read more request, break this connection down");
                return Ok(());
            };

            let keep_alive = header.keep_alive();
            let length = request_body_length(&header)?;
            let body = self.framed.begin_payload(length);

            // the handler may read its body, the reads are answered meanwhile
            let response = match self.framed.serving(handler.call(header, body)).await {
                Ok(response) => response,
                Err(e) => {
                    let cause: Box<dyn Error + Send + Sync> = e.into();
                    error!(cause = %cause, "handle request error");
                    build_error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
                }
            };

            self.response_started = true;
            self.response_encoder.send(response, &mut self.framed).await?;

            if !keep_alive {
                debug!("request asked to close the connection");
                return Ok(());
            }

            self.framed.drain_payload().await?;
        }
    }

    /// Answers a framing error with its status, unless the error has no status
    /// or the exchange already started a response.
    async fn try_send_error(&mut self, error: &HttpError) {
        let HttpError::RequestError { source } = error else {
            return;
        };

        let Some(status) = source.status() else {
            return;
        };

        if self.response_started {
            return;
        }

        warn!(status = status.as_u16(), cause = %source, "can't receive next request, send error response");
        let response = build_error_response(status, source);
        if let Err(e) = self.response_encoder.send(response, &mut self.framed).await {
            debug!(cause = %e, "send error response failed");
        }
    }
}

fn build_error_response(status: StatusCode, message: impl Display) -> Response {
    Response::with_status(status, format!("{message}\n"))
}
