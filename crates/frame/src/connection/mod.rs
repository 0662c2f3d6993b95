//! Connection handling.
//!
//! # Components
//!
//! - [`Connection`]: awaitable reads and writes over a raw byte stream, with
//!   terminal end-of-stream and error states
//! - [`FramedConnection`]: a connection plus its inbound buffer; frames
//!   messages with any [`Framer`](crate::codec::Framer) and tracks the request
//!   payload being read
//! - [`HttpConnection`]: the HTTP/1.1 request loop:
//!   - Pipelined requests answered in order
//!   - Streaming request and response bodies
//!   - Keep-alive by HTTP version and `Connection: close`
//!   - Error responses for malformed requests
//! - [`LineConnection`]: the newline-delimited echo loop

mod conn;
mod framed;
mod http_connection;
mod line_connection;

pub use conn::Connection;
pub use framed::FramedConnection;
pub use http_connection::HttpConnection;
pub use line_connection::LineConnection;
