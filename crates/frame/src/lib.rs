//! A per-connection server core: a backpressured connection adapter and an
//! incremental HTTP/1.1 framing engine.
//!
//! The crate turns a raw byte stream into awaitable reads and writes, splits the
//! arbitrarily fragmented inbound bytes into messages with a pluggable framer,
//! and serves HTTP/1.1 requests one after the other on each connection:
//!
//! - Request heads bounded in size (8KB by default)
//! - Bodies delimited by `Content-Length`, streamed in both directions
//! - Pipelined requests answered in order
//! - Connection lifetime per HTTP version and `Connection: close`
//! - Error responses for malformed requests, without breaking byte alignment
//!
//! The same machinery also runs a newline-delimited echo protocol.
//!
//! # Example
//!
//! ```no_run
//! use micro_frame::handler::RouteTable;
//! use micro_frame::server::{HttpService, Server};
//! use tracing::{Level, error};
//! use tracing_subscriber::FmtSubscriber;
//!
//! #[tokio::main]
//! async fn main() {
//!     // Initialize logging
//!     let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
//!     tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
//!
//!     let server = match Server::builder().address("127.0.0.1:8080").build() {
//!         Ok(server) => server,
//!         Err(e) => {
//!             error!(cause = %e, "build server error");
//!             return;
//!         }
//!     };
//!
//!     // `/echo` streams the request body back, every other target answers `hello world.\n`
//!     let routes = RouteTable::builder().echo("/echo").build();
//!     if let Err(e) = server.start(HttpService::new(routes)).await {
//!         error!(cause = %e, "server stopped");
//!     }
//! }
//! ```
//!
//! # Architecture
//!
//! - [`buffer`]: [`ByteBuffer`](buffer::ByteBuffer), bytes received but not framed yet
//! - [`connection`]: the connection adapter and the per-connection loops
//! - [`codec`]: framers for request heads, bodies and lines; the response encoder
//! - [`protocol`]: request, response and body types; the error taxonomy
//! - [`handler`]: the [`Handler`](handler::Handler) trait and the route table
//! - [`server`]: the TCP listener spawning one task per connection
//! - [`config`]: per-connection limits
//!
//! ## Error Handling
//!
//! - [`protocol::HttpError`]: Top-level error type of one HTTP connection
//! - [`protocol::ParseError`]: Framing errors, some of them answered with a status
//! - [`protocol::SendError`]: Response sending errors
//! - [`protocol::TransportError`]: The stored transport failure
//!
//! # Limitations
//!
//! - HTTP/1.1 only, no TLS
//! - No chunked bodies in either direction: a chunked request is answered `503`
//! - No timeouts: an idle peer keeps its connection

pub mod buffer;
pub mod codec;
pub mod config;
pub mod connection;
pub mod handler;
pub mod protocol;
pub mod server;

mod utils;
pub(crate) use utils::ensure;
