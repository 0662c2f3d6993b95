//! HTTP head processing.
//!
//! - [`HeaderDecoder`]: frames a request head out of the inbound buffer
//!   - Enforces the header size limit before and after the terminator is seen
//!   - Splits the request line into method, target and version
//!   - Optionally validates header field syntax
//!
//! - [`HeaderEncoder`]: writes a response head
//!   - `HTTP/1.1 <code> ` status line with an empty reason phrase
//!   - Injects `Content-Length` computed from the body

mod header_decoder;
mod header_encoder;

pub use header_decoder::HeaderDecoder;
pub use header_encoder::HeaderEncoder;
