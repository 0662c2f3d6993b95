//! Framing and serialization.
//!
//! Every inbound protocol is built on one capability, [`Framer`]: look at the
//! live bytes of a [`ByteBuffer`] and either extract one message (consuming
//! exactly its bytes), ask for more data, or fail. The connection loop owns the
//! buffer and the transport; framers never perform I/O.
//!
//! - Request side:
//!   - [`HeaderDecoder`]: frames an HTTP request head
//!   - [`LengthDecoder`]: frames a `Content-Length` delimited body
//!   - [`request_body_length`]: picks the body strategy for a request head
//!   - [`LineDecoder`]: frames newline-delimited messages
//!
//! - Response side:
//!   - [`HeaderEncoder`]: serializes the status line and header lines
//!   - [`ResponseEncoder`]: writes a whole response, streaming its body

use crate::buffer::ByteBuffer;
use crate::protocol::ParseError;

mod body;
mod header;
mod line_decoder;
mod response_encoder;

pub use body::LengthDecoder;
pub use body::request_body_length;
pub use header::HeaderDecoder;
pub use header::HeaderEncoder;
pub use line_decoder::LineDecoder;
pub use response_encoder::ResponseEncoder;

/// A message-framing strategy over a [`ByteBuffer`].
pub trait Framer {
    type Item;

    /// Attempts to extract one message from the front of `src`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(item))`: a message was extracted and its bytes consumed
    /// - `Ok(None)`: more data is needed, `src` is left untouched
    /// - `Err(_)`: the buffered bytes can never form a valid message
    fn decode(&mut self, src: &mut ByteBuffer) -> Result<Option<Self::Item>, ParseError>;
}
