//! Request body framing.
//!
//! - [`LengthDecoder`]: hands out a `Content-Length` delimited payload
//! - [`request_body_length`]: decides, from the request head, how the body is
//!   delimited; chunked and read-until-close bodies are rejected as unsupported

mod length_decoder;
mod payload;

pub use length_decoder::LengthDecoder;
pub use payload::request_body_length;
