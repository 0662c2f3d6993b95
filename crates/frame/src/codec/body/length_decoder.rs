//! Decoder for bodies delimited by a `Content-Length` header, as defined in
//! [RFC 7230 Section 3.3.2](https://tools.ietf.org/html/rfc7230#section-3.3.2).

use std::cmp;

use crate::buffer::ByteBuffer;
use crate::codec::Framer;
use crate::protocol::{ParseError, PayloadItem};

/// A decoder for a body of known length.
///
/// The decoder tracks the remaining bytes to be read. It never takes more
/// than that from the buffer, so bytes of a pipelined request stay in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthDecoder {
    /// The number of bytes remaining to be read from the payload
    length: u64,
}

impl LengthDecoder {
    pub fn new(length: u64) -> Self {
        Self { length }
    }

    /// Bytes of the body not handed out yet.
    pub fn remaining(&self) -> u64 {
        self.length
    }

    pub fn is_finished(&self) -> bool {
        self.length == 0
    }
}

impl Framer for LengthDecoder {
    type Item = PayloadItem;

    /// Decodes bytes from the input buffer according to the remaining length.
    ///
    /// # Returns
    /// * `Ok(Some(PayloadItem::Eof))` when all bytes have been read
    /// * `Ok(Some(PayloadItem::Chunk(bytes)))` with at most the remaining bytes
    /// * `Ok(None)` when more data is needed
    fn decode(&mut self, src: &mut ByteBuffer) -> Result<Option<Self::Item>, ParseError> {
        if self.length == 0 {
            return Ok(Some(PayloadItem::Eof));
        }

        if src.is_empty() {
            return Ok(None);
        }

        // Read the minimum of remaining length and available bytes
        let len = cmp::min(self.length, src.len() as u64);
        let bytes = src.split_to(len as usize);

        self.length -= bytes.len() as u64;
        Ok(Some(PayloadItem::Chunk(bytes)))
    }
}
