//! Newline-delimited message framing.

use bytes::Bytes;

use crate::buffer::ByteBuffer;
use crate::codec::Framer;
use crate::config::{ConnectionConfig, DEFAULT_MAX_LINE_BYTES};
use crate::ensure;
use crate::protocol::ParseError;

/// Frames one line ending with `\n`.
///
/// The newline is consumed but not returned, and a `\r` right before it is
/// stripped. A line must be shorter than the limit; the limit is checked on
/// the line content so the outcome does not depend on how the bytes arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineDecoder {
    max_line_bytes: usize,
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self { max_line_bytes: DEFAULT_MAX_LINE_BYTES }
    }
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ConnectionConfig) -> Self {
        Self { max_line_bytes: config.max_line_bytes() }
    }
}

impl Framer for LineDecoder {
    type Item = Bytes;

    fn decode(&mut self, src: &mut ByteBuffer) -> Result<Option<Self::Item>, ParseError> {
        let Some(index) = src.iter().position(|b| *b == b'\n') else {
            ensure!(src.len() < self.max_line_bytes, ParseError::too_long_line(src.len(), self.max_line_bytes));
            return Ok(None);
        };

        ensure!(index < self.max_line_bytes, ParseError::too_long_line(index, self.max_line_bytes));

        let mut line = src.split_to(index + 1);
        line.truncate(index);
        if line.last() == Some(&b'\r') {
            line.truncate(index - 1);
        }
        Ok(Some(line))
    }
}
