//! HTTP response head encoder.
//!
//! This module serializes a [`ResponseHead`] and the body length into raw bytes:
//!
//! - the status line `HTTP/1.1 <code> \r\n`, the reason phrase is left empty
//! - every header line as given, with a CRLF appended when it lacks one
//! - a `Content-Length` line computed from the body length
//! - the blank line ending the head
//!
//! Callers never set `Content-Length` themselves: the encoder owns it and
//! rejects a head that already carries one.

use std::io;
use std::io::Write;

use bytes::{BufMut, BytesMut};
use http::header;
use tokio_util::codec::Encoder;
use tracing::error;

use crate::protocol::{ResponseHead, SendError};

/// Initial buffer size allocated for header serialization
const INIT_HEADER_SIZE: usize = 1024;

const CRLF: &[u8] = b"\r\n";

/// Encoder for HTTP response heads implementing the [`Encoder`] trait.
///
/// The item is the head and the exact body length in bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderEncoder;

impl Encoder<(ResponseHead, u64)> for HeaderEncoder {
    type Error = SendError;

    /// Encodes the response head into `dst`.
    ///
    /// # Errors
    ///
    /// Returns [`SendError::InvalidHeader`] if the head already has a
    /// `Content-Length` line; nothing is written in that case.
    fn encode(&mut self, item: (ResponseHead, u64), dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (head, length) = item;

        if head.field(header::CONTENT_LENGTH.as_str()).is_some() {
            error!(status = head.status().as_u16(), "response head already carries a content-length");
            return Err(SendError::invalid_header("content-length is computed from the body and must not be set"));
        }

        dst.reserve(INIT_HEADER_SIZE);
        write!(FastWrite(dst), "HTTP/1.1 {} \r\n", head.status().as_str())?;

        for line in head.headers() {
            dst.put_slice(line);
            if !line.ends_with(CRLF) {
                dst.put_slice(CRLF);
            }
        }

        write!(FastWrite(dst), "Content-Length: {length}\r\n")?;
        dst.put_slice(CRLF);
        Ok(())
    }
}

/// Fast writer implementation for writing to BytesMut.
///
/// `put_slice` grows the buffer when needed, so writes never fail.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
