//! HTTP request head decoder.
//!
//! This module frames one request head out of the inbound [`ByteBuffer`]. It
//! looks for the `CRLF CRLF` terminator, enforces the header size limit and
//! splits the head into a [`RequestHeader`].
//!
//! # Limits
//!
//! - Maximum header size: 8KB by default, terminator included
//!
//! # Implementation Details
//!
//! The decoder works in three stages:
//!
//! 1. Search the live bytes for the terminator, or fail early once the buffer
//!    reached the size limit without one
//! 2. Copy the head out once and slice the request line tokens and the header
//!    lines from that copy, so no line is copied twice
//! 3. Consume exactly the head, terminator included, leaving any body or
//!    pipelined request bytes in the buffer
//!
//! Header lines are stored verbatim. Field syntax validation goes through
//! `httparse` line by line and only runs when enabled in [`ConnectionConfig`].

use bytes::Bytes;
use http::Method;
use httparse::Status;
use tracing::trace;

use crate::buffer::ByteBuffer;
use crate::codec::Framer;
use crate::config::{ConnectionConfig, DEFAULT_MAX_HEADER_BYTES};
use crate::ensure;
use crate::protocol::{ParseError, RequestHeader};

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

const CRLF: &[u8] = b"\r\n";

/// Frames HTTP request heads, see the [module docs](self).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderDecoder {
    max_header_bytes: usize,
    validate_headers: bool,
}

impl Default for HeaderDecoder {
    fn default() -> Self {
        Self { max_header_bytes: DEFAULT_MAX_HEADER_BYTES, validate_headers: false }
    }
}

impl HeaderDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ConnectionConfig) -> Self {
        Self { max_header_bytes: config.max_header_bytes(), validate_headers: config.validate_headers() }
    }
}

impl Framer for HeaderDecoder {
    type Item = RequestHeader;

    /// Attempts to frame one request head from `src`.
    ///
    /// # Errors
    ///
    /// - [`ParseError::TooLargeHeader`] if the buffer holds the size limit or more
    ///   without a terminator, or the terminator ends beyond the limit
    /// - [`ParseError::BadRequestLine`] if the first line is not exactly three
    ///   single-space separated tokens, or the method is not a valid token
    /// - [`ParseError::InvalidHeader`] if validation is on and a header line is malformed
    fn decode(&mut self, src: &mut ByteBuffer) -> Result<Option<Self::Item>, ParseError> {
        let Some(index) = src.find(HEADER_TERMINATOR) else {
            ensure!(src.len() < self.max_header_bytes, ParseError::too_large_header(src.len(), self.max_header_bytes));
            return Ok(None);
        };

        let header_end = index + HEADER_TERMINATOR.len();
        ensure!(header_end <= self.max_header_bytes, ParseError::too_large_header(header_end, self.max_header_bytes));
        trace!(header_size = header_end, "parsed header size");

        // the terminator is not part of any line
        let head = Bytes::copy_from_slice(&src[..index]);
        let header = parse_head(&head)?;

        if self.validate_headers {
            validate_fields(header.header_lines())?;
        }

        src.consume(header_end);
        Ok(Some(header))
    }
}

fn parse_head(head: &Bytes) -> Result<RequestHeader, ParseError> {
    let mut lines = split_lines(head).into_iter();
    // split_lines always yields at least one line
    let request_line = lines.next().unwrap_or_default();
    let (method, target, version) = parse_request_line(&request_line)?;

    Ok(RequestHeader::new(method, target, version, lines.collect()))
}

fn parse_request_line(line: &Bytes) -> Result<(Method, Bytes, Bytes), ParseError> {
    let mut tokens = line.split(|b| *b == b' ');
    let (Some(method), Some(target), Some(version), None) = (tokens.next(), tokens.next(), tokens.next(), tokens.next())
    else {
        return Err(ParseError::bad_request_line("expect method, target and version separated by single spaces"));
    };

    ensure!(
        !method.is_empty() && !target.is_empty() && !version.is_empty(),
        ParseError::bad_request_line("empty token in request line")
    );

    let method = Method::from_bytes(method).map_err(|e| ParseError::bad_request_line(format!("invalid method token: {e}")))?;

    Ok((method, line.slice_ref(target), line.slice_ref(version)))
}

/// Splits `head` on CRLF into zero-copy slices of it.
fn split_lines(head: &Bytes) -> Vec<Bytes> {
    let mut lines = Vec::new();
    let mut start = 0;
    while let Some(offset) = find(&head[start..], CRLF) {
        lines.push(head.slice(start..start + offset));
        start += offset + CRLF.len();
    }
    lines.push(head.slice(start..));
    lines
}

/// Checks each header line on its own for `token ":" value` syntax, so the
/// number of lines is only bounded by the header size limit.
fn validate_fields(lines: &[Bytes]) -> Result<(), ParseError> {
    let mut field = Vec::new();
    for line in lines {
        field.clear();
        field.extend_from_slice(line);
        field.extend_from_slice(HEADER_TERMINATOR);

        let mut headers = [httparse::EMPTY_HEADER; 1];
        match httparse::parse_headers(&field, &mut headers) {
            Ok(Status::Complete(_)) => {}
            Ok(Status::Partial) => return Err(ParseError::invalid_header("incomplete header line")),
            Err(e) => return Err(ParseError::invalid_header(format!("{e}: {}", String::from_utf8_lossy(line)))),
        }
    }
    Ok(())
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}
