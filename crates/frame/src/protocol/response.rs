//! HTTP response types.
//!
//! A [`Response`] is a [`ResponseHead`] (status and raw header lines) plus a
//! [`BodyReader`]. Header lines stay mutable until the response is encoded;
//! the encoder is the one adding `Content-Length`.

use bytes::Bytes;
use http::StatusCode;

use crate::protocol::body::BodyReader;
use crate::protocol::field::field_value;

/// Status and header lines of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    status: StatusCode,
    headers: Vec<Bytes>,
}

impl ResponseHead {
    pub fn new(status: StatusCode) -> Self {
        Self { status, headers: Vec::new() }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Raw header lines, each with or without a trailing CRLF.
    pub fn headers(&self) -> &[Bytes] {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Vec<Bytes> {
        &mut self.headers
    }

    pub fn field(&self, name: &str) -> Option<&[u8]> {
        field_value(&self.headers, name)
    }
}

/// A response waiting to be encoded.
#[derive(Debug)]
pub struct Response {
    head: ResponseHead,
    body: BodyReader,
}

impl Response {
    /// A `200` response with the given body.
    pub fn new(body: impl Into<BodyReader>) -> Self {
        Self::with_status(StatusCode::OK, body)
    }

    pub fn with_status(status: StatusCode, body: impl Into<BodyReader>) -> Self {
        Self { head: ResponseHead::new(status), body: body.into() }
    }

    /// Appends a raw header line such as `Content-Type: text/plain`.
    #[must_use]
    pub fn header(mut self, line: impl Into<Bytes>) -> Self {
        self.head.headers.push(line.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.head.status
    }

    pub fn head(&self) -> &ResponseHead {
        &self.head
    }

    pub fn head_mut(&mut self) -> &mut ResponseHead {
        &mut self.head
    }

    pub fn body(&self) -> &BodyReader {
        &self.body
    }

    pub fn into_parts(self) -> (ResponseHead, BodyReader) {
        (self.head, self.body)
    }
}
