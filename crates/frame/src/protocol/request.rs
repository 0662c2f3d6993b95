//! Parsed HTTP request head.
//!
//! The head keeps what came over the wire: the target and version are opaque
//! byte tokens and the header lines are stored verbatim, in order. Only the
//! method is interpreted, since it decides whether a body may follow.

use bytes::Bytes;
use http::{Method, Version, header};

use crate::protocol::field::field_value;

/// How a request method relates to a request body.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BodyRule {
    /// The method has no defined request payload: only an empty body is accepted.
    Forbidden,
    /// A body may be declared by length; without a length indicator it is empty.
    Optional,
    /// A body is expected; its framing must be declared.
    Expected,
}

/// A request head: method, target, version and raw header lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHeader {
    method: Method,
    target: Bytes,
    version: Bytes,
    headers: Vec<Bytes>,
}

impl RequestHeader {
    pub fn new(method: Method, target: Bytes, version: Bytes, headers: Vec<Bytes>) -> Self {
        Self { method, target, version, headers }
    }

    /// Returns a reference to the request's HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request target exactly as sent, not percent-decoded.
    pub fn target(&self) -> &Bytes {
        &self.target
    }

    /// The raw version token, e.g. `HTTP/1.1`.
    pub fn version(&self) -> &Bytes {
        &self.version
    }

    /// The version token as a known HTTP version.
    pub fn http_version(&self) -> Option<Version> {
        match &self.version[..] {
            b"HTTP/1.0" => Some(Version::HTTP_10),
            b"HTTP/1.1" => Some(Version::HTTP_11),
            _ => None,
        }
    }

    /// Header lines in arrival order, without their CRLF.
    pub fn header_lines(&self) -> &[Bytes] {
        &self.headers
    }

    /// Trimmed value of the first header named `name` (case-insensitive).
    pub fn field(&self, name: &str) -> Option<&[u8]> {
        field_value(&self.headers, name)
    }

    pub fn body_rule(&self) -> BodyRule {
        match self.method {
            Method::HEAD | Method::TRACE => BodyRule::Forbidden,
            Method::GET | Method::DELETE | Method::OPTIONS | Method::CONNECT => BodyRule::Optional,
            _ => BodyRule::Expected,
        }
    }

    /// Whether the connection stays open after this exchange.
    ///
    /// HTTP/1.0 always closes. Every other version token keeps the connection
    /// unless the request asks for `Connection: close`.
    pub fn keep_alive(&self) -> bool {
        if self.http_version() == Some(Version::HTTP_10) {
            return false;
        }

        !self.field(header::CONNECTION.as_str()).is_some_and(|value| value.eq_ignore_ascii_case(b"close"))
    }
}
