use std::io;
use std::sync::Arc;

use http::{Method, StatusCode};
use thiserror::Error;

/// The outcome of a failed connection, split by which side of the exchange broke.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: SendError,
    },
}

/// Errors raised while turning inbound bytes into messages and bodies.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("line too long, current: {current_size} exceed the limit {max_size}")]
    TooLongLine { current_size: usize, max_size: usize },

    #[error("bad request line: {reason}")]
    BadRequestLine { reason: String },

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("http body not allowed for method {method}")]
    BodyNotAllowed { method: Method },

    #[error("not implemented: {reason}")]
    UnsupportedBody { reason: String },

    #[error("connection closed in the middle of a message, {buffered} bytes buffered")]
    TruncatedMessage { buffered: usize },

    #[error("unexpected eof from http body, {remaining} bytes missing")]
    UnexpectedEof { remaining: u64 },

    #[error("request body read after its exchange ended")]
    BodyDetached,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: TransportError,
    },
}

impl ParseError {
    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn too_long_line(current_size: usize, max_size: usize) -> Self {
        Self::TooLongLine { current_size, max_size }
    }

    pub fn bad_request_line<S: ToString>(str: S) -> Self {
        Self::BadRequestLine { reason: str.to_string() }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn invalid_content_length<S: ToString>(str: S) -> Self {
        Self::InvalidContentLength { reason: str.to_string() }
    }

    pub fn body_not_allowed(method: Method) -> Self {
        Self::BodyNotAllowed { method }
    }

    pub fn unsupported_body<S: ToString>(str: S) -> Self {
        Self::UnsupportedBody { reason: str.to_string() }
    }

    pub fn truncated_message(buffered: usize) -> Self {
        Self::TruncatedMessage { buffered }
    }

    pub fn unexpected_eof(remaining: u64) -> Self {
        Self::UnexpectedEof { remaining }
    }

    pub fn io<E: Into<TransportError>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    /// The status of the error response this error turns into, if any.
    ///
    /// Truncated bodies, over-long lines and transport failures have no status:
    /// they are never answered, the connection is just closed.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::TooLargeHeader { .. } => Some(StatusCode::PAYLOAD_TOO_LARGE),
            Self::BadRequestLine { .. }
            | Self::InvalidHeader { .. }
            | Self::InvalidContentLength { .. }
            | Self::BodyNotAllowed { .. }
            | Self::TruncatedMessage { .. } => Some(StatusCode::BAD_REQUEST),
            Self::UnsupportedBody { .. } => Some(StatusCode::SERVICE_UNAVAILABLE),
            Self::TooLongLine { .. } | Self::UnexpectedEof { .. } | Self::BodyDetached | Self::Io { .. } => None,
        }
    }
}

/// Errors raised while serializing and streaming a response.
#[derive(Error, Debug)]
pub enum SendError {
    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("response body length is unknown, chunked response is not supported")]
    UnknownLength,

    #[error("read response body error: {source}")]
    Body {
        #[from]
        source: ParseError,
    },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: TransportError,
    },
}

impl SendError {
    pub fn invalid_body<S: ToString>(str: S) -> Self {
        Self::InvalidBody { reason: str.to_string() }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn io<E: Into<TransportError>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

impl From<io::Error> for SendError {
    fn from(e: io::Error) -> Self {
        Self::io(e)
    }
}

/// A transport failure, shared so the connection can replay it on every later call.
#[derive(Error, Debug, Clone)]
#[error("transport error: {source}")]
pub struct TransportError {
    source: Arc<io::Error>,
}

impl TransportError {
    pub fn kind(&self) -> io::ErrorKind {
        self.source.kind()
    }
}

impl From<io::Error> for TransportError {
    fn from(e: io::Error) -> Self {
        Self { source: Arc::new(e) }
    }
}
