//! Body strategy for a request head.
//!
//! Only `Content-Length` framing is supported. Whether a request without any
//! length indicator has an empty body depends on its method, see
//! [`BodyRule`].

use http::header;

use crate::ensure;
use crate::protocol::{BodyRule, ParseError, RequestHeader};

/// Decides how many body bytes follow `header`.
///
/// # Errors
///
/// - [`ParseError::InvalidContentLength`] if `Content-Length` is not a plain
///   decimal number fitting in a `u64`, or comes with a `Transfer-Encoding`
/// - [`ParseError::BodyNotAllowed`] if a `HEAD` or `TRACE` request declares a
///   non-zero `Content-Length` or a chunked body
/// - [`ParseError::UnsupportedBody`] for any `Transfer-Encoding`, and for a
///   body-carrying method without `Content-Length`
pub fn request_body_length(header: &RequestHeader) -> Result<u64, ParseError> {
    // refer: https://www.rfc-editor.org/rfc/rfc9112.html#name-transfer-encoding
    let te_value = header.field(header::TRANSFER_ENCODING.as_str());
    let cl_value = header.field(header::CONTENT_LENGTH.as_str());

    ensure!(
        te_value.is_none() || cl_value.is_none(),
        ParseError::invalid_content_length("transfer_encoding and content_length both present in headers")
    );

    let length = cl_value.map(parse_content_length).transpose()?;

    match header.body_rule() {
        BodyRule::Forbidden => {
            ensure!(
                !te_value.is_some_and(is_chunked) && length.unwrap_or(0) == 0,
                ParseError::body_not_allowed(header.method().clone())
            );
            Ok(0)
        }

        rule => match (te_value, length) {
            (Some(value), _) => {
                let reason = if is_chunked(value) {
                    "chunked transfer encoding".to_string()
                } else {
                    format!("transfer encoding {}", String::from_utf8_lossy(value))
                };
                Err(ParseError::unsupported_body(reason))
            }
            (None, Some(length)) => Ok(length),
            (None, None) if rule == BodyRule::Optional => Ok(0),
            (None, None) => Err(ParseError::unsupported_body(format!("{} body without content-length", header.method()))),
        },
    }
}

fn parse_content_length(value: &[u8]) -> Result<u64, ParseError> {
    ensure!(
        !value.is_empty() && value.iter().all(u8::is_ascii_digit),
        ParseError::invalid_content_length(format!("value {} is not u64", String::from_utf8_lossy(value)))
    );

    // digits only, so the str conversion holds and parse fails only on overflow
    std::str::from_utf8(value)
        .ok()
        .and_then(|str| str.parse::<u64>().ok())
        .ok_or_else(|| ParseError::invalid_content_length(format!("value {} overflows u64", String::from_utf8_lossy(value))))
}

/// Checks if the Transfer-Encoding value ends with chunked.
///
/// According to RFC 7230, chunked must be the last encoding if present.
fn is_chunked(value: &[u8]) -> bool {
    const CHUNKED: &[u8] = b"chunked";
    value.rsplit(|b| *b == b',').next().is_some_and(|last| last.trim_ascii().eq_ignore_ascii_case(CHUNKED))
}
