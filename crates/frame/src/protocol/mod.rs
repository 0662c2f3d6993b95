//! Protocol types shared by the codecs and the connection loops.
//!
//! - **Messages** ([`message`]): [`PayloadItem`] and [`PayloadSize`]
//! - **Requests** ([`request`]): [`RequestHeader`], the parsed request head
//! - **Responses** ([`response`]): [`Response`] and [`ResponseHead`]
//! - **Bodies** ([`body`]): [`BodyReader`], the pull-based body used in both directions
//! - **Errors** ([`error`]): [`HttpError`], [`ParseError`], [`SendError`], [`TransportError`]

mod message;
pub use message::PayloadItem;
pub use message::PayloadSize;

mod field;
pub use field::field_value;

mod request;
pub use request::BodyRule;
pub use request::RequestHeader;

mod response;
pub use response::Response;
pub use response::ResponseHead;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
pub use error::TransportError;

pub mod body;
pub use body::BodyReader;
