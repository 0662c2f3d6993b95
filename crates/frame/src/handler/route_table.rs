use std::collections::HashMap;
use std::convert::Infallible;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::trace;

use crate::handler::Handler;
use crate::protocol::{BodyReader, RequestHeader, Response};

const DEFAULT_BODY: &str = "hello world.\n";

/// What a target answers with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// The request body, streamed back as it arrives
    Echo,
    /// A fixed in-memory body
    Fixed(Bytes),
}

/// Exact-match routing on the raw request target.
///
/// Targets are compared byte for byte, so `/echo?x=1` is not `/echo`. Unknown
/// targets get the fallback body. Every route answers `200`.
///
/// ```
/// use micro_frame::handler::{Route, RouteTable};
///
/// let table = RouteTable::builder().echo("/echo").fixed("/ping", "pong\n").build();
/// assert_eq!(table.lookup(b"/echo"), Route::Echo);
/// assert_eq!(table.lookup(b"/other"), Route::Fixed("hello world.\n".into()));
/// ```
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: HashMap<Bytes, Route>,
    fallback: Bytes,
}

#[derive(Debug)]
pub struct RouteTableBuilder {
    routes: HashMap<Bytes, Route>,
    fallback: Bytes,
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder { routes: HashMap::new(), fallback: Bytes::from_static(DEFAULT_BODY.as_bytes()) }
    }

    pub fn lookup(&self, target: &[u8]) -> Route {
        self.routes.get(target).cloned().unwrap_or_else(|| Route::Fixed(self.fallback.clone()))
    }
}

/// Only `/echo` is routed, everything else gets `hello world.\n`.
impl Default for RouteTable {
    fn default() -> Self {
        Self::builder().echo("/echo").build()
    }
}

impl RouteTableBuilder {
    #[must_use]
    pub fn echo(mut self, target: impl Into<Bytes>) -> Self {
        self.routes.insert(target.into(), Route::Echo);
        self
    }

    #[must_use]
    pub fn fixed(mut self, target: impl Into<Bytes>, body: impl Into<Bytes>) -> Self {
        self.routes.insert(target.into(), Route::Fixed(body.into()));
        self
    }

    #[must_use]
    pub fn fallback(mut self, body: impl Into<Bytes>) -> Self {
        self.fallback = body.into();
        self
    }

    pub fn build(self) -> RouteTable {
        RouteTable { routes: self.routes, fallback: self.fallback }
    }
}

#[async_trait]
impl Handler for RouteTable {
    type Error = Infallible;

    async fn call(&self, request: RequestHeader, body: BodyReader) -> Result<Response, Self::Error> {
        let route = self.lookup(request.target());
        trace!(method = %request.method(), target = %String::from_utf8_lossy(request.target()), ?route, "route request");

        let response = match route {
            Route::Echo => Response::new(body),
            Route::Fixed(bytes) => Response::new(bytes),
        };
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};

    use super::*;
    use crate::protocol::PayloadSize;

    fn request(target: &'static str) -> RequestHeader {
        RequestHeader::new(
            Method::POST,
            Bytes::from_static(target.as_bytes()),
            Bytes::from_static(b"HTTP/1.1"),
            vec![Bytes::from_static(b"Content-Length: 5")],
        )
    }

    #[test]
    fn default_routes() {
        let table = RouteTable::default();
        assert_eq!(table.lookup(b"/echo"), Route::Echo);
        assert_eq!(table.lookup(b"/echo/"), Route::Fixed(Bytes::from_static(b"hello world.\n")));
        assert_eq!(table.lookup(b"/"), Route::Fixed(Bytes::from_static(b"hello world.\n")));
    }

    #[test]
    fn configured_routes() {
        let table = RouteTable::builder().echo("/mirror").fixed("/lolyou", "you have been hacked!").fallback("nothing here\n").build();

        assert_eq!(table.lookup(b"/mirror"), Route::Echo);
        assert_eq!(table.lookup(b"/echo"), Route::Fixed(Bytes::from_static(b"nothing here\n")));
        assert_eq!(table.lookup(b"/lolyou"), Route::Fixed(Bytes::from_static(b"you have been hacked!")));
    }

    #[tokio::test]
    async fn echo_returns_the_request_body() {
        let (body, _requests) = BodyReader::inbound(5);
        let response = RouteTable::default().call(request("/echo"), body).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().length(), PayloadSize::Length(5));
        assert!(format!("{:?}", response.body()).contains("inbound"));
    }

    #[tokio::test]
    async fn fixed_ignores_the_request_body() {
        let (body, _requests) = BodyReader::inbound(5);
        let response = RouteTable::default().call(request("/nope"), body).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().length(), PayloadSize::Length(13));
    }
}
