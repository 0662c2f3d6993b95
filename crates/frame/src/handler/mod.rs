//! Request handlers.
//!
//! A [`Handler`] turns a request head and its body into a [`Response`]. The
//! body handed to the handler reads the connection lazily: the handler may
//! read it, return it (or what is left of it) as the response body to stream
//! it back to the peer, or drop it and leave the connection loop to discard
//! whatever was not read.
//!
//! - [`make_handler`] adapts an async function
//! - [`RouteTable`] maps exact targets to echo or fixed-body routes

use std::error::Error;
use std::future::Future;

use async_trait::async_trait;

use crate::protocol::{BodyReader, RequestHeader, Response};

mod route_table;
pub use route_table::Route;
pub use route_table::RouteTable;
pub use route_table::RouteTableBuilder;

#[async_trait]
pub trait Handler: Send + Sync {
    type Error: Into<Box<dyn Error + Send + Sync>> + Send;

    async fn call(&self, request: RequestHeader, body: BodyReader) -> Result<Response, Self::Error>;
}

#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<Err, F, Fut> Handler for HandlerFn<F>
where
    F: Fn(RequestHeader, BodyReader) -> Fut + Send + Sync,
    Err: Into<Box<dyn Error + Send + Sync>> + Send,
    Fut: Future<Output = Result<Response, Err>> + Send,
{
    type Error = Err;

    async fn call(&self, request: RequestHeader, body: BodyReader) -> Result<Response, Self::Error> {
        (self.f)(request, body).await
    }
}

pub fn make_handler<F, Err, Fut>(f: F) -> HandlerFn<F>
where
    Err: Into<Box<dyn Error + Send + Sync>>,
    Fut: Future<Output = Result<Response, Err>>,
    F: Fn(RequestHeader, BodyReader) -> Fut,
{
    HandlerFn { f }
}
