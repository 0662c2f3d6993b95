//! TCP listener running one connection loop per accepted stream.
//!
//! ```no_run
//! use micro_frame::handler::RouteTable;
//! use micro_frame::server::{HttpService, Server};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let server = Server::builder().address("127.0.0.1:8080").build().expect("valid address");
//!     server.start(HttpService::new(RouteTable::default())).await
//! }
//! ```

use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;

use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use crate::config::ConnectionConfig;
use crate::connection::{HttpConnection, LineConnection};
use crate::handler::Handler;

/// Serves one accepted stream to completion.
#[trait_variant::make(ConnectionService: Send)]
pub trait LocalConnectionService {
    async fn serve(&self, stream: TcpStream, config: ConnectionConfig);
}

#[derive(Debug)]
pub struct ServerBuilder {
    address: Option<io::Result<Vec<SocketAddr>>>,
    config: ConnectionConfig,
}

impl ServerBuilder {
    fn new() -> Self {
        Self { address: None, config: ConnectionConfig::default() }
    }

    /// Sets the listening address. It is resolved right away; a failure is
    /// reported by [`build`](Self::build).
    #[must_use]
    pub fn address<A: ToSocketAddrs>(mut self, address: A) -> Self {
        self.address = Some(address.to_socket_addrs().map(|addrs| addrs.collect()));
        self
    }

    #[must_use]
    pub fn config(mut self, config: ConnectionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Server, ServerBuildError> {
        let address = self.address.ok_or(ServerBuildError::MissingAddress)?.map_err(ServerBuildError::invalid_address)?;
        if address.is_empty() {
            return Err(ServerBuildError::invalid_address(io::Error::new(
                io::ErrorKind::InvalidInput,
                "address resolved to nothing",
            )));
        }

        Ok(Server { address, config: self.config })
    }
}

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("address must be set")]
    MissingAddress,
    #[error("invalid address: {source}")]
    InvalidAddress { source: io::Error },
}

impl ServerBuildError {
    fn invalid_address(source: io::Error) -> Self {
        Self::InvalidAddress { source }
    }
}

#[derive(Debug)]
pub struct Server {
    address: Vec<SocketAddr>,
    config: ConnectionConfig,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Binds the listener without accepting yet.
    pub async fn bind(self) -> io::Result<BoundServer> {
        let listener = TcpListener::bind(self.address.as_slice()).await?;
        info!(address = ?listener.local_addr()?, "start listening");
        Ok(BoundServer { listener, config: self.config })
    }

    /// Binds and serves forever.
    ///
    /// # Errors
    ///
    /// Only binding can fail.
    pub async fn start<S>(self, service: S) -> io::Result<()>
    where
        S: ConnectionService + Sync + 'static,
    {
        let bound = match self.bind().await {
            Ok(bound) => bound,
            Err(e) => {
                error!(cause = %e, "bind server error");
                return Err(e);
            }
        };

        bound.serve(service).await;
        Ok(())
    }
}

/// A server whose listener is bound.
#[derive(Debug)]
pub struct BoundServer {
    listener: TcpListener,
    config: ConnectionConfig,
}

impl BoundServer {
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections forever, each served by `service` on its own task.
    pub async fn serve<S>(self, service: S)
    where
        S: ConnectionService + Sync + 'static,
    {
        let service = Arc::new(service);
        loop {
            let (tcp_stream, remote_addr) = match self.listener.accept().await {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };

            debug!(%remote_addr, "accept connection");
            let service = service.clone();
            let config = self.config;
            tokio::spawn(async move {
                ConnectionService::serve(service.as_ref(), tcp_stream, config).await;
            });
        }
    }
}

/// Serves HTTP/1.1 with a shared [`Handler`].
#[derive(Debug)]
pub struct HttpService<H> {
    handler: Arc<H>,
}

impl<H: Handler> HttpService<H> {
    pub fn new(handler: H) -> Self {
        Self { handler: Arc::new(handler) }
    }
}

impl<H: Handler + 'static> ConnectionService for HttpService<H> {
    async fn serve(&self, stream: TcpStream, config: ConnectionConfig) {
        let (reader, writer) = stream.into_split();
        let connection = HttpConnection::with_config(reader, writer, &config);
        match connection.process(self.handler.clone()).await {
            Ok(()) => {
                info!("finished process, connection shutdown");
            }
            Err(e) => {
                error!(cause = %e, "service has error, connection shutdown");
            }
        }
    }
}

/// Serves the newline-delimited echo protocol.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineService;

impl ConnectionService for LineService {
    async fn serve(&self, stream: TcpStream, config: ConnectionConfig) {
        let (reader, writer) = stream.into_split();
        let connection = LineConnection::with_config(reader, writer, &config);
        match connection.process().await {
            Ok(()) => {
                info!("finished process, connection shutdown");
            }
            Err(e) => {
                error!(cause = %e, "service has error, connection shutdown");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_address() {
        let result = Server::builder().build();
        assert!(matches!(result, Err(ServerBuildError::MissingAddress)));
    }

    #[test]
    fn invalid_address() {
        let result = Server::builder().address("not an address").build();
        assert!(matches!(result, Err(ServerBuildError::InvalidAddress { .. })));
    }

    #[test]
    fn keeps_config() {
        let config = ConnectionConfig::new().with_max_header_bytes(1024);
        let server = Server::builder().address("127.0.0.1:0").config(config).build().unwrap();
        assert_eq!(server.config().max_header_bytes(), 1024);
    }

    #[tokio::test]
    async fn binds_an_ephemeral_port() {
        let bound = Server::builder().address("127.0.0.1:0").build().unwrap().bind().await.unwrap();
        assert_ne!(bound.local_addr().unwrap().port(), 0);
    }
}
