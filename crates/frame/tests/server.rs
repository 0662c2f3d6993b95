use std::net::SocketAddr;

use indoc::indoc;
use micro_frame::config::ConnectionConfig;
use micro_frame::handler::RouteTable;
use micro_frame::server::{ConnectionService, HttpService, LineService, Server};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

async fn start<S>(service: S, config: ConnectionConfig) -> SocketAddr
where
    S: ConnectionService + Sync + 'static,
{
    let server = Server::builder().address("127.0.0.1:0").config(config).build().unwrap();
    let bound = server.bind().await.unwrap();
    let address = bound.local_addr().unwrap();
    tokio::spawn(bound.serve(service));
    address
}

async fn round_trip(address: SocketAddr, request: &[u8]) -> String {
    let mut stream = TcpStream::connect(address).await.unwrap();
    stream.write_all(request).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

#[tokio::test]
async fn http_over_tcp() {
    let routes = RouteTable::builder().echo("/echo").fixed("/lolyou", "you have been hacked!").build();
    let address = start(HttpService::new(routes), ConnectionConfig::default()).await;

    let request = indoc! {"
    POST /echo HTTP/1.1
    Content-Length: 5

    hello"}
    .replace('\n', "\r\n");
    let mut stream = TcpStream::connect(address).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    stream.write_all(b"GET /lolyou HTTP/1.1\r\nConnection: close\r\n\r\n").await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    assert_eq!(
        response,
        "HTTP/1.1 200 \r\nContent-Length: 5\r\n\r\nhello\
         HTTP/1.1 200 \r\nContent-Length: 21\r\n\r\nyou have been hacked!"
    );

    let response = round_trip(address, b"GET /nope HTTP/1.0\r\n\r\n").await;
    assert_eq!(response, "HTTP/1.1 200 \r\nContent-Length: 13\r\n\r\nhello world.\n");
}

#[tokio::test]
async fn connections_are_isolated() {
    let config = ConnectionConfig::new().with_max_header_bytes(64);
    let address = start(HttpService::new(RouteTable::default()), config).await;

    let mut large = b"GET / HTTP/1.1\r\nX-Big: ".to_vec();
    large.resize(128, b'a');
    let rejected = round_trip(address, &large).await;
    assert!(rejected.starts_with("HTTP/1.1 413 \r\n"), "{rejected}");

    let response = round_trip(address, b"GET / HTTP/1.0\r\n\r\n").await;
    assert_eq!(response, "HTTP/1.1 200 \r\nContent-Length: 13\r\n\r\nhello world.\n");
}

#[tokio::test]
async fn line_echo_over_tcp() {
    let address = start(LineService, ConnectionConfig::default()).await;

    let response = round_trip(address, b"hi there\nquit\n").await;
    assert_eq!(response, "Echo: hi there\nBye.\n");
}
