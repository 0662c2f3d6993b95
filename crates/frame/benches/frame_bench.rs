use std::hint::black_box;
use std::{
    io,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use bytes::BytesMut;
use criterion::{Criterion, criterion_group, criterion_main};
use futures::executor::block_on;
use http::StatusCode;
use micro_frame::{
    buffer::ByteBuffer,
    codec::{Framer, HeaderDecoder, HeaderEncoder, LineDecoder},
    connection::HttpConnection,
    handler::RouteTable,
    protocol::ResponseHead,
};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio_util::codec::Encoder;

// Mock IO for benchmarking
#[derive(Clone)]
struct MockIO {
    read_data: Vec<u8>,
    write_data: Vec<u8>,
    read_pos: usize,
}

impl MockIO {
    fn new(read_data: Vec<u8>) -> Self {
        Self { read_data, write_data: Vec::new(), read_pos: 0 }
    }
}

impl AsyncRead for MockIO {
    fn poll_read(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        let remaining = &self.read_data[self.read_pos..];
        let amt = std::cmp::min(remaining.len(), buf.remaining());
        buf.put_slice(&remaining[..amt]);
        self.read_pos += amt;
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockIO {
    fn poll_write(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<Result<usize, io::Error>> {
        self.write_data.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }
}

fn bench_header_decoder(c: &mut Criterion) {
    let request = b"GET / HTTP/1.1\r\nHost: localhost\r\nUser-Agent: curl/7.79.1\r\nAccept: */*\r\n\r\n";

    c.bench_function("decode_simple_request", |b| {
        b.iter(|| {
            let mut decoder = HeaderDecoder::new();
            let mut buffer = ByteBuffer::with_capacity(request.len());
            buffer.append(request);
            black_box(decoder.decode(&mut buffer).unwrap());
        });
    });

    c.bench_function("decode_fragmented_request", |b| {
        b.iter(|| {
            let mut decoder = HeaderDecoder::new();
            let mut buffer = ByteBuffer::new();
            for chunk in request.chunks(7) {
                buffer.append(chunk);
                if let Some(header) = decoder.decode(&mut buffer).unwrap() {
                    black_box(header);
                }
            }
        });
    });
}

fn bench_line_decoder(c: &mut Criterion) {
    let lines = b"hello\nworld\r\nquit\n".repeat(64);

    c.bench_function("decode_lines", |b| {
        b.iter(|| {
            let mut decoder = LineDecoder::new();
            let mut buffer = ByteBuffer::with_capacity(lines.len());
            buffer.append(&lines);
            while let Some(line) = decoder.decode(&mut buffer).unwrap() {
                black_box(line);
            }
        });
    });
}

fn bench_header_encoder(c: &mut Criterion) {
    let mut head = ResponseHead::new(StatusCode::OK);
    head.headers_mut().push("Content-Type: text/plain".into());

    c.bench_function("encode_simple_response", |b| {
        b.iter(|| {
            let mut bytes = BytesMut::new();
            black_box(HeaderEncoder.encode((head.clone(), 12), &mut bytes).unwrap());
        });
    });
}

fn bench_http_connection(c: &mut Criterion) {
    let request = b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n";
    let pipelined = b"POST /echo HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello".repeat(16);
    let handler = Arc::new(RouteTable::default());

    c.bench_function("process_simple_request", |b| {
        b.iter(|| {
            let mock_io = MockIO::new(request.to_vec());
            let (reader, writer) = (mock_io.clone(), mock_io);
            let connection = HttpConnection::new(reader, writer);
            black_box(block_on(connection.process(handler.clone())).unwrap());
        });
    });

    c.bench_function("process_pipelined_echo", |b| {
        b.iter(|| {
            let mock_io = MockIO::new(pipelined.clone());
            let (reader, writer) = (mock_io.clone(), mock_io);
            let connection = HttpConnection::new(reader, writer);
            black_box(block_on(connection.process(handler.clone())).unwrap());
        });
    });
}

criterion_group!(benches, bench_header_decoder, bench_line_decoder, bench_header_encoder, bench_http_connection);
criterion_main!(benches);
