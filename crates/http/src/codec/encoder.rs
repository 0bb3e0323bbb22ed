//! HTTP/1.1 message encoder
//!
//! Serializes [`Request`]s and [`Response`]s into their wire form: start line, headers in
//! their stored order, a blank line and the body. Every line ends with `\r\n`.
//!
//! When a message has a body but no `Content-Length` header, one is appended so the peer's
//! parser can find the end of the body.

use std::io;
use std::io::Write;

use bytes::{BufMut, BytesMut};
use tokio_util::codec::Encoder;
use tracing::error;

use crate::protocol::{Body, Headers, Request, Response, SendError, version_text};

/// Initial buffer size allocated for the start line and header section
const INIT_HEADER_SIZE: usize = 4 * 1024;

/// Encoder for outgoing messages implementing the [`Encoder`] trait for both message kinds.
#[derive(Debug, Default, Clone, Copy)]
pub struct MessageEncoder;

impl MessageEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Encoder<Response> for MessageEncoder {
    type Error = SendError;

    fn encode(&mut self, item: Response, dst: &mut BytesMut) -> Result<(), Self::Error> {
        Encoder::<&Response>::encode(self, &item, dst)
    }
}

impl Encoder<&Response> for MessageEncoder {
    type Error = SendError;

    /// # Errors
    ///
    /// Returns [`SendError::UnsupportedVersion`] unless the response is HTTP/1.0 or HTTP/1.1.
    fn encode(&mut self, item: &Response, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let version = version_text(item.version()).ok_or_else(|| {
            error!(http_version = ?item.version(), "unsupported http version");
            SendError::UnsupportedVersion(item.version())
        })?;

        dst.reserve(INIT_HEADER_SIZE + item.body().len());
        write!(FastWrite(dst), "{version} {} {}\r\n", item.status().as_str(), item.reason())?;
        write_rest(item.headers(), item.body(), dst)
    }
}

impl Encoder<Request> for MessageEncoder {
    type Error = SendError;

    fn encode(&mut self, item: Request, dst: &mut BytesMut) -> Result<(), Self::Error> {
        Encoder::<&Request>::encode(self, &item, dst)
    }
}

impl Encoder<&Request> for MessageEncoder {
    type Error = SendError;

    fn encode(&mut self, item: &Request, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let version = version_text(item.version()).ok_or_else(|| {
            error!(http_version = ?item.version(), "unsupported http version");
            SendError::UnsupportedVersion(item.version())
        })?;

        dst.reserve(INIT_HEADER_SIZE + item.body().len());
        write!(FastWrite(dst), "{} {} {version}\r\n", item.method(), item.target())?;
        write_rest(item.headers(), item.body(), dst)
    }
}

fn write_rest(headers: &Headers, body: &Body, dst: &mut BytesMut) -> Result<(), SendError> {
    for header in headers {
        dst.put_slice(header.name().as_bytes());
        dst.put_slice(b": ");
        dst.put_slice(header.value().as_bytes());
        dst.put_slice(b"\r\n");
    }

    if !body.is_empty() && !headers.contains("content-length") {
        write!(FastWrite(dst), "Content-Length: {}\r\n", body.len())?;
    }

    dst.put_slice(b"\r\n");
    dst.put_slice(body.as_bytes());
    Ok(())
}

/// Fast writer implementation for writing to BytesMut.
///
/// Lets `write!` format straight into the buffer without an intermediate `String`.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{RequestParser, ResponseParser};
    use http::{Method, StatusCode, Version};
    use indoc::indoc;
    use tokio_util::codec::Decoder;

    #[test]
    fn encodes_response_with_generated_content_length() {
        let response = Response::new(StatusCode::OK).with_header("Content-Type", "text/plain").with_body("hello");

        let mut buf = BytesMut::new();
        MessageEncoder.encode(response, &mut buf).unwrap();

        let expected = indoc! {"
            HTTP/1.1 200 OK
            Content-Type: text/plain
            Content-Length: 5

        "}
        .replace('\n', "\r\n")
            + "hello";
        assert_eq!(buf, expected.as_bytes());
    }

    #[test]
    fn keeps_explicit_content_length() {
        let response = Response::new(StatusCode::OK).with_header("content-length", "2").with_body("ok");

        let mut buf = BytesMut::new();
        MessageEncoder.encode(&response, &mut buf).unwrap();

        assert_eq!(buf, &b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\n\r\nok"[..]);
    }

    #[test]
    fn empty_body_adds_no_length() {
        let mut buf = BytesMut::new();
        MessageEncoder.encode(Response::new(StatusCode::NO_CONTENT), &mut buf).unwrap();
        assert_eq!(buf, &b"HTTP/1.1 204 No Content\r\n\r\n"[..]);
    }

    #[test]
    fn encodes_request() {
        let request = Request::new(Method::PATCH, "/users/1?x=y").with_header("Host", "h").with_body("{}");

        let mut buf = BytesMut::new();
        MessageEncoder.encode(&request, &mut buf).unwrap();

        assert_eq!(buf, &b"PATCH /users/1?x=y HTTP/1.1\r\nHost: h\r\nContent-Length: 2\r\n\r\n{}"[..]);
    }

    #[test]
    fn rejects_unsupported_version() {
        let line = crate::protocol::StatusLine::new(Version::HTTP_2, StatusCode::OK, "OK");
        let response = Response::from_parts(line, Headers::new(), Body::empty());

        let mut buf = BytesMut::new();
        let result = MessageEncoder.encode(response, &mut buf);
        assert!(matches!(result, Err(SendError::UnsupportedVersion(v)) if v == Version::HTTP_2));
    }

    #[test]
    fn parser_reads_back_what_encoder_writes() {
        let request = Request::new(Method::POST, "/orders")
            .with_header("Host", "shop")
            .with_header("X-Tag", "a")
            .with_header("X-Tag", "b")
            .with_body("item=1");
        let response = Response::new(StatusCode::ACCEPTED).with_header("Server", "strand").with_body("queued");

        let mut buf = BytesMut::new();
        MessageEncoder.encode(&request, &mut buf).unwrap();
        let parsed = RequestParser::new().decode(&mut buf).unwrap().unwrap();
        assert_eq!(parsed.headers().get_all("x-tag").collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(parsed.body(), request.body());
        assert_eq!(parsed.header("content-length"), Some("6"));

        let mut buf = BytesMut::new();
        MessageEncoder.encode(&response, &mut buf).unwrap();
        let parsed = ResponseParser::new().decode(&mut buf).unwrap().unwrap();
        assert_eq!(parsed.status(), StatusCode::ACCEPTED);
        assert_eq!(parsed.reason(), "Accepted");
        assert_eq!(parsed.body().as_str(), Some("queued"));
    }
}
