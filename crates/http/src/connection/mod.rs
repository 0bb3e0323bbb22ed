//! HTTP connection handling module
//!
//! - [`HttpConnection`]: Drives one client connection:
//!   - Parses pipelined requests with a [`RequestParser`](crate::codec::RequestParser)
//!   - Hands each request to a [`Handler`](crate::handler::Handler) and writes its response
//!   - Answers a client that stops sending mid-request with `408 Request Timeout`
//!   - Answers unparsable input with `400 Bad Request`
//!   - Honors keep-alive semantics of HTTP/1.0 and HTTP/1.1

mod http_connection;

pub use http_connection::{DEFAULT_STALL_TIMEOUT, HttpConnection};
