//! HTTP codec module for parsing and encoding HTTP messages
//!
//! - Parsing:
//!   - [`MessageParser`]: Incremental parser generic over the [`StartLine`] grammar
//!   - [`RequestParser`] / [`ResponseParser`]: The two concrete parsers
//!   - [`ParserConfig`]: Header section limits
//!
//! - Encoding:
//!   - [`MessageEncoder`]: Serializes requests and responses
//!
//! Both sides implement the `tokio_util` codec traits, so they plug straight into
//! [`FramedRead`](tokio_util::codec::FramedRead) and [`FramedWrite`](tokio_util::codec::FramedWrite).
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use http::StatusCode;
//! use strand_http::codec::{MessageEncoder, ResponseParser};
//! use strand_http::protocol::Response;
//! use tokio_util::codec::{Decoder, Encoder};
//!
//! let mut buffer = BytesMut::new();
//! MessageEncoder.encode(Response::new(StatusCode::OK).with_body("hi"), &mut buffer).unwrap();
//!
//! let response = ResponseParser::new().decode(&mut buffer).unwrap().unwrap();
//! assert_eq!(response.body().as_str(), Some("hi"));
//! ```

mod config;
mod encoder;
mod parser;
mod start_line;

pub use config::{MAX_BODY_BYTES, MAX_HEADER_BYTES, MAX_HEADER_NUM, ParserConfig};
pub use encoder::MessageEncoder;
pub use parser::{MessageParser, Phase, RequestParser, ResponseParser};
pub use start_line::StartLine;
