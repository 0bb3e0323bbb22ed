//! HTTP/1.1 message model.
//!
//! - **Messages**: [`Request`] and [`Response`], each a start line, ordered [`Headers`] and a [`Body`]
//! - **Start lines**: [`RequestLine`] and [`StatusLine`], typed with the `http` crate's
//!   `Method`, `StatusCode` and `Version`
//! - **Errors**:
//!   - [`HttpError`]: Top-level error type of a connection
//!   - [`ParseError`]: Raised while parsing incoming bytes
//!   - [`SendError`]: Raised while writing a message
//!
//! Messages can be converted into `http::Request<Bytes>` / `http::Response<Bytes>` for
//! interop with the wider ecosystem.

mod message;
pub use message::Body;
pub use message::Header;
pub use message::Headers;
pub(crate) use message::version_text;

mod request;
pub use request::Request;
pub use request::RequestLine;

mod response;
pub use response::Response;
pub use response::StatusLine;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
