use std::io;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: SendError,
    },
}

/// Errors raised while turning raw bytes into a [`Request`](crate::protocol::Request)
/// or a [`Response`](crate::protocol::Response).
///
/// Every variant except [`ParseError::Io`] leaves the parser reset: the message in progress
/// and any buffered input are discarded.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed start line {line:?}: {reason}")]
    MalformedStartLine { line: String, reason: String },

    #[error("invalid http method: {0:?}")]
    InvalidMethod(String),

    #[error("invalid http version: {0:?}")]
    InvalidVersion(String),

    #[error("invalid status code: {0:?}")]
    InvalidStatus(String),

    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("header number exceed the limit {max_num}")]
    TooManyHeaders { max_num: usize },

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("request has no headers")]
    MissingHeaders,

    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("body size too large, content-length: {length} exceed the limit {max_size}")]
    TooLargeBody { length: usize, max_size: usize },

    #[error("no content received for {waited:?}")]
    Stalled { waited: Duration },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn malformed_start_line<L: ToString, R: ToString>(line: L, reason: R) -> Self {
        Self::MalformedStartLine { line: line.to_string(), reason: reason.to_string() }
    }

    pub fn invalid_method<S: ToString>(method: S) -> Self {
        Self::InvalidMethod(method.to_string())
    }

    pub fn invalid_version<S: ToString>(version: S) -> Self {
        Self::InvalidVersion(version.to_string())
    }

    pub fn invalid_status<S: ToString>(status: S) -> Self {
        Self::InvalidStatus(status.to_string())
    }

    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn too_many_headers(max_num: usize) -> Self {
        Self::TooManyHeaders { max_num }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn invalid_content_length<S: ToString>(str: S) -> Self {
        Self::InvalidContentLength { reason: str.to_string() }
    }

    pub fn too_large_body(length: usize, max_size: usize) -> Self {
        Self::TooLargeBody { length, max_size }
    }

    pub fn stalled(waited: Duration) -> Self {
        Self::Stalled { waited }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("unsupported http version: {0:?}")]
    UnsupportedVersion(http::Version),

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}
