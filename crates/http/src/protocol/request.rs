use bytes::Bytes;
use http::{Method, Version};

use crate::protocol::{Body, Headers};

/// `METHOD SP request-target SP HTTP-version`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    method: Method,
    target: String,
    version: Version,
}

impl RequestLine {
    pub fn new(method: Method, target: impl Into<String>, version: Version) -> Self {
        Self { method, target: target.into(), version }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn version(&self) -> Version {
        self.version
    }
}

/// A fully received HTTP request.
///
/// Requests are immutable once built; the `with_*` methods consume and return a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    line: RequestLine,
    headers: Headers,
    body: Body,
}

impl Request {
    /// An HTTP/1.1 request without headers or body.
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self::from_parts(RequestLine::new(method, target, Version::HTTP_11), Headers::new(), Body::empty())
    }

    pub fn from_parts(line: RequestLine, headers: Headers, body: Body) -> Self {
        Self { line, headers, body }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    pub fn line(&self) -> &RequestLine {
        &self.line
    }

    pub fn method(&self) -> &Method {
        self.line.method()
    }

    pub fn target(&self) -> &str {
        self.line.target()
    }

    /// The request target without its query string.
    pub fn path(&self) -> &str {
        match self.target().split_once('?') {
            Some((path, _)) => path,
            None => self.target(),
        }
    }

    /// The raw query string following `?`, if any.
    pub fn query(&self) -> Option<&str> {
        self.target().split_once('?').map(|(_, query)| query)
    }

    pub fn version(&self) -> Version {
        self.line.version()
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// HTTP/1.1 connections persist unless the client asks to close;
    /// HTTP/1.0 ones only when the client asks to keep them.
    pub fn is_keep_alive(&self) -> bool {
        let connection = self.header("connection");
        match self.version() {
            Version::HTTP_10 => connection.is_some_and(|value| value.eq_ignore_ascii_case("keep-alive")),
            _ => !connection.is_some_and(|value| value.eq_ignore_ascii_case("close")),
        }
    }

    pub fn into_parts(self) -> (RequestLine, Headers, Body) {
        (self.line, self.headers, self.body)
    }
}

impl TryFrom<Request> for http::Request<Bytes> {
    type Error = http::Error;

    fn try_from(request: Request) -> Result<Self, Self::Error> {
        let (line, headers, body) = request.into_parts();
        let mut builder = http::Request::builder().method(line.method).uri(line.target).version(line.version);
        if let Some(map) = builder.headers_mut() {
            *map = headers.to_header_map()?;
        }
        builder.body(body.into_bytes())
    }
}
