use bytes::Bytes;
use http::{StatusCode, Version};

use crate::protocol::{Body, Headers};

/// `HTTP-version SP status-code SP reason-phrase`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    version: Version,
    status: StatusCode,
    reason: String,
}

impl StatusLine {
    pub fn new(version: Version, status: StatusCode, reason: impl Into<String>) -> Self {
        Self { version, status, reason: reason.into() }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// A fully received, or ready to send, HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    line: StatusLine,
    headers: Headers,
    body: Body,
}

impl Response {
    /// An HTTP/1.1 response carrying the canonical reason phrase of `status`.
    pub fn new(status: StatusCode) -> Self {
        let reason = status.canonical_reason().unwrap_or("Unknown");
        Self::from_parts(StatusLine::new(Version::HTTP_11, status, reason), Headers::new(), Body::empty())
    }

    pub fn from_parts(line: StatusLine, headers: Headers, body: Body) -> Self {
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

    pub fn line(&self) -> &StatusLine {
        &self.line
    }

    pub fn status(&self) -> StatusCode {
        self.line.status()
    }

    pub fn reason(&self) -> &str {
        self.line.reason()
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

    pub fn into_parts(self) -> (StatusLine, Headers, Body) {
        (self.line, self.headers, self.body)
    }
}

impl TryFrom<Response> for http::Response<Bytes> {
    type Error = http::Error;

    fn try_from(response: Response) -> Result<Self, Self::Error> {
        let (line, headers, body) = response.into_parts();
        let mut builder = http::Response::builder().status(line.status).version(line.version);
        if let Some(map) = builder.headers_mut() {
            *map = headers.to_header_map()?;
        }
        builder.body(body.into_bytes())
    }
}
