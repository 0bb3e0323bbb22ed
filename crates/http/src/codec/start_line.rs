//! Start line grammars for requests and responses.
//!
//! [`MessageParser`](crate::codec::MessageParser) is generic over [`StartLine`]; the two
//! implementations here decide what the first line of a message must look like and what
//! message type the parser finally produces.

use http::{Method, StatusCode, Version};

use crate::ensure;
use crate::protocol::{Body, Headers, ParseError, Request, RequestLine, Response, StatusLine};

/// The first line of an HTTP message together with the message it opens.
pub trait StartLine: Sized {
    type Message;

    /// Whether a message with zero headers is rejected with [`ParseError::MissingHeaders`].
    const REQUIRES_HEADERS: bool;

    /// Parses an already trimmed line with no line terminator.
    fn parse(line: &str) -> Result<Self, ParseError>;

    fn into_message(self, headers: Headers, body: Body) -> Self::Message;
}

impl StartLine for RequestLine {
    type Message = Request;

    const REQUIRES_HEADERS: bool = true;

    fn parse(line: &str) -> Result<Self, ParseError> {
        let mut tokens = line.split_whitespace();
        let (Some(method), Some(target), Some(version), None) =
            (tokens.next(), tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(ParseError::malformed_start_line(line, "expected method, target and version"));
        };

        Ok(RequestLine::new(parse_method(method)?, target, parse_version(version)?))
    }

    fn into_message(self, headers: Headers, body: Body) -> Request {
        Request::from_parts(self, headers, body)
    }
}

impl StartLine for StatusLine {
    type Message = Response;

    const REQUIRES_HEADERS: bool = false;

    fn parse(line: &str) -> Result<Self, ParseError> {
        let Some((version, rest)) = line.split_once(char::is_whitespace) else {
            return Err(ParseError::malformed_start_line(line, "expected version, status and reason"));
        };
        let version = parse_version(version)?;

        let rest = rest.trim_start();
        let (code, reason) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        let status = StatusCode::from_bytes(code.as_bytes()).map_err(|_e| ParseError::invalid_status(code))?;

        let reason = reason.trim();
        ensure!(!reason.is_empty(), ParseError::malformed_start_line(line, "missing reason phrase"));

        Ok(StatusLine::new(version, status, reason))
    }

    fn into_message(self, headers: Headers, body: Body) -> Response {
        Response::from_parts(self, headers, body)
    }
}

/// Only the nine standard methods are accepted, spelled in upper case.
fn parse_method(token: &str) -> Result<Method, ParseError> {
    let method = match token {
        "GET" => Method::GET,
        "POST" => Method::POST,
        "PUT" => Method::PUT,
        "DELETE" => Method::DELETE,
        "PATCH" => Method::PATCH,
        "HEAD" => Method::HEAD,
        "OPTIONS" => Method::OPTIONS,
        "TRACE" => Method::TRACE,
        "CONNECT" => Method::CONNECT,
        other => return Err(ParseError::invalid_method(other)),
    };
    Ok(method)
}

fn parse_version(token: &str) -> Result<Version, ParseError> {
    match token {
        "HTTP/1.1" => Ok(Version::HTTP_11),
        "HTTP/1.0" => Ok(Version::HTTP_10),
        other => Err(ParseError::invalid_version(other)),
    }
}
