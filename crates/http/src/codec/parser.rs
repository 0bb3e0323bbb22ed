//! Incremental HTTP/1.1 message parser
//!
//! [`MessageParser`] accepts arbitrary byte fragments and emits complete messages as soon
//! as enough input has arrived. Fragment boundaries never affect the result: a message fed
//! whole, byte by byte, or split anywhere in between parses to the same value.
//!
//! # State Machine
//!
//! ```text
//! NotStarted -> StartLine -> Headers -> Body -> Completed -> NotStarted
//! ```
//!
//! Each step either advances or suspends because input ran out. Suspending records the
//! instant it happened so callers can detect a peer that stopped sending mid-message.
//!
//! # Buffering
//!
//! New fragments wait in an overflow queue and are moved into the pending buffer only once
//! a scan of the pending bytes fails. Lines are split off the front of the pending buffer,
//! and the scan offset is remembered so bytes are never scanned twice.
//!
//! # Example
//!
//! ```
//! use strand_http::codec::RequestParser;
//!
//! let mut parser = RequestParser::new();
//! parser.feed("GET /users/7 HTTP/1.1\r\nHo").unwrap();
//! assert!(!parser.has_completed());
//!
//! parser.feed("st: example.com\r\n\r\n").unwrap();
//! let request = parser.take_completed().unwrap();
//! assert_eq!(request.path(), "/users/7");
//! ```

use std::collections::VecDeque;
use std::io;
use std::io::ErrorKind;
use std::time::{Duration, Instant};

use bytes::{Bytes, BytesMut};
use tokio_util::codec::Decoder;
use tracing::{debug, trace};

use crate::codec::{ParserConfig, StartLine};
use crate::ensure;
use crate::protocol::{Body, Headers, ParseError, RequestLine, StatusLine};

/// Parser producing [`Request`](crate::protocol::Request)s
pub type RequestParser = MessageParser<RequestLine>;

/// Parser producing [`Response`](crate::protocol::Response)s
pub type ResponseParser = MessageParser<StatusLine>;

/// Where the parser stands within the message currently being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    StartLine,
    Headers,
    Body,
    Completed,
}

enum Step {
    Advanced,
    Idle,
    Suspended,
}

/// Incremental parser for a stream of HTTP messages of one kind.
///
/// Besides the `feed`/`take_completed` API, the parser implements [`Decoder`] so it can sit
/// directly inside a [`FramedRead`](tokio_util::codec::FramedRead).
#[derive(Debug)]
pub struct MessageParser<S: StartLine> {
    config: ParserConfig,
    phase: Phase,

    pending: BytesMut,
    scanned: usize,
    overflow: VecDeque<Bytes>,
    pending_since: Option<Instant>,

    header_bytes: usize,
    start_line: Option<S>,
    headers: Headers,
    content_length: Option<usize>,
    body: Body,

    completed: VecDeque<S::Message>,
    deferred_error: Option<ParseError>,
}

impl<S: StartLine> MessageParser<S> {
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config,
            phase: Phase::NotStarted,
            pending: BytesMut::new(),
            scanned: 0,
            overflow: VecDeque::new(),
            pending_since: None,
            header_bytes: 0,
            start_line: None,
            headers: Headers::new(),
            content_length: None,
            body: Body::empty(),
            completed: VecDeque::new(),
            deferred_error: None,
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Queues a fragment without parsing it.
    ///
    /// Receiving any bytes clears the stall clock.
    pub fn include(&mut self, fragment: impl Into<Bytes>) {
        let fragment = fragment.into();
        if fragment.is_empty() {
            return;
        }
        self.pending_since = None;
        self.overflow.push_back(fragment);
    }

    /// Queues a fragment and parses as far as the buffered input allows.
    pub fn feed(&mut self, fragment: impl Into<Bytes>) -> Result<(), ParseError> {
        self.include(fragment);
        self.parse()
    }

    /// Runs the state machine until it suspends for more input or runs out of messages.
    ///
    /// # Errors
    ///
    /// On any [`ParseError`] the message in progress and every buffered byte are discarded
    /// and the parser returns to [`Phase::NotStarted`]. Messages completed before the error
    /// stay available through [`take_completed`](Self::take_completed).
    pub fn parse(&mut self) -> Result<(), ParseError> {
        loop {
            let step = match self.phase {
                Phase::NotStarted => Ok(self.begin()),
                Phase::StartLine => self.parse_start_line(),
                Phase::Headers => self.parse_headers(),
                Phase::Body => Ok(self.parse_body()),
                Phase::Completed => Ok(self.complete()),
            };

            match step {
                Ok(Step::Advanced) => {}
                Ok(Step::Idle) => return Ok(()),
                Ok(Step::Suspended) => {
                    self.pending_since.get_or_insert_with(Instant::now);
                    trace!(phase = ?self.phase, buffered = self.pending.len(), "waiting for more content");
                    return Ok(());
                }
                Err(e) => {
                    debug!(phase = ?self.phase, cause = %e, "discarding message");
                    self.reset();
                    return Err(e);
                }
            }
        }
    }

    pub fn has_completed(&self) -> bool {
        !self.completed.is_empty()
    }

    /// Removes the oldest completed message.
    pub fn take_completed(&mut self) -> Option<S::Message> {
        self.completed.pop_front()
    }

    /// Whether the last parse stopped mid-message because input ran out.
    pub fn is_awaiting_more_content(&self) -> bool {
        self.pending_since.is_some()
    }

    /// Whether no partial message and no unparsed bytes are buffered.
    pub fn is_idle(&self) -> bool {
        self.phase == Phase::NotStarted && self.pending.is_empty() && self.overflow.is_empty()
    }

    pub fn has_stalled(&self, timeout: Duration) -> bool {
        self.has_stalled_at(Instant::now(), timeout)
    }

    /// Whether the parser has been waiting for more content for longer than `timeout` as of `now`.
    pub fn has_stalled_at(&self, now: Instant, timeout: Duration) -> bool {
        self.pending_since.is_some_and(|since| now.saturating_duration_since(since) > timeout)
    }

    fn begin(&mut self) -> Step {
        if self.pending.is_empty() && self.overflow.is_empty() {
            return Step::Idle;
        }
        self.phase = Phase::StartLine;
        Step::Advanced
    }

    fn parse_start_line(&mut self) -> Result<Step, ParseError> {
        let Some(line) = self.next_line()? else {
            return Ok(Step::Suspended);
        };

        let text = std::str::from_utf8(&line)
            .map_err(|_e| ParseError::malformed_start_line(String::from_utf8_lossy(&line), "not valid utf-8"))?;
        let start_line = S::parse(text.trim())?;

        trace!(line = text, "parsed start line");
        self.start_line = Some(start_line);
        self.phase = Phase::Headers;
        Ok(Step::Advanced)
    }

    fn parse_headers(&mut self) -> Result<Step, ParseError> {
        loop {
            let Some(line) = self.next_line()? else {
                return Ok(Step::Suspended);
            };

            let text = std::str::from_utf8(&line).map_err(|_e| ParseError::invalid_header("not valid utf-8"))?;
            let text = text.trim();
            if text.is_empty() {
                break;
            }

            let Some((name, value)) = text.split_once(':') else {
                return Err(ParseError::invalid_header(format!("missing ':' in {text:?}")));
            };
            let name = name.trim();
            ensure!(!name.is_empty(), ParseError::invalid_header(format!("empty name in {text:?}")));
            ensure!(self.headers.len() < self.config.max_headers, ParseError::too_many_headers(self.config.max_headers));

            let value = value.trim();
            if self.content_length.is_none() && name.eq_ignore_ascii_case("content-length") {
                self.content_length = Some(self.parse_content_length(value)?);
            }
            self.headers.append(name, value);
        }

        ensure!(!S::REQUIRES_HEADERS || !self.headers.is_empty(), ParseError::MissingHeaders);

        trace!(headers = self.headers.len(), content_length = ?self.content_length, "parsed headers");
        self.phase = Phase::Body;
        Ok(Step::Advanced)
    }

    /// Only ASCII digits are accepted, so signs and whitespace inside the value are rejected.
    fn parse_content_length(&self, value: &str) -> Result<usize, ParseError> {
        ensure!(
            !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()),
            ParseError::invalid_content_length(value)
        );
        let length = value.parse::<usize>().map_err(|_e| ParseError::invalid_content_length(value))?;

        let max_size = self.config.max_body_bytes;
        ensure!(length <= max_size, ParseError::too_large_body(length, max_size));
        Ok(length)
    }

    fn parse_body(&mut self) -> Step {
        let length = self.content_length.unwrap_or(0);
        if length > 0 {
            while self.pending.len() < length {
                match self.overflow.pop_front() {
                    Some(fragment) => self.pending.extend_from_slice(&fragment),
                    None => return Step::Suspended,
                }
            }
            self.body = Body::from(self.pending.split_to(length).freeze());
        }

        self.phase = Phase::Completed;
        Step::Advanced
    }

    fn complete(&mut self) -> Step {
        let Some(start_line) = self.start_line.take() else {
            unreachable!("a message reaches completion only after its start line is parsed");
        };
        let headers = std::mem::take(&mut self.headers);
        let body = std::mem::take(&mut self.body);

        self.completed.push_back(start_line.into_message(headers, body));
        self.clear_message();
        self.pending_since = None;
        self.phase = Phase::NotStarted;
        Step::Advanced
    }

    /// Splits the next line off the pending buffer, pulling queued fragments only when the
    /// pending bytes hold no terminator. The terminator and a preceding `\r` are dropped.
    fn next_line(&mut self) -> Result<Option<BytesMut>, ParseError> {
        let max_size = self.config.max_header_bytes;
        loop {
            if let Some(offset) = self.pending[self.scanned..].iter().position(|b| *b == b'\n') {
                let end = self.scanned + offset;
                self.scanned = 0;
                self.header_bytes += end + 1;
                ensure!(self.header_bytes <= max_size, ParseError::too_large_header(self.header_bytes, max_size));

                let mut line = self.pending.split_to(end + 1);
                line.truncate(end);
                if line.last() == Some(&b'\r') {
                    line.truncate(end - 1);
                }
                return Ok(Some(line));
            }

            self.scanned = self.pending.len();
            let buffered = self.header_bytes + self.pending.len();
            ensure!(buffered <= max_size, ParseError::too_large_header(buffered, max_size));

            match self.overflow.pop_front() {
                Some(fragment) => self.pending.extend_from_slice(&fragment),
                None => return Ok(None),
            }
        }
    }

    fn clear_message(&mut self) {
        self.header_bytes = 0;
        self.start_line = None;
        self.headers = Headers::new();
        self.content_length = None;
        self.body = Body::empty();
    }

    fn reset(&mut self) {
        self.clear_message();
        self.pending.clear();
        self.scanned = 0;
        self.overflow.clear();
        self.pending_since = None;
        self.phase = Phase::NotStarted;
    }
}

impl<S: StartLine> Default for MessageParser<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: StartLine> Decoder for MessageParser<S> {
    type Item = S::Message;
    type Error = ParseError;

    /// Moves everything in `src` into the parser and yields the oldest completed message.
    ///
    /// A parse error is held back until every message completed before it has been
    /// yielded. Input arriving while an error is held back is discarded.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.deferred_error.is_some() {
            src.clear();
        } else if !src.is_empty() {
            if let Err(e) = self.feed(src.split().freeze()) {
                if !self.has_completed() {
                    return Err(e);
                }
                self.deferred_error = Some(e);
            }
        }

        if let Some(message) = self.take_completed() {
            return Ok(Some(message));
        }
        match self.deferred_error.take() {
            Some(e) => Err(e),
            None => Ok(None),
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(message) = self.decode(buf)? {
            return Ok(Some(message));
        }

        if self.is_idle() {
            Ok(None)
        } else {
            debug!(phase = ?self.phase, "stream closed in the middle of a message");
            self.reset();
            Err(ParseError::io(io::Error::from(ErrorKind::UnexpectedEof)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Request, Response};
    use http::{Method, StatusCode, Version};
    use indoc::indoc;

    fn crlf(text: &str) -> String {
        text.replace('\n', "\r\n")
    }

    fn parse_whole(text: &str) -> Vec<Request> {
        let mut parser = RequestParser::new();
        parser.feed(text.to_owned()).unwrap();
        std::iter::from_fn(|| parser.take_completed()).collect()
    }

    #[test]
    fn parses_get_with_headers() {
        let text = crlf(indoc! {"
            GET /index.html?lang=en HTTP/1.1
            Host: 127.0.0.1:8080
            User-Agent: curl/7.79.1
            Accept: */*

        "});

        let requests = parse_whole(&text);
        assert_eq!(requests.len(), 1);

        let request = &requests[0];
        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.target(), "/index.html?lang=en");
        assert_eq!(request.version(), Version::HTTP_11);
        assert_eq!(request.headers().len(), 3);
        assert_eq!(request.header("user-agent"), Some("curl/7.79.1"));
        assert!(request.body().is_empty());
    }

    #[test]
    fn parses_body_by_content_length() {
        let text = crlf(indoc! {r#"
            POST /users HTTP/1.1
            Host: localhost
            Content-Type: application/json
            Content-Length: 15

        "#}) + r#"{"name":"ada"}!"#;

        let requests = parse_whole(&text);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].body().as_str(), Some(r#"{"name":"ada"}!"#));
    }

    #[test]
    fn accepts_bare_newlines() {
        let text = "GET / HTTP/1.1\nHost: a\n\n";
        let requests = parse_whole(text);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].header("host"), Some("a"));
    }

    #[test]
    fn trims_header_names_and_values() {
        let requests = parse_whole("GET / HTTP/1.1\r\n  X-Name  :   some value  \r\n\r\n");
        let header = requests[0].headers().iter().next().unwrap();
        assert_eq!(header.name(), "X-Name");
        assert_eq!(header.value(), "some value");
    }

    #[test]
    fn header_value_may_contain_colons() {
        let requests = parse_whole("GET / HTTP/1.1\r\nHost: localhost:8080\r\n\r\n");
        assert_eq!(requests[0].header("host"), Some("localhost:8080"));
    }

    #[test]
    fn byte_by_byte_equals_whole() {
        let text = crlf(indoc! {"
            PUT /items/42 HTTP/1.1
            Host: localhost
            Content-Length: 11

        "}) + "hello world";

        let whole = parse_whole(&text);

        let mut parser = RequestParser::new();
        for byte in text.as_bytes() {
            parser.feed(Bytes::copy_from_slice(&[*byte])).unwrap();
        }
        let single = parser.take_completed().unwrap();

        assert_eq!(whole[0], single);
        assert!(parser.take_completed().is_none());
    }

    #[test]
    fn every_split_point_yields_the_same_message() {
        let text = crlf(indoc! {"
            POST /a/b HTTP/1.1
            Host: h
            Content-Length: 3

        "}) + "xyz";
        let expected = parse_whole(&text).remove(0);

        for split in 0..=text.len() {
            let mut parser = RequestParser::new();
            parser.feed(text.as_bytes()[..split].to_vec()).unwrap();
            parser.feed(text.as_bytes()[split..].to_vec()).unwrap();
            assert_eq!(parser.take_completed().as_ref(), Some(&expected), "split at {split}");
        }
    }

    #[test]
    fn pipelined_messages_complete_in_order() {
        let text = crlf(indoc! {"
            GET /first HTTP/1.1
            Host: h

            POST /second HTTP/1.1
            Host: h
            Content-Length: 2

        "}) + "ok" + &crlf(indoc! {"
            DELETE /third HTTP/1.1
            Host: h

        "});

        let requests = parse_whole(&text);
        let targets: Vec<_> = requests.iter().map(Request::target).collect();
        assert_eq!(targets, vec!["/first", "/second", "/third"]);
        assert_eq!(requests[1].body().as_str(), Some("ok"));
    }

    #[test]
    fn partial_second_message_waits() {
        let mut parser = RequestParser::new();
        parser.feed("GET /a HTTP/1.1\r\nHost: h\r\n\r\nGET /b HT").unwrap();

        assert_eq!(parser.take_completed().unwrap().target(), "/a");
        assert!(!parser.has_completed());
        assert!(parser.is_awaiting_more_content());
        assert_eq!(parser.phase(), Phase::StartLine);

        parser.feed("TP/1.1\r\nHost: h\r\n\r\n").unwrap();
        assert_eq!(parser.take_completed().unwrap().target(), "/b");
        assert!(parser.is_idle());
    }

    #[test]
    fn first_content_length_wins() {
        let requests = parse_whole("POST / HTTP/1.1\r\nContent-Length: 2\r\nContent-Length: 5\r\n\r\nabcdefg");
        assert_eq!(requests[0].body().as_str(), Some("ab"));
        assert_eq!(requests[0].headers().get_all("content-length").count(), 2);
    }

    #[test]
    fn invalid_content_length() {
        let mut parser = RequestParser::new();
        let result = parser.feed("POST / HTTP/1.1\r\nContent-Length: lots\r\n\r\n");
        assert!(matches!(result, Err(ParseError::InvalidContentLength { .. })));

        let result = parser.feed("POST / HTTP/1.1\r\nContent-Length: -3\r\n\r\n");
        assert!(matches!(result, Err(ParseError::InvalidContentLength { .. })));
    }

    #[test]
    fn request_without_headers_is_rejected() {
        let mut parser = RequestParser::new();
        let result = parser.feed("GET / HTTP/1.1\r\n\r\n");
        assert!(matches!(result, Err(ParseError::MissingHeaders)));
    }

    #[test]
    fn header_without_colon_is_rejected() {
        let mut parser = RequestParser::new();
        let result = parser.feed("GET / HTTP/1.1\r\nHost localhost\r\n\r\n");
        assert!(matches!(result, Err(ParseError::InvalidHeader { .. })));
    }

    #[test]
    fn leading_empty_line_is_a_malformed_start_line() {
        let mut parser = RequestParser::new();
        let result = parser.feed("\r\nGET / HTTP/1.1\r\nHost: h\r\n\r\n");
        assert!(matches!(result, Err(ParseError::MalformedStartLine { .. })));
    }

    #[test]
    fn error_resets_and_discards_buffered_input() {
        let mut parser = RequestParser::new();
        parser.include("GET / HTTP/1.1\r\nHost: h\r\n\r\n");
        parser.include("FETCH / HTTP/1.1\r\nHost: h\r\n\r\n");
        parser.include("GET /lost HTTP/1.1\r\nHost: h\r\n\r\n");

        let result = parser.parse();
        assert!(matches!(result, Err(ParseError::InvalidMethod(_))));
        assert!(parser.is_idle());
        assert!(!parser.is_awaiting_more_content());

        assert_eq!(parser.take_completed().unwrap().target(), "/");
        assert!(parser.take_completed().is_none());

        parser.feed("GET /next HTTP/1.1\r\nHost: h\r\n\r\n").unwrap();
        assert_eq!(parser.take_completed().unwrap().target(), "/next");
    }

    #[test]
    fn include_defers_parsing() {
        let mut parser = RequestParser::new();
        parser.include("GET / HTTP/1.1\r\nHost: h\r\n\r\n");
        assert!(!parser.has_completed());
        assert_eq!(parser.phase(), Phase::NotStarted);

        parser.parse().unwrap();
        assert!(parser.has_completed());
    }

    #[test]
    fn stall_clock_starts_on_suspension_and_clears_on_input() {
        let mut parser = RequestParser::new();
        let timeout = Duration::from_millis(100);

        parser.feed("GET / HTTP/1.1\r\n").unwrap();
        assert!(parser.is_awaiting_more_content());
        let later = Instant::now() + Duration::from_secs(1);
        assert!(parser.has_stalled_at(later, timeout));
        assert!(!parser.has_stalled_at(Instant::now(), Duration::from_secs(60)));

        parser.include("Host: h\r\n");
        assert!(!parser.is_awaiting_more_content());
        assert!(!parser.has_stalled_at(later, timeout));

        parser.parse().unwrap();
        parser.feed("\r\n").unwrap();
        assert!(parser.has_completed());
        assert!(!parser.is_awaiting_more_content());
        assert!(!parser.has_stalled_at(later, timeout));
    }

    #[test]
    fn reparsing_without_input_keeps_the_stall_clock() {
        let mut parser = RequestParser::new();
        parser.feed("GET / HT").unwrap();
        let first = parser.pending_since;
        parser.parse().unwrap();
        assert_eq!(parser.pending_since, first);
    }

    #[test]
    fn idle_parser_is_not_awaiting() {
        let mut parser = RequestParser::new();
        parser.parse().unwrap();
        assert!(!parser.is_awaiting_more_content());
        assert!(!parser.has_stalled_at(Instant::now() + Duration::from_secs(10), Duration::ZERO));
    }

    #[test]
    fn body_waits_for_every_announced_byte() {
        let timeout = Duration::from_millis(100);
        let mut parser = RequestParser::new();
        parser.feed("POST / HTTP/1.1\r\nHost: h\r\nContent-Length: 10\r\n\r\n01234").unwrap();
        assert_eq!(parser.phase(), Phase::Body);
        assert!(parser.is_awaiting_more_content());
        assert!(parser.has_stalled_at(Instant::now() + Duration::from_secs(1), timeout));

        parser.feed("5678").unwrap();
        assert!(!parser.has_completed());
        assert!(parser.has_stalled_at(Instant::now() + Duration::from_secs(1), timeout));

        parser.include("9");
        assert!(!parser.has_stalled_at(Instant::now() + Duration::from_secs(1), timeout));

        parser.parse().unwrap();
        assert_eq!(parser.take_completed().unwrap().body().as_str(), Some("0123456789"));
        assert!(!parser.is_awaiting_more_content());
        assert!(!parser.has_stalled_at(Instant::now() + Duration::from_secs(1), timeout));
    }

    #[test]
    fn content_length_must_be_plain_digits() {
        for value in ["+5", "-0", "5 5", "0x10", ""] {
            let mut parser = RequestParser::new();
            let result = parser.feed(format!("POST / HTTP/1.1\r\nContent-Length: {value}\r\n\r\nhello"));
            assert!(matches!(result, Err(ParseError::InvalidContentLength { .. })), "content-length {value:?}");
        }

        let mut parser = RequestParser::new();
        let result = parser.feed("POST / HTTP/1.1\r\nContent-Length: 99999999999999999999999\r\n\r\n");
        assert!(matches!(result, Err(ParseError::InvalidContentLength { .. })));
    }

    #[test]
    fn content_length_over_the_body_limit() {
        let config = ParserConfig { max_body_bytes: 8, ..ParserConfig::default() };
        let mut parser = RequestParser::with_config(config);

        let result = parser.feed("POST / HTTP/1.1\r\nContent-Length: 9\r\n\r\n");
        assert!(matches!(result, Err(ParseError::TooLargeBody { length: 9, max_size: 8 })));
        assert!(parser.is_idle());

        parser.feed("POST / HTTP/1.1\r\nContent-Length: 8\r\n\r\n12345678").unwrap();
        assert_eq!(parser.take_completed().unwrap().body().len(), 8);
    }

    #[test]
    fn too_many_headers() {
        let config = ParserConfig { max_headers: 2, ..ParserConfig::default() };
        let mut parser = RequestParser::with_config(config);
        let result = parser.feed("GET / HTTP/1.1\r\nA: 1\r\nB: 2\r\nC: 3\r\n\r\n");
        assert!(matches!(result, Err(ParseError::TooManyHeaders { max_num: 2 })));
    }

    #[test]
    fn too_large_header_section() {
        let config = ParserConfig { max_header_bytes: 32, ..ParserConfig::default() };
        let mut parser = RequestParser::with_config(config);
        let result = parser.feed("GET / HTTP/1.1\r\nX-Long: aaaaaaaaaaaaaaaaaaaaaaaaaaaa\r\n\r\n");
        assert!(matches!(result, Err(ParseError::TooLargeHeader { max_size: 32, .. })));
    }

    #[test]
    fn unterminated_line_over_the_limit_fails_early() {
        let config = ParserConfig { max_header_bytes: 16, ..ParserConfig::default() };
        let mut parser = RequestParser::with_config(config);
        let result = parser.feed("GET /aaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        assert!(matches!(result, Err(ParseError::TooLargeHeader { .. })));
    }

    #[test]
    fn body_bytes_do_not_count_against_header_limit() {
        let config = ParserConfig { max_header_bytes: 64, ..ParserConfig::default() };
        let mut parser = RequestParser::with_config(config);
        let body = "x".repeat(1024);
        parser.feed(format!("POST / HTTP/1.1\r\nContent-Length: 1024\r\n\r\n{body}")).unwrap();
        parser.feed(format!("POST / HTTP/1.1\r\nContent-Length: 1024\r\n\r\n{body}")).unwrap();
        assert!(parser.take_completed().is_some());
        assert!(parser.take_completed().is_some());
    }

    #[test]
    fn parses_responses() {
        let text = crlf(indoc! {"
            HTTP/1.1 201 Created
            Location: /users/7
            Content-Length: 2

        "}) + "{}" + "HTTP/1.1 204 No Content\r\n\r\n";

        let mut parser = ResponseParser::new();
        parser.feed(text).unwrap();

        let created: Response = parser.take_completed().unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);
        assert_eq!(created.reason(), "Created");
        assert_eq!(created.header("location"), Some("/users/7"));
        assert_eq!(created.body().as_str(), Some("{}"));

        let empty = parser.take_completed().unwrap();
        assert_eq!(empty.status(), StatusCode::NO_CONTENT);
        assert!(empty.headers().is_empty());
    }

    #[test]
    fn response_without_reason_is_rejected() {
        let mut parser = ResponseParser::new();
        let result = parser.feed("HTTP/1.1 200\r\n\r\n");
        assert!(matches!(result, Err(ParseError::MalformedStartLine { .. })));
    }

    #[test]
    fn decoder_yields_each_message() {
        let mut parser = RequestParser::new();
        let mut buf = BytesMut::from("GET /a HTTP/1.1\r\nHost: h\r\n\r\nGET /b HTTP/1.1\r\nHost: h\r\n\r\n");

        assert_eq!(parser.decode(&mut buf).unwrap().unwrap().target(), "/a");
        assert!(buf.is_empty());
        assert_eq!(parser.decode(&mut buf).unwrap().unwrap().target(), "/b");
        assert!(parser.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn decoder_yields_completed_messages_before_the_error() {
        let mut parser = RequestParser::new();
        let mut buf = BytesMut::from("GET /a HTTP/1.1\r\nHost: h\r\n\r\nBREW /pot HTTP/1.1\r\nHost: h\r\n\r\n");

        assert_eq!(parser.decode(&mut buf).unwrap().unwrap().target(), "/a");

        buf.extend_from_slice(b"GET /ignored HTTP/1.1\r\nHost: h\r\n\r\n");
        assert!(matches!(parser.decode(&mut buf), Err(ParseError::InvalidMethod(method)) if method == "BREW"));
        assert!(buf.is_empty());

        assert!(parser.decode(&mut buf).unwrap().is_none());
        assert!(parser.is_idle());
    }

    #[test]
    fn decode_eof_mid_message_is_an_error() {
        let mut parser = RequestParser::new();
        let mut buf = BytesMut::from("GET / HTTP/1.1\r\nHost");
        assert!(parser.decode(&mut buf).unwrap().is_none());

        let result = parser.decode_eof(&mut buf);
        assert!(matches!(result, Err(ParseError::Io { source }) if source.kind() == ErrorKind::UnexpectedEof));
        assert!(parser.is_idle());
    }

    #[test]
    fn decode_eof_when_idle() {
        let mut parser = RequestParser::new();
        let mut buf = BytesMut::new();
        assert!(parser.decode_eof(&mut buf).unwrap().is_none());
    }
}
