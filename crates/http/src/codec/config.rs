/// Default maximum number of headers in one message
pub const MAX_HEADER_NUM: usize = 64;

/// Default maximum size in bytes of the start line plus header section
pub const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Default maximum `Content-Length` of one message
pub const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// Limits applied by [`MessageParser`](crate::codec::MessageParser) to each message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    pub max_header_bytes: usize,
    pub max_headers: usize,
    /// Largest `Content-Length` accepted; a larger one fails before any body byte is buffered.
    pub max_body_bytes: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self { max_header_bytes: MAX_HEADER_BYTES, max_headers: MAX_HEADER_NUM, max_body_bytes: MAX_BODY_BYTES }
    }
}
