use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use http::StatusCode;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::timeout;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, error, info, warn};

use crate::codec::{MessageEncoder, ParserConfig, RequestParser};
use crate::handler::Handler;
use crate::protocol::{HttpError, ParseError, Response};

/// How long a client may stay silent in the middle of a request before it is answered
/// with `408 Request Timeout`
pub const DEFAULT_STALL_TIMEOUT: Duration = Duration::from_secs(5);

/// An HTTP connection that reads requests, dispatches them to a [`Handler`] and writes
/// the responses back in order.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
#[derive(Debug)]
pub struct HttpConnection<R, W> {
    framed_read: FramedRead<R, RequestParser>,
    framed_write: FramedWrite<W, MessageEncoder>,
    stall_timeout: Duration,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_config(reader, writer, ParserConfig::default(), DEFAULT_STALL_TIMEOUT)
    }

    pub fn with_config(reader: R, writer: W, config: ParserConfig, stall_timeout: Duration) -> Self {
        Self {
            framed_read: FramedRead::with_capacity(reader, RequestParser::with_config(config), 8 * 1024),
            framed_write: FramedWrite::new(writer, MessageEncoder),
            stall_timeout,
        }
    }

    /// Serves requests until the peer closes the stream, asks to close, stalls, or sends
    /// something unparsable.
    pub async fn process<H>(mut self, handler: Arc<H>) -> Result<(), HttpError>
    where
        H: Handler,
    {
        loop {
            let next = match timeout(self.stall_timeout, self.framed_read.next()).await {
                Ok(next) => next,
                Err(_elapsed) => {
                    if self.framed_read.decoder().has_stalled(self.stall_timeout) {
                        warn!(timeout = ?self.stall_timeout, "client stalled in the middle of a request");
                        self.do_send_response(&error_response(StatusCode::REQUEST_TIMEOUT)).await?;
                        return Err(ParseError::stalled(self.stall_timeout).into());
                    }
                    continue;
                }
            };

            match next {
                Some(Ok(request)) => {
                    debug!(method = %request.method(), target = request.target(), "received request");
                    let keep_alive = request.is_keep_alive();
                    let response_result = handler.call(request).await;
                    self.send_response(response_result).await?;
                    if !keep_alive {
                        info!("client asked to close, connection shutdown");
                        return Ok(());
                    }
                }

                Some(Err(e)) => {
                    error!("can't receive next request, cause {}", e);
                    self.do_send_response(&error_response(parse_error_status(&e))).await?;
                    return Err(e.into());
                }

                None => {
                    info!("cant read more request, break this connection down");
                    return Ok(());
                }
            }
        }
    }

    async fn send_response<E>(&mut self, response_result: Result<Response, E>) -> Result<(), HttpError>
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        match response_result {
            Ok(response) => self.do_send_response(&response).await,
            Err(e) => {
                let cause: Box<dyn Error + Send + Sync> = e.into();
                error!("handle response error, cause: {}", cause);
                self.do_send_response(&error_response(StatusCode::INTERNAL_SERVER_ERROR)).await
            }
        }
    }

    async fn do_send_response(&mut self, response: &Response) -> Result<(), HttpError> {
        self.framed_write.send(response).await?;
        Ok(())
    }
}

fn parse_error_status(e: &ParseError) -> StatusCode {
    match e {
        ParseError::TooLargeBody { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        _ => StatusCode::BAD_REQUEST,
    }
}

fn error_response(status: StatusCode) -> Response {
    Response::new(status).with_header("Content-Length", "0")
}
