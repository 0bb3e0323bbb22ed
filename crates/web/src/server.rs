use std::convert::Infallible;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use http::StatusCode;
use strand_http::codec::ParserConfig;
use strand_http::connection::{DEFAULT_STALL_TIMEOUT, HttpConnection};
use strand_http::handler::Handler;
use strand_http::protocol::{Request, Response};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::filter::{Filters, RequestFilter, ResponseFilter};
use crate::media::MediaTypeNotSupported;
use crate::router::{RouteError, Router};

#[derive(Debug)]
pub struct ServerBuilder {
    router: Option<Router>,
    address: Option<io::Result<Vec<SocketAddr>>>,
    stall_timeout: Duration,
    parser_config: ParserConfig,
    log_level: Level,
    filters: Filters,
}

impl ServerBuilder {
    fn new() -> Self {
        Self {
            router: None,
            address: None,
            stall_timeout: DEFAULT_STALL_TIMEOUT,
            parser_config: ParserConfig::default(),
            log_level: Level::INFO,
            filters: Filters::none(),
        }
    }

    pub fn bind<A: ToSocketAddrs>(mut self, address: A) -> Self {
        self.address = Some(address.to_socket_addrs().map(Iterator::collect));
        self
    }

    pub fn router(mut self, router: Router) -> Self {
        self.router = Some(router);
        self
    }

    pub fn stall_timeout(mut self, stall_timeout: Duration) -> Self {
        self.stall_timeout = stall_timeout;
        self
    }

    pub fn parser_config(mut self, parser_config: ParserConfig) -> Self {
        self.parser_config = parser_config;
        self
    }

    pub fn log_level(mut self, log_level: Level) -> Self {
        self.log_level = log_level;
        self
    }

    /// Appends a filter run on every request before it is routed.
    pub fn request_filter<F: RequestFilter + 'static>(mut self, filter: F) -> Self {
        self.filters = self.filters.with_request_filter(filter);
        self
    }

    /// Appends a filter run on every response, error responses included.
    pub fn response_filter<F: ResponseFilter + 'static>(mut self, filter: F) -> Self {
        self.filters = self.filters.with_response_filter(filter);
        self
    }

    pub fn build(self) -> Result<Server, ServerBuildError> {
        let router = self.router.ok_or(ServerBuildError::MissingRouter)?;
        let address = self.address.ok_or(ServerBuildError::MissingAddress)??;
        if address.is_empty() {
            return Err(ServerBuildError::MissingAddress);
        }

        Ok(Server {
            router,
            address,
            stall_timeout: self.stall_timeout,
            parser_config: self.parser_config,
            log_level: self.log_level,
            filters: self.filters,
        })
    }
}

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("router must be set")]
    MissingRouter,
    #[error("address must be set")]
    MissingAddress,
    #[error("address can't be resolved: {source}")]
    InvalidAddress {
        #[from]
        source: io::Error,
    },
}

/// Serves a [`Router`] over TCP.
#[derive(Debug)]
pub struct Server {
    router: Router,
    address: Vec<SocketAddr>,
    stall_timeout: Duration,
    parser_config: ParserConfig,
    log_level: Level,
    filters: Filters,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    /// Installs a fmt subscriber unless one is already set, binds the configured address and
    /// serves connections until the listener fails.
    pub async fn start(self) -> io::Result<()> {
        let subscriber = FmtSubscriber::builder().with_max_level(self.log_level).finish();
        if tracing::subscriber::set_global_default(subscriber).is_err() {
            debug!("global subscriber already set, keep it");
        }

        info!("start listening at {:?}", self.address);
        let tcp_listener = match TcpListener::bind(self.address.as_slice()).await {
            Ok(tcp_listener) => tcp_listener,
            Err(e) => {
                error!(cause = %e, "bind server error");
                return Err(e);
            }
        };

        self.serve(tcp_listener).await;
        Ok(())
    }

    /// Accepts connections from `tcp_listener`, one task per connection.
    pub async fn serve(self, tcp_listener: TcpListener) {
        let stall_timeout = self.stall_timeout;
        let parser_config = self.parser_config;
        let handler = Arc::new(self);

        loop {
            let (tcp_stream, remote_addr) = match tcp_listener.accept().await {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };

            let handler = Arc::clone(&handler);

            tokio::spawn(async move {
                let (reader, writer) = tcp_stream.into_split();
                let connection = HttpConnection::with_config(reader, writer, parser_config, stall_timeout);
                match connection.process(handler).await {
                    Ok(_) => {
                        info!(%remote_addr, "finished process, connection shutdown");
                    }
                    Err(e) => {
                        error!(%remote_addr, "service has error, cause {}, connection shutdown", e);
                    }
                }
            });
        }
    }
}

#[async_trait]
impl Handler for Server {
    type Error = Infallible;

    async fn call(&self, request: Request) -> Result<Response, Self::Error> {
        let request = self.filters.process_request(request);
        let response = self.route(request.clone()).await;
        Ok(self.filters.process_response(&request, response))
    }
}

impl Server {
    async fn route(&self, request: Request) -> Response {
        let dispatch = match self.router.dispatch(&request) {
            Ok(dispatch) => dispatch,
            Err(e @ RouteError::NotFound { .. }) => {
                debug!(cause = %e, "no action");
                return error_response(StatusCode::NOT_FOUND, &e);
            }
            Err(e @ RouteError::Bind(_)) => {
                warn!(cause = %e, "can't bind path parameters");
                return error_response(StatusCode::BAD_REQUEST, &e);
            }
        };

        match dispatch.invoke(request).await {
            Ok(response) => response,
            Err(e) => match e.downcast_ref::<MediaTypeNotSupported>() {
                Some(not_supported) => error_response(StatusCode::NOT_ACCEPTABLE, not_supported),
                None => {
                    error!(cause = %e, "handler failed");
                    error_response(StatusCode::INTERNAL_SERVER_ERROR, &e)
                }
            },
        }
    }
}

fn error_response(status: StatusCode, cause: &dyn std::fmt::Display) -> Response {
    Response::new(status).with_header("Content-Type", "text/plain; charset=utf-8").with_body(cause.to_string())
}
