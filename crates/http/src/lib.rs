//! An incremental HTTP/1.1 engine
//!
//! This crate turns raw, arbitrarily fragmented bytes into complete HTTP/1.1 requests and
//! responses, writes messages back out, and drives client connections on top of tokio.
//!
//! # Features
//!
//! - Fragment-independent parsing: the same bytes split anywhere parse to the same messages
//! - Pipelined messages completed and delivered in arrival order
//! - `Content-Length` delimited bodies
//! - Stall detection for peers that stop sending mid-message
//! - Configurable header section limits
//! - Keep-alive connections
//!
//! # Example
//!
//! ```no_run
//! use http::StatusCode;
//! use std::convert::Infallible;
//! use std::sync::Arc;
//! use strand_http::connection::HttpConnection;
//! use strand_http::handler::make_handler;
//! use strand_http::protocol::{Request, Response};
//! use tokio::net::TcpListener;
//! use tracing::{error, info, warn, Level};
//! use tracing_subscriber::FmtSubscriber;
//!
//! #[tokio::main]
//! async fn main() {
//!     let subscriber = FmtSubscriber::builder()
//!         .with_max_level(Level::INFO)
//!         .finish();
//!     tracing::subscriber::set_global_default(subscriber)
//!         .expect("setting default subscriber failed");
//!
//!     info!(port = 8080, "start listening");
//!     let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
//!         Ok(tcp_listener) => tcp_listener,
//!         Err(e) => {
//!             error!(cause = %e, "bind server error");
//!             return;
//!         }
//!     };
//!
//!     let handler = Arc::new(make_handler(hello_world));
//!
//!     loop {
//!         let (tcp_stream, _remote_addr) = match tcp_listener.accept().await {
//!             Ok(stream_and_addr) => stream_and_addr,
//!             Err(e) => {
//!                 warn!(cause = %e, "failed to accept");
//!                 continue;
//!             }
//!         };
//!
//!         let handler = handler.clone();
//!
//!         tokio::spawn(async move {
//!             let (reader, writer) = tcp_stream.into_split();
//!             let connection = HttpConnection::new(reader, writer);
//!             match connection.process(handler).await {
//!                 Ok(_) => info!("finished process, connection shutdown"),
//!                 Err(e) => error!("service has error, cause {}, connection shutdown", e),
//!             }
//!         });
//!     }
//! }
//!
//! async fn hello_world(request: Request) -> Result<Response, Infallible> {
//!     info!(path = request.path(), "request received");
//!     Ok(Response::new(StatusCode::OK).with_body("Hello World!\r\n"))
//! }
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: Message model and error types
//! - [`codec`]: Incremental parser and message encoder
//! - [`connection`]: Connection driver with stall handling
//! - [`handler`]: Request handler trait and utilities
//!
//! # Limitations
//!
//! - HTTP/1.0 and HTTP/1.1 only
//! - Bodies are delimited by `Content-Length`; chunked transfer coding is not understood
//! - No TLS support (use a reverse proxy for HTTPS)
//! - Header section limits default to 8KB and 64 headers, see [`codec::ParserConfig`]

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
