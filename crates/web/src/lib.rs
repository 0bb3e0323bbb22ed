//! Action routing on top of `strand-http`
//!
//! Routes are declared as actions: an HTTP method, a URI template such as
//! `/users/{id}/orders/{orderId}`, the types its parameters bind to, and the handler that
//! serves it. Templates are compiled once while the router is built.
//!
//! # Features
//!
//! - URI templates with named parameters, validated at startup
//! - First-match routing in registration order
//! - Typed, percent-decoded path parameters
//! - Query string access with optional `serde` deserialization
//! - `Accept` header content negotiation
//! - Request and response filters, including CORS headers per origin
//! - A tokio TCP server mapping routing and handler failures to status codes
//!
//! # Example
//!
//! ```no_run
//! use http::StatusCode;
//! use strand_http::protocol::{Request, Response};
//! use strand_web::handler::{handler_fn, HandlerError};
//! use strand_web::media::{ContentMediaType, ResponseMediaTypeSelector};
//! use strand_web::param::{ParamType, Params};
//! use strand_web::router::{Action, Router};
//! use strand_web::server::Server;
//!
//! async fn user(request: Request, params: Params) -> Result<Response, HandlerError> {
//!     let id = params.get::<i64>("id").unwrap_or_default();
//!     let media_type = ResponseMediaTypeSelector::for_request(&request)
//!         .select(&[ContentMediaType::json(), ContentMediaType::plain_text()])?;
//!
//!     let body = if media_type == ContentMediaType::json() { format!(r#"{{"id":{id}}}"#) } else { format!("user {id}") };
//!     Ok(Response::new(StatusCode::OK).with_header("Content-Type", media_type.to_string()).with_body(body))
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let router = Router::builder()
//!         .route(Action::get("/users/{id}").param(ParamType::Long).to(handler_fn(user)))
//!         .build()?;
//!
//!     Server::builder().router(router).bind("127.0.0.1:8080").build()?.start().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`template`]: URI template compiler
//! - [`router`]: Actions, route matching and dispatch
//! - [`param`]: Parameter types and binding
//! - [`query`]: Query string parameters
//! - [`media`]: Content negotiation
//! - [`handler`]: The handler trait actions are served by
//! - [`filter`]: Request and response filter chains
//! - [`server`]: TCP server

pub mod filter;
pub mod handler;
pub mod media;
pub mod param;
pub mod query;
pub mod router;
pub mod server;
pub mod template;

pub use handler::{FnHandler, RequestHandler, handler_fn};
pub use router::{Action, Router};
pub use server::Server;
