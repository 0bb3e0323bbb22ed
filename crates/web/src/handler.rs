//! The handler seam of the router.
//!
//! Every action, whatever its arity, is served by one [`RequestHandler`] that receives the
//! request together with its bound [`Params`] in template order.

use std::error::Error;
use std::future::Future;

use async_trait::async_trait;
use strand_http::protocol::{Request, Response};

use crate::param::Params;

pub type HandlerError = Box<dyn Error + Send + Sync>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn invoke(&self, request: Request, params: Params) -> Result<Response, HandlerError>;
}

/// Adapts an async closure into a [`RequestHandler`].
#[derive(Debug)]
pub struct FnHandler<F> {
    f: F,
}

pub fn handler_fn<F, Fut, E>(f: F) -> FnHandler<F>
where
    F: Fn(Request, Params) -> Fut,
    Fut: Future<Output = Result<Response, E>>,
    E: Into<HandlerError>,
{
    FnHandler { f }
}

#[async_trait]
impl<F, Fut, E> RequestHandler for FnHandler<F>
where
    F: Fn(Request, Params) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response, E>> + Send,
    E: Into<HandlerError>,
{
    async fn invoke(&self, request: Request, params: Params) -> Result<Response, HandlerError> {
        (self.f)(request, params).await.map_err(Into::into)
    }
}
