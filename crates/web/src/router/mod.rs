//! Action routing.
//!
//! An [`Action`] pairs a method and a compiled [`UriTemplate`] with the handler that serves
//! it. The [`Router`] tries actions in registration order; the first whose method matches
//! and whose template structurally matches the path wins, with no reordering by
//! specificity.
//!
//! # Matching
//!
//! Literal segments are searched for from the current path position; a template that starts
//! with a literal must match at the start of the path. A parameter captures everything up
//! to the next literal, or to the end of the path when it is last. The whole path must be
//! consumed, and empty parameter values never match.
//!
//! Parameter values are percent-decoded before they are checked. Each action carries a
//! slash policy, on by default: when slashes are disallowed, any decoded parameter value
//! containing `/`, including one written as `%2F`, fails the match. When they are allowed, one extra
//! trailing `/` on the path is tolerated and is not part of a final parameter's value.
//!
//! # Example
//!
//! ```
//! use http::{Method, StatusCode};
//! use strand_http::protocol::{Request, Response};
//! use strand_web::handler::{handler_fn, HandlerError};
//! use strand_web::param::{ParamType, Params};
//! use strand_web::router::{Action, Router};
//!
//! let router = Router::builder()
//!     .route(Action::get("/users/{id}").param(ParamType::Long).to(handler_fn(
//!         |_request: Request, params: Params| async move {
//!             let id = params.get::<i64>("id").unwrap_or_default();
//!             Ok::<_, HandlerError>(Response::new(StatusCode::OK).with_body(id.to_string()))
//!         },
//!     )))
//!     .build()
//!     .unwrap();
//!
//! let request = Request::new(Method::GET, "/users/42?verbose=true");
//! let dispatch = router.dispatch(&request).unwrap();
//! assert_eq!(dispatch.params().get::<i64>("id"), Some(42));
//! ```

use std::borrow::Cow;
use std::fmt;

use http::Method;
use strand_http::protocol::{Request, Response};
use thiserror::Error;
use tracing::{debug, trace};

use crate::handler::{HandlerError, RequestHandler};
use crate::param::{BindError, Param, ParamType, Params, bind, percent_decode};
use crate::template::{Segment, TemplateError, UriTemplate};

#[derive(Error, Debug)]
pub enum RouteError {
    #[error("no action matches {method} {path}")]
    NotFound { method: Method, path: String },

    #[error(transparent)]
    Bind(#[from] BindError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("template {template:?} has {parameters} parameters but {declared} types were declared")]
    ParameterTypes { template: String, parameters: usize, declared: usize },
}

/// A registered route: method, template, declared parameter types and handler.
pub struct Action {
    id: usize,
    method: Method,
    template: UriTemplate,
    param_types: Vec<ParamType>,
    disallow_slash_in_path_parameter: bool,
    handler: Box<dyn RequestHandler>,
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("id", &self.id)
            .field("method", &self.method)
            .field("template", &self.template.as_str())
            .field("param_types", &self.param_types)
            .field("disallow_slash_in_path_parameter", &self.disallow_slash_in_path_parameter)
            .finish_non_exhaustive()
    }
}

macro_rules! action_method {
    ($name:ident, $method:ident) => {
        pub fn $name(template: impl Into<String>) -> ActionBuilder {
            ActionBuilder::new(Method::$method, template)
        }
    };
}

impl Action {
    action_method!(get, GET);
    action_method!(post, POST);
    action_method!(put, PUT);
    action_method!(delete, DELETE);
    action_method!(patch, PATCH);
    action_method!(head, HEAD);
    action_method!(options, OPTIONS);
    action_method!(trace, TRACE);
    action_method!(connect, CONNECT);

    pub fn builder(method: Method, template: impl Into<String>) -> ActionBuilder {
        ActionBuilder::new(method, template)
    }

    /// Position of this action in registration order.
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn template(&self) -> &UriTemplate {
        &self.template
    }

    /// One type per template parameter; undeclared trailing parameters are [`ParamType::Text`].
    pub fn param_types(&self) -> &[ParamType] {
        &self.param_types
    }

    pub fn disallows_slash_in_path_parameter(&self) -> bool {
        self.disallow_slash_in_path_parameter
    }

    pub fn handler(&self) -> &dyn RequestHandler {
        self.handler.as_ref()
    }

    /// Decoded parameter values when `method` and `path` match this action.
    pub fn match_with<'p>(&self, method: &Method, path: &'p str) -> Option<Vec<Cow<'p, str>>> {
        if self.method != method {
            return None;
        }
        self.match_path(path)
    }

    fn match_path<'p>(&self, path: &'p str) -> Option<Vec<Cow<'p, str>>> {
        let allow_slash = !self.disallow_slash_in_path_parameter;
        let segments = self.template.segments();

        let mut values = Vec::with_capacity(self.param_types.len());
        let mut cursor = 0;
        let mut index = 0;

        while let Some(segment) = segments.get(index) {
            match segment {
                Segment::Literal(text) => {
                    let found = cursor + path[cursor..].find(text.as_str())?;
                    if index == 0 && found != 0 {
                        return None;
                    }
                    cursor = found + text.len();
                    index += 1;
                }
                Segment::Parameter(_) => {
                    let start = cursor;
                    if let Some(Segment::Literal(next)) = segments.get(index + 1) {
                        let found = start + path[start..].find(next.as_str())?;
                        values.push(&path[start..found]);
                        cursor = found + next.len();
                        index += 2;
                    } else {
                        let mut end = path.len();
                        if allow_slash && path[start..].ends_with('/') {
                            end -= 1;
                        }
                        values.push(&path[start..end]);
                        cursor = path.len();
                        index += 1;
                    }
                }
            }
        }

        let tolerated_slash = allow_slash && cursor + 1 == path.len() && path.ends_with('/');
        if cursor != path.len() && !tolerated_slash {
            return None;
        }
        if values.iter().any(|value| value.is_empty()) {
            return None;
        }

        let values: Vec<_> = values.into_iter().map(percent_decode).collect();
        if !allow_slash && values.iter().any(|value| value.contains('/')) {
            return None;
        }
        Some(values)
    }
}

#[derive(Debug)]
pub struct ActionBuilder {
    method: Method,
    template: String,
    param_types: Vec<ParamType>,
    disallow_slash_in_path_parameter: bool,
}

impl ActionBuilder {
    fn new(method: Method, template: impl Into<String>) -> Self {
        Self { method, template: template.into(), param_types: Vec::new(), disallow_slash_in_path_parameter: true }
    }

    /// Declares the type of the next template parameter.
    #[must_use]
    pub fn param(mut self, param_type: ParamType) -> Self {
        self.param_types.push(param_type);
        self
    }

    #[must_use]
    pub fn disallow_slash_in_path_parameter(mut self, disallow: bool) -> Self {
        self.disallow_slash_in_path_parameter = disallow;
        self
    }

    pub fn to<H: RequestHandler + 'static>(self, handler: H) -> RouteItem {
        RouteItem { action: self, handler: Box::new(handler) }
    }
}

/// An action waiting to be compiled by [`RouterBuilder::build`].
pub struct RouteItem {
    action: ActionBuilder,
    handler: Box<dyn RequestHandler>,
}

impl fmt::Debug for RouteItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteItem").field("action", &self.action).finish_non_exhaustive()
    }
}

impl RouteItem {
    fn build(self, id: usize) -> Result<Action, BuildError> {
        let RouteItem { action, handler } = self;
        let template = UriTemplate::compile(&action.template)?;

        let parameters = template.parameter_count();
        let mut param_types = action.param_types;
        if param_types.len() > parameters {
            return Err(BuildError::ParameterTypes { template: action.template, parameters, declared: param_types.len() });
        }
        param_types.resize(parameters, ParamType::Text);

        Ok(Action {
            id,
            method: action.method,
            template,
            param_types,
            disallow_slash_in_path_parameter: action.disallow_slash_in_path_parameter,
            handler,
        })
    }
}

/// One matched parameter value, percent-decoded but not yet converted to its type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawParam<'router, 'req> {
    pub name: &'router str,
    pub value: Cow<'req, str>,
}

#[derive(Debug)]
pub enum MatchResult<'router, 'req> {
    Unmatched,
    Matched { action: &'router Action, parameters: Vec<RawParam<'router, 'req>> },
}

impl MatchResult<'_, '_> {
    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }
}

/// A matched action with its parameters bound to their declared types.
#[derive(Debug)]
pub struct Dispatch<'router> {
    action: &'router Action,
    params: Params,
}

impl<'router> Dispatch<'router> {
    pub fn action(&self) -> &'router Action {
        self.action
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub async fn invoke(self, request: Request) -> Result<Response, HandlerError> {
        self.action.handler.invoke(request, self.params).await
    }
}

/// Immutable route table, built once at startup.
#[derive(Debug)]
pub struct Router {
    actions: Vec<Action>,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Finds the first action matching `method` and `path`. A query string on `path` is ignored.
    pub fn match_route<'router, 'req>(&'router self, method: &Method, path: &'req str) -> MatchResult<'router, 'req> {
        let path = path.split_once('?').map_or(path, |(path, _)| path);

        for action in &self.actions {
            if let Some(values) = action.match_with(method, path) {
                debug!(action = action.id, template = %action.template, %method, path, "matched action");
                let parameters = action
                    .template
                    .parameter_names()
                    .zip(values)
                    .map(|(name, value)| RawParam { name, value })
                    .collect();
                return MatchResult::Matched { action, parameters };
            }
        }

        trace!(%method, path, "no action matched");
        MatchResult::Unmatched
    }

    /// Matches `request` and binds its raw parameters to the action's declared types.
    pub fn dispatch(&self, request: &Request) -> Result<Dispatch<'_>, RouteError> {
        match self.match_route(request.method(), request.path()) {
            MatchResult::Matched { action, parameters } => {
                let params = parameters
                    .iter()
                    .zip(&action.param_types)
                    .map(|(raw, param_type)| bind(raw.name, &raw.value, *param_type).map(|value| Param::new(raw.name, value)))
                    .collect::<Result<Params, _>>()?;
                Ok(Dispatch { action, params })
            }
            MatchResult::Unmatched => {
                Err(RouteError::NotFound { method: request.method().clone(), path: request.path().to_owned() })
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct RouterBuilder {
    items: Vec<RouteItem>,
}

impl RouterBuilder {
    fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn route(mut self, item: RouteItem) -> Self {
        self.items.push(item);
        self
    }

    /// Compiles every template, keeping registration order.
    ///
    /// # Errors
    ///
    /// The first malformed template, or an action declaring more types than parameters.
    pub fn build(self) -> Result<Router, BuildError> {
        let actions = self.items.into_iter().enumerate().map(|(id, item)| item.build(id)).collect::<Result<Vec<_>, _>>()?;
        Ok(Router { actions })
    }
}
