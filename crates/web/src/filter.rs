//! Request and response filters.
//!
//! The server passes every request through its [`RequestFilter`]s before routing, and every
//! response, including error responses, through its [`ResponseFilter`]s before writing it.
//! Filters run in registration order; a filter answering [`Filtered::Stop`] ends the chain
//! early and its value is used as is.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use strand_http::protocol::{Header, Request, Response};
use tracing::debug;

/// A filter's result, and whether the rest of the chain still runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filtered<T> {
    Continue(T),
    Stop(T),
}

impl<T> Filtered<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Continue(value) | Self::Stop(value) => value,
        }
    }
}

pub trait RequestFilter: Send + Sync {
    fn filter(&self, request: Request) -> Filtered<Request>;

    /// Called once when the owning [`Filters`] is stopped.
    fn stop(&self) {}
}

pub trait ResponseFilter: Send + Sync {
    fn filter(&self, request: &Request, response: Response) -> Filtered<Response>;

    /// Called once when the owning [`Filters`] is stopped.
    fn stop(&self) {}
}

/// The request and response filter chains of a server.
#[derive(Default)]
pub struct Filters {
    request_filters: Vec<Box<dyn RequestFilter>>,
    response_filters: Vec<Box<dyn ResponseFilter>>,
    stopped: AtomicBool,
}

impl Filters {
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_request_filter<F: RequestFilter + 'static>(mut self, filter: F) -> Self {
        self.request_filters.push(Box::new(filter));
        self
    }

    #[must_use]
    pub fn with_response_filter<F: ResponseFilter + 'static>(mut self, filter: F) -> Self {
        self.response_filters.push(Box::new(filter));
        self
    }

    /// Runs the request chain. Once stopped, requests pass through untouched.
    pub fn process_request(&self, request: Request) -> Request {
        if self.is_stopped() {
            return request;
        }

        let mut current = request;
        for filter in &self.request_filters {
            match filter.filter(current) {
                Filtered::Continue(next) => current = next,
                Filtered::Stop(last) => {
                    debug!(path = last.path(), "request filter chain stopped early");
                    return last;
                }
            }
        }
        current
    }

    /// Runs the response chain for the response to `request`. Once stopped, responses pass
    /// through untouched.
    pub fn process_response(&self, request: &Request, response: Response) -> Response {
        if self.is_stopped() {
            return response;
        }

        let mut current = response;
        for filter in &self.response_filters {
            match filter.filter(request, current) {
                Filtered::Continue(next) => current = next,
                Filtered::Stop(last) => {
                    debug!(path = request.path(), "response filter chain stopped early");
                    return last;
                }
            }
        }
        current
    }

    /// Stops every filter once. Later calls do nothing.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        for filter in &self.request_filters {
            filter.stop();
        }
        for filter in &self.response_filters {
            filter.stop();
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

impl fmt::Debug for Filters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filters")
            .field("request_filters", &self.request_filters.len())
            .field("response_filters", &self.response_filters.len())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

/// Adds CORS headers to responses whose request carries a registered `Origin`.
#[derive(Debug, Clone, Default)]
pub struct CorsResponseFilter {
    origin_headers: Vec<(String, Vec<Header>)>,
}

impl CorsResponseFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the headers answered to requests with `Origin: origin`, replacing any
    /// headers registered before for the same origin.
    #[must_use]
    pub fn origin_headers_for<I, N, V>(mut self, origin: impl Into<String>, headers: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        let origin = origin.into();
        let headers: Vec<Header> = headers.into_iter().map(|(name, value)| Header::new(name, value)).collect();

        match self.origin_headers.iter_mut().find(|(existing, _)| *existing == origin) {
            Some((_, existing)) => *existing = headers,
            None => self.origin_headers.push((origin, headers)),
        }
        self
    }
}

impl ResponseFilter for CorsResponseFilter {
    fn filter(&self, request: &Request, response: Response) -> Filtered<Response> {
        let Some(origin) = request.header("origin") else {
            return Filtered::Continue(response);
        };
        let Some((_, headers)) = self.origin_headers.iter().find(|(registered, _)| registered == origin) else {
            return Filtered::Continue(response);
        };

        let response = headers.iter().fold(response, |response, header| response.with_header(header.name(), header.value()));
        Filtered::Continue(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, StatusCode};
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct Counter {
        count: AtomicUsize,
        stop_on_first: bool,
        stopped: AtomicBool,
    }

    impl Counter {
        fn stopping_on_first() -> Self {
            Self { stop_on_first: true, ..Self::default() }
        }

        fn next(&self) -> bool {
            let previous = self.count.fetch_add(1, Ordering::SeqCst);
            !(self.stop_on_first && previous == 0)
        }

        fn count(&self) -> usize {
            self.count.load(Ordering::SeqCst)
        }

        fn stopped(&self) -> bool {
            self.stopped.load(Ordering::SeqCst)
        }
    }

    struct Counting(Arc<Counter>);

    impl RequestFilter for Counting {
        fn filter(&self, request: Request) -> Filtered<Request> {
            if self.0.next() { Filtered::Continue(request) } else { Filtered::Stop(request) }
        }

        fn stop(&self) {
            self.0.stopped.store(true, Ordering::SeqCst);
        }
    }

    impl ResponseFilter for Counting {
        fn filter(&self, _request: &Request, response: Response) -> Filtered<Response> {
            if self.0.next() { Filtered::Continue(response) } else { Filtered::Stop(response) }
        }

        fn stop(&self) {
            self.0.stopped.store(true, Ordering::SeqCst);
        }
    }

    fn counters() -> [Arc<Counter>; 3] {
        [Arc::new(Counter::stopping_on_first()), Arc::new(Counter::default()), Arc::new(Counter::default())]
    }

    #[test]
    fn request_chain_runs_in_order_and_stops_early() {
        let counters = counters();
        let filters = counters
            .iter()
            .fold(Filters::none(), |filters, counter| filters.with_request_filter(Counting(Arc::clone(counter))));

        let original = Request::new(Method::GET, "/");
        let mut request = original.clone();
        for _ in 0..5 {
            request = filters.process_request(request);
        }

        assert_eq!(request, original);
        assert_eq!(counters.iter().map(|c| c.count()).collect::<Vec<_>>(), vec![5, 4, 4]);

        filters.stop();
        assert!(counters.iter().all(|c| c.stopped()));

        filters.process_request(Request::new(Method::GET, "/"));
        assert_eq!(counters[0].count(), 5);
    }

    #[test]
    fn response_chain_runs_in_order_and_stops_early() {
        let counters = counters();
        let filters = counters
            .iter()
            .fold(Filters::none(), |filters, counter| filters.with_response_filter(Counting(Arc::clone(counter))));

        let request = Request::new(Method::GET, "/");
        let original = Response::new(StatusCode::OK);
        let mut response = original.clone();
        for _ in 0..5 {
            response = filters.process_response(&request, response);
        }

        assert_eq!(response, original);
        assert_eq!(counters.iter().map(|c| c.count()).collect::<Vec<_>>(), vec![5, 4, 4]);

        filters.stop();
        filters.stop();
        assert!(counters.iter().all(|c| c.stopped()));
        assert!(filters.is_stopped());
    }

    fn cors() -> CorsResponseFilter {
        CorsResponseFilter::new()
            .origin_headers_for(
                "hello.world",
                [
                    ("Access-Control-Allow-Origin", "hello.world"),
                    ("Access-Control-Allow-Headers", "X-Requested-With, Content-Type, Content-Length"),
                    ("Access-Control-Allow-Methods", "POST,GET"),
                ],
            )
            .origin_headers_for(
                "hello.cors",
                [
                    ("Access-Control-Allow-Origin", "hello.cors"),
                    ("Access-Control-Allow-Headers", "Content-Type, Content-Length"),
                    ("Access-Control-Allow-Methods", "POST,GET,PUT"),
                ],
            )
    }

    fn filter_for_origin(filter: &CorsResponseFilter, origin: Option<&str>) -> Filtered<Response> {
        let request = match origin {
            Some(origin) => Request::new(Method::GET, "/").with_header("Origin", origin),
            None => Request::new(Method::GET, "/"),
        };
        filter.filter(&request, Response::new(StatusCode::OK).with_header("Content-Length", "0"))
    }

    #[test]
    fn cors_headers_for_registered_origins() {
        let filter = cors();

        let Filtered::Continue(response) = filter_for_origin(&filter, Some("hello.world")) else {
            panic!("cors filter must continue the chain");
        };
        assert_eq!(response.header("access-control-allow-origin"), Some("hello.world"));
        assert_eq!(response.header("access-control-allow-methods"), Some("POST,GET"));

        let response = filter_for_origin(&filter, Some("hello.cors")).into_inner();
        assert_eq!(response.header("access-control-allow-origin"), Some("hello.cors"));
        assert_eq!(response.header("access-control-allow-headers"), Some("Content-Type, Content-Length"));
        assert_eq!(response.header("access-control-allow-methods"), Some("POST,GET,PUT"));
    }

    #[test]
    fn cors_leaves_other_origins_alone() {
        let filter = cors();

        let unknown = filter_for_origin(&filter, Some("*")).into_inner();
        assert!(unknown.header("access-control-allow-origin").is_none());
        assert_eq!(unknown.headers().len(), 1);

        let missing = filter_for_origin(&filter, None).into_inner();
        assert!(missing.header("access-control-allow-origin").is_none());
    }

    #[test]
    fn cors_any_origin_and_replacement() {
        let filter = CorsResponseFilter::new()
            .origin_headers_for("*", [("Access-Control-Allow-Origin", "old")])
            .origin_headers_for("*", [("Access-Control-Allow-Origin", "*")]);

        let response = filter_for_origin(&filter, Some("*")).into_inner();
        assert_eq!(response.headers().get_all("access-control-allow-origin").collect::<Vec<_>>(), vec!["*"]);
    }
}
