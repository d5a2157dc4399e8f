//! Ordered request routing.
//!
//! A [`RouteTable`] is a list of `(pattern, handler)` pairs checked in
//! order; the first pattern matching the request path handles it. Only `GET`
//! and `HEAD` are routed; other methods get `405 Method Not Allowed`. Patterns
//! are exact paths or regular expressions, so a catch-all (`.*`) placed last
//! picks up everything the specific routes above it do not.
//!
//! The table is mounted into axum as a single fallback service, which leaves
//! axum and hyper responsible for the transport only.

use axum::{
    extract::{Request, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use regex::Regex;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Value of the `Allow` header sent with `405` responses.
pub const ALLOWED_METHODS: &str = "GET, HEAD";

/// Boxed future returned by route handlers.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Something that can answer a routed request.
pub trait RouteHandler: Send + Sync + 'static {
    fn call(&self, request: Request) -> HandlerFuture;
}

impl<F, Fut> RouteHandler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn call(&self, request: Request) -> HandlerFuture {
        Box::pin(self(request))
    }
}

/// Path pattern of one route.
#[derive(Debug, Clone)]
pub enum RoutePattern {
    /// Equal to the request path
    Exact(String),
    /// Regular expression tested against the request path
    Matches(Regex),
}

impl RoutePattern {
    pub fn matches(&self, path: &str) -> bool {
        match self {
            RoutePattern::Exact(exact) => exact == path,
            RoutePattern::Matches(regex) => regex.is_match(path),
        }
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutePattern::Exact(exact) => write!(f, "{}", exact),
            RoutePattern::Matches(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

/// Ordered list of routes. First match wins; no match is a 404.
#[derive(Default, Clone)]
pub struct RouteTable {
    routes: Vec<(RoutePattern, Arc<dyn RouteHandler>)>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route.
    pub fn route(mut self, pattern: RoutePattern, handler: impl RouteHandler) -> Self {
        let handler: Arc<dyn RouteHandler> = Arc::new(handler);
        self.routes.push((pattern, handler));
        self
    }

    /// Append a route matching `path` exactly.
    pub fn exact(self, path: impl Into<String>, handler: impl RouteHandler) -> Self {
        self.route(RoutePattern::Exact(path.into()), handler)
    }

    /// Append a route whose pattern is a regular expression.
    pub fn matching(self, pattern: &str, handler: impl RouteHandler) -> Result<Self, regex::Error> {
        let regex = Regex::new(pattern)?;
        Ok(self.route(RoutePattern::Matches(regex), handler))
    }

    /// Patterns in evaluation order.
    pub fn patterns(&self) -> impl Iterator<Item = &RoutePattern> {
        self.routes.iter().map(|(pattern, _)| pattern)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Handler for `path`, if any route matches.
    pub fn find(&self, path: &str) -> Option<&Arc<dyn RouteHandler>> {
        self.routes
            .iter()
            .find(|(pattern, _)| pattern.matches(path))
            .map(|(_, handler)| handler)
    }

    /// Route one request.
    pub async fn dispatch(&self, request: Request) -> Response {
        if !matches!(*request.method(), Method::GET | Method::HEAD) {
            tracing::debug!("Rejected {} {}", request.method(), request.uri().path());
            return (
                StatusCode::METHOD_NOT_ALLOWED,
                [
                    (header::ALLOW, ALLOWED_METHODS),
                    (header::CONTENT_TYPE, "text/plain"),
                ],
                "Method Not Allowed",
            )
                .into_response();
        }

        let path = request.uri().path().to_string();
        match self.find(&path) {
            Some(handler) => handler.call(request).await,
            None => {
                tracing::debug!("No route for {}", path);
                (
                    StatusCode::NOT_FOUND,
                    [(header::CONTENT_TYPE, "text/plain")],
                    "Not Found",
                )
                    .into_response()
            }
        }
    }

    /// Mount the table into an axum router.
    ///
    /// CORS is open to any origin so that tools served from other local
    /// ports can subscribe to the event stream. Requests are traced at
    /// debug level under the `tower_http` target.
    pub fn into_router(self) -> Router {
        Router::new()
            .fallback(dispatch_request)
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .layer(TraceLayer::new_for_http())
            .with_state(Arc::new(self))
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.patterns().map(|p| p.to_string()))
            .finish()
    }
}

async fn dispatch_request(State(table): State<Arc<RouteTable>>, request: Request) -> Response {
    table.dispatch(request).await
}
