//! Endpoint routing middleware.
//!
//! Matches the request's method and path against an [`EndpointTable`] and
//! attaches the matched [`Endpoint`] (with its metadata) to the context.
//! Later stages, tenant resolution included, read it from there. Requests
//! that match nothing continue with no endpoint set.
//!
//! ## Patterns
//!
//! - static segments: `/orders`
//! - named parameters: `/orders/{id}`
//! - a trailing catch-all: `/assets/*path`
//!
//! When several routes match, the most specific wins: static beats
//! parameter beats catch-all, compared segment by segment.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{MiddlewareResult, Request};
use http::Method;
use std::collections::HashMap;
use std::sync::Arc;
use tenantry_core::Endpoint;

/// Path parameters captured by the matched route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams(HashMap<String, String>);

impl RouteParams {
    /// Returns a parameter value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Returns `true` if no parameters were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
    CatchAll(String),
}

impl Segment {
    const fn rank(&self) -> u8 {
        match self {
            Self::Static(_) => 0,
            Self::Param(_) => 1,
            Self::CatchAll(_) => 2,
        }
    }
}

#[derive(Debug, Clone)]
struct Route {
    method: Option<Method>,
    segments: Vec<Segment>,
    endpoint: Arc<Endpoint>,
}

impl Route {
    fn specificity(&self) -> Vec<u8> {
        self.segments.iter().map(Segment::rank).collect()
    }

    fn matches(&self, method: &Method, path: &[&str]) -> Option<RouteParams> {
        if let Some(expected) = &self.method {
            if expected != method {
                return None;
            }
        }

        let mut params = HashMap::new();
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::CatchAll(name) => {
                    params.insert(name.clone(), path.get(i..).unwrap_or_default().join("/"));
                    return Some(RouteParams(params));
                }
                Segment::Static(expected) => {
                    if path.get(i) != Some(&expected.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = path.get(i)?;
                    params.insert(name.clone(), (*value).to_string());
                }
            }
        }

        (self.segments.len() == path.len()).then_some(RouteParams(params))
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn parse_pattern(pattern: &str) -> Vec<Segment> {
    split_path(pattern)
        .into_iter()
        .map(|s| {
            if let Some(name) = s.strip_prefix('*') {
                Segment::CatchAll(name.to_string())
            } else if let Some(name) = s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Segment::Param(name.to_string())
            } else {
                Segment::Static(s.to_string())
            }
        })
        .collect()
}

/// Registered endpoints.
///
/// # Example
///
/// ```
/// use http::Method;
/// use tenantry_core::{Endpoint, EndpointMetadata};
/// use tenantry_middleware::stages::EndpointTable;
///
/// let table = EndpointTable::new()
///     .route(Method::GET, "/orders/{id}", Endpoint::new("getOrder", "/orders/{id}"))
///     .any("/health", Endpoint::new("health", "/health").with_metadata(EndpointMetadata::excluded()));
///
/// let (endpoint, params) = table.match_route(&Method::GET, "/orders/42").unwrap();
/// assert_eq!(endpoint.operation_id(), "getOrder");
/// assert_eq!(params.get("id"), Some("42"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct EndpointTable {
    routes: Vec<Route>,
}

impl EndpointTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an endpoint for one method.
    #[must_use]
    pub fn route(mut self, method: Method, pattern: &str, endpoint: Endpoint) -> Self {
        self.push(Some(method), pattern, endpoint);
        self
    }

    /// Registers an endpoint for every method.
    #[must_use]
    pub fn any(mut self, pattern: &str, endpoint: Endpoint) -> Self {
        self.push(None, pattern, endpoint);
        self
    }

    fn push(&mut self, method: Option<Method>, pattern: &str, endpoint: Endpoint) {
        self.routes.push(Route {
            method,
            segments: parse_pattern(pattern),
            endpoint: Arc::new(endpoint),
        });
    }

    /// Returns the number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Finds the most specific endpoint for `method` and `path`.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<(Arc<Endpoint>, RouteParams)> {
        let path = split_path(path);

        self.routes
            .iter()
            .filter_map(|route| route.matches(method, &path).map(|params| (route, params)))
            .min_by_key(|(route, _)| route.specificity())
            .map(|(route, params)| (Arc::clone(&route.endpoint), params))
    }
}

/// Middleware that attaches the matched endpoint to the context.
#[derive(Debug, Clone, Default)]
pub struct RoutingMiddleware {
    table: EndpointTable,
}

impl RoutingMiddleware {
    /// Creates a routing stage over `table`.
    #[must_use]
    pub fn new(table: EndpointTable) -> Self {
        Self { table }
    }
}

impl Middleware for RoutingMiddleware {
    fn name(&self) -> &'static str {
        "routing"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, MiddlewareResult> {
        Box::pin(async move {
            match self.table.match_route(request.method(), request.uri().path()) {
                Some((endpoint, params)) => {
                    tracing::trace!(
                        request_id = %ctx.request_id(),
                        operation_id = endpoint.operation_id(),
                        "endpoint matched"
                    );
                    ctx.set_endpoint(endpoint);
                    ctx.set_extension(params);
                }
                None => {
                    tracing::trace!(
                        request_id = %ctx.request_id(),
                        path = request.uri().path(),
                        "no endpoint matched"
                    );
                }
            }

            next.run(ctx, request).await
        })
    }
}
