//! Request ID middleware.
//!
//! Generates a UUID v7 request ID for every request, or reuses a valid
//! incoming `X-Request-ID` when configured to trust it. The ID is stored on
//! the [`MiddlewareContext`] and echoed on the response so clients can
//! correlate with server logs.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{MiddlewareResult, Request};
use http::HeaderValue;
use tenantry_core::RequestId;
use uuid::Uuid;

/// The header name for request ID propagation.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware that generates or extracts request IDs.
///
/// # Example
///
/// ```
/// use tenantry_middleware::stages::RequestIdMiddleware;
/// use tenantry_middleware::Middleware;
///
/// let middleware = RequestIdMiddleware::trust_incoming();
/// assert_eq!(middleware.name(), "request_id");
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestIdMiddleware {
    /// Whether to trust incoming request ID headers.
    trust_incoming: bool,
}

impl RequestIdMiddleware {
    /// Creates a middleware that always generates fresh IDs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a middleware that trusts incoming `X-Request-ID` headers.
    #[must_use]
    pub fn trust_incoming() -> Self {
        Self {
            trust_incoming: true,
        }
    }

    fn extract_request_id(&self, request: &Request) -> Option<RequestId> {
        if !self.trust_incoming {
            return None;
        }

        request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .map(RequestId::from_uuid)
    }
}

impl Middleware for RequestIdMiddleware {
    fn name(&self) -> &'static str {
        "request_id"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, MiddlewareResult> {
        Box::pin(async move {
            let request_id = self
                .extract_request_id(&request)
                .unwrap_or_else(RequestId::new);
            ctx.set_request_id(request_id);

            let mut response = next.run(ctx, request).await?;

            if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
                response.headers_mut().insert(REQUEST_ID_HEADER, value);
            }

            Ok(response)
        })
    }
}
